//! End-to-end cache runs over generated asset trees

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

use alae_cache::{AssetCacher, AssetStore, CacheError, CacherConfig, InputPolicy, RunSummary};
use alae_formats::w3d::builder::W3dBuilder;
use alae_formats::{CacheHeader, CacheTotals};
use binrw::io::Cursor;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SECOND: u64 = 1_000_000_000;

fn write_file(root: &Path, name: &str, data: &[u8], secs: u64) {
    let path = root.join(name);
    fs::write(&path, data).expect("Operation should succeed");
    File::options()
        .write(true)
        .open(&path)
        .and_then(|file| file.set_modified(UNIX_EPOCH + Duration::from_secs(secs)))
        .expect("Operation should succeed");
}

fn run(root: &Path, incremental: bool, policy: InputPolicy) -> (RunSummary, AssetStore) {
    let config = CacherConfig::new(root)
        .with_incremental(incremental)
        .with_input_policy(policy);
    let mut cacher = AssetCacher::new(config).expect("Operation should succeed");
    let summary = cacher.run().expect("Operation should succeed");
    (summary, cacher.store().clone())
}

fn import(root: &Path) -> AssetStore {
    let config = CacherConfig::new(root).with_incremental(true);
    let mut cacher = AssetCacher::new(config).expect("Operation should succeed");
    cacher.import_existing().expect("Operation should succeed");
    cacher.store().clone()
}

fn cache_totals(root: &Path) -> CacheTotals {
    let data = fs::read(root.join("asset.dat")).expect("Operation should succeed");
    CacheHeader::probe(&mut Cursor::new(data.as_slice()))
        .expect("Operation should succeed")
        .expect("cache header should be valid")
}

/// Comparable view of a store: names, sizes, times, chunk names and the
/// valid inputs of each chunk
fn snapshot(store: &AssetStore) -> Vec<(String, u64, u64, Vec<(String, BTreeSet<String>)>)> {
    store
        .assets()
        .iter()
        .map(|asset| {
            let chunks = asset
                .chunks
                .iter()
                .map(|chunk| {
                    (
                        chunk.name_str().to_string(),
                        chunk.valid_inputs().map(str::to_string).collect(),
                    )
                })
                .collect();
            (asset.name.clone(), asset.size, asset.time, chunks)
        })
        .collect()
}

/// A small tank: mesh with two textures, hierarchy, animation and HLOD,
/// plus a dangling reference to a texture that does not exist
fn tank_tree(root: &Path) {
    let model = W3dBuilder::new()
        .hierarchy("tank")
        .mesh("tank", "body", &["tank.tga", "decal.tga"])
        .mesh("tank", "turret", &["tank.tga"])
        .hlod("tank", "tank", &["tank.body", "tank.turret"])
        .build();
    write_file(root, "tank.w3d", &model, 1_000);

    let animation = W3dBuilder::new().animation("tank", "fire").build();
    write_file(root, "tank_fire.w3d", &animation, 1_000);

    write_file(root, "tank.tga", b"texture bytes", 1_000);
}

#[test]
fn test_missing_input_dropped_under_pedantic() {
    let dir = TempDir::new().expect("Operation should succeed");
    let model = W3dBuilder::new().mesh("", "Tex1", &["Tex2"]).build();
    write_file(dir.path(), "a.w3d", &model, 1_000);

    let (relaxed, _) = run(dir.path(), false, InputPolicy::Relaxed);
    assert_eq!(relaxed.exported_records, 1);
    assert_eq!(cache_totals(dir.path()), CacheTotals::new(1, 1));

    let (pedantic, store) = run(dir.path(), false, InputPolicy::Pedantic);
    assert_eq!(pedantic.missing_inputs, 1);
    assert_eq!(pedantic.exported_records, 0);
    assert_eq!(cache_totals(dir.path()), CacheTotals::new(1, 0));
    assert!(store.dependency_records().is_empty());

    // The chunk itself is still exported, without inputs
    let imported = import(dir.path());
    let chunk = &imported.find("a.w3d").unwrap().chunks[0];
    assert_eq!(chunk.name_str(), "Tex1");
    assert!(chunk.inputs().is_empty());
}

#[test]
fn test_newer_copy_replaces_in_place() {
    let dir = TempDir::new().expect("Operation should succeed");
    let root = dir.path();
    write_file(root, "bar.w3d", &W3dBuilder::new().hierarchy("bar").build(), 100);
    write_file(root, "foo.w3d", &W3dBuilder::new().hierarchy("foo").build(), 100);
    run(root, false, InputPolicy::Informative);

    let before = import(root);
    assert_eq!(before.index().asset_slot("foo.w3d"), Some(1));

    // New file sorts first; the updated asset must keep its slot
    write_file(root, "aaa.w3d", &W3dBuilder::new().hierarchy("aaa").build(), 100);
    write_file(root, "foo.w3d", &W3dBuilder::new().hierarchy("foo").build(), 200);
    let (summary, store) = run(root, true, InputPolicy::Informative);

    assert_eq!(summary.imported_assets, 2);
    assert_eq!(summary.new_assets, 1);
    assert_eq!(summary.updated_assets, 1);
    assert_eq!(store.len(), 3);
    assert_eq!(store.index().asset_slot("FOO.W3D"), Some(1));
    assert_eq!(store.get(1).unwrap().time, 200 * SECOND);
    assert_eq!(store.get(2).unwrap().name, "aaa.w3d");

    let after = import(root);
    assert_eq!(snapshot(&after), snapshot(&store));
}

#[test]
fn test_corrupted_magic_starts_fresh() {
    let dir = TempDir::new().expect("Operation should succeed");
    tank_tree(dir.path());
    let (first, _) = run(dir.path(), false, InputPolicy::Informative);

    let cache = dir.path().join("asset.dat");
    let mut data = fs::read(&cache).expect("Operation should succeed");
    data[0..4].copy_from_slice(b"XXXX");
    fs::write(&cache, &data).expect("Operation should succeed");

    let (summary, _) = run(dir.path(), true, InputPolicy::Informative);
    assert_eq!(summary.imported_assets, 0);
    assert_eq!(summary.imported_records, 0);
    assert_eq!(summary.new_assets, first.new_assets);
    assert_eq!(summary.exported_assets, first.exported_assets);
    assert_eq!(summary.exported_records, first.exported_records);
}

#[test]
fn test_other_files_are_ignored() {
    let dir = TempDir::new().expect("Operation should succeed");
    fs::write(dir.path().join("notes.txt"), b"tex2").expect("Operation should succeed");
    write_file(dir.path(), "rock.dds", b"dds", 10);

    let cacher =
        AssetCacher::new(CacherConfig::new(dir.path())).expect("Operation should succeed");
    assert_eq!(cacher.candidates(), 1);

    let (summary, store) = run(dir.path(), false, InputPolicy::Relaxed);
    assert_eq!(summary.exported_assets, 1);
    assert!(store.find("notes.txt").is_none());

    let data = fs::read(dir.path().join("asset.dat")).expect("Operation should succeed");
    assert!(!data.windows(5).any(|window| window == b"notes"));
}

#[test]
fn test_export_import_round_trip() {
    let dir = TempDir::new().expect("Operation should succeed");
    tank_tree(dir.path());

    let (summary, store) = run(dir.path(), false, InputPolicy::Informative);
    assert_eq!(summary.exported_assets, 3);
    // Two meshes, the HLOD and the animation carry inputs
    assert_eq!(summary.exported_records, 4);
    assert_eq!(summary.missing_inputs, 1);

    let imported = import(dir.path());
    assert_eq!(snapshot(&imported), snapshot(&store));
    assert_eq!(imported.chunks_with_inputs(), store.chunks_with_inputs());
}

#[test]
fn test_unchanged_tree_exports_identical_bytes() {
    let dir = TempDir::new().expect("Operation should succeed");
    tank_tree(dir.path());
    let cache = dir.path().join("asset.dat");

    run(dir.path(), false, InputPolicy::Pedantic);
    let first = fs::read(&cache).expect("Operation should succeed");

    let (summary, _) = run(dir.path(), true, InputPolicy::Pedantic);
    assert_eq!(summary.new_assets, 0);
    assert_eq!(summary.updated_assets, 0);
    assert_eq!(fs::read(&cache).expect("Operation should succeed"), first);

    run(dir.path(), false, InputPolicy::Pedantic);
    assert_eq!(fs::read(&cache).expect("Operation should succeed"), first);

    // The backup holds the previous run's output
    assert_eq!(
        fs::read(dir.path().join("asset.dat.bak")).expect("Operation should succeed"),
        first
    );
    assert!(!dir.path().join("asset.dat.tmp").exists());
}

#[test]
fn test_older_copy_never_wins() {
    let dir = TempDir::new().expect("Operation should succeed");
    let root = dir.path();
    write_file(root, "foo.w3d", &W3dBuilder::new().hierarchy("new").build(), 200);
    run(root, false, InputPolicy::Relaxed);

    write_file(root, "foo.w3d", &W3dBuilder::new().hierarchy("old").build(), 100);
    let (summary, store) = run(root, true, InputPolicy::Relaxed);

    assert_eq!(summary.updated_assets, 0);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(0).unwrap().time, 200 * SECOND);
    assert_eq!(store.get(0).unwrap().chunks[0].name_str(), "new");
}

#[test]
fn test_warning_lines_match_missing_inputs() {
    let dir = TempDir::new().expect("Operation should succeed");
    let root = dir.path();
    tank_tree(root);
    write_file(
        root,
        "smoke.w3d",
        &W3dBuilder::new()
            .emitter("smoke", "smoke.tga")
            .aggregate("tankagg", "tank.body", &["tank.turret", "flag"])
            .build(),
        1_000,
    );
    let cache = root.join("asset.dat");
    let log = root.join("warnings.log");

    let (relaxed, _) = run(root, false, InputPolicy::Relaxed);
    let relaxed_bytes = fs::read(&cache).expect("Operation should succeed");
    assert!(!log.exists());

    let (informative, _) = run(root, false, InputPolicy::Informative);
    assert_eq!(informative.missing_inputs, relaxed.missing_inputs);
    assert_eq!(informative.missing_inputs, 3);
    assert_eq!(fs::read(&cache).expect("Operation should succeed"), relaxed_bytes);

    let text = fs::read_to_string(&log).expect("Operation should succeed");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.contains(&"Chunk tank.body in asset tank.w3d has an unresolved dependency: decal.tga;"));
    assert!(lines.contains(&"Chunk smoke in asset smoke.w3d has an unresolved dependency: smoke.tga;"));
    assert!(lines.contains(&"Chunk tankagg in asset smoke.w3d has an unresolved dependency: flag;"));

    // A clean rerun removes the previous log
    run(root, false, InputPolicy::Relaxed);
    assert!(!log.exists());
}

#[test]
fn test_pedantic_closure() {
    let dir = TempDir::new().expect("Operation should succeed");
    let root = dir.path();
    tank_tree(root);
    write_file(
        root,
        "smoke.w3d",
        &W3dBuilder::new()
            .emitter("smoke", "smoke.tga")
            .aggregate("tankagg", "tank.body", &["tank.turret", "flag"])
            .build(),
        1_000,
    );

    run(root, false, InputPolicy::Pedantic);
    let imported = import(root);

    for record in imported.dependency_records() {
        for input in &record.inputs {
            assert!(
                imported.index().resolve(input).is_some(),
                "{input} listed by {} does not resolve",
                record.chunk_name
            );
        }
    }
    // Aggregate keeps its resolvable inputs
    let aggregate = imported
        .dependency_records()
        .into_iter()
        .find(|record| record.chunk_name == "tankagg")
        .expect("aggregate record should be exported");
    assert_eq!(aggregate.inputs, ["tank.body", "tank.turret"]);
}

#[test]
fn test_case_insensitive_names_merge() {
    let dir = TempDir::new().expect("Operation should succeed");
    let root = dir.path();
    fs::create_dir(root.join("upper")).expect("Operation should succeed");
    write_file(root, "rock.w3d", &W3dBuilder::new().hierarchy("rock").build(), 100);
    write_file(
        &root.join("upper"),
        "ROCK.W3D",
        &W3dBuilder::new().hierarchy("ROCK2").build(),
        300,
    );
    write_file(
        root,
        "user.w3d",
        &W3dBuilder::new().animation("ROCK2", "roll").build(),
        100,
    );

    let (summary, store) = run(root, false, InputPolicy::Pedantic);
    assert_eq!(store.len(), 2);
    assert_eq!(summary.new_assets, 2);
    assert_eq!(summary.updated_assets, 1);
    assert_eq!(store.find("rock.w3d").unwrap().time, 300 * SECOND);
    assert_eq!(summary.missing_inputs, 0);
    assert_eq!(store.dependency_records()[0].inputs, ["ROCK2"]);
}

#[test]
fn test_unknown_dependency_record_aborts_import() {
    let dir = TempDir::new().expect("Operation should succeed");
    let root = dir.path();
    let model = W3dBuilder::new().mesh("", "Tex1", &["Tex2"]).build();
    write_file(root, "a.w3d", &model, 1_000);
    run(root, false, InputPolicy::Relaxed);

    // Rename the chunk in the cache so the dependency record no longer matches
    let cache = root.join("asset.dat");
    let data = fs::read(&cache).expect("Operation should succeed");
    let position = data
        .windows(4)
        .position(|window| window == b"Tex1")
        .expect("chunk name should be stored");
    let mut corrupted = data.clone();
    corrupted[position..position + 4].copy_from_slice(b"Tex9");
    fs::write(&cache, &corrupted).expect("Operation should succeed");

    let config = CacherConfig::new(root).with_incremental(true);
    let mut cacher = AssetCacher::new(config).expect("Operation should succeed");
    assert!(matches!(cacher.run(), Err(CacheError::Corruption { .. })));
    // Nothing was exported over the corrupt cache
    assert_eq!(fs::read(&cache).expect("Operation should succeed"), corrupted);
}

#[test]
fn test_overlong_name_skips_only_that_file() {
    let dir = TempDir::new().expect("Operation should succeed");
    let root = dir.path();
    let texture = format!("{}.tga", "t".repeat(255));
    write_file(root, "smoke.w3d", &W3dBuilder::new().emitter("smoke", &texture).build(), 100);
    write_file(root, "rock.w3d", &W3dBuilder::new().hierarchy("rock").build(), 100);

    let (summary, store) = run(root, false, InputPolicy::Informative);
    assert_eq!(summary.skipped_files, 1);
    assert_eq!(summary.exported_assets, 1);
    assert!(store.find("smoke.w3d").is_none());
    assert_eq!(cache_totals(root), CacheTotals::new(1, 0));

    let imported = import(root);
    assert_eq!(imported.find("rock.w3d").unwrap().chunks[0].name_str(), "rock");
}
