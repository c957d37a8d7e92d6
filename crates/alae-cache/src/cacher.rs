//! Cache run orchestration
//!
//! A run moves strictly forward through
//! `Empty -> Loaded -> Scanned -> Validated -> Exported`; importing the
//! previous cache is the only optional step.

use std::fmt;
use std::fs::{self, File};
use std::io::{Cursor, ErrorKind, Write};
use std::path::Path;

use alae_formats::{
    Asset, CacheFileError, CacheFileResult, CacheHeader, CacheTotals, DependencyRecord,
};
use binrw::{BinRead, BinWriterExt};
use tracing::{debug, info, warn};

use crate::config::CacherConfig;
use crate::error::{CacheError, CacheResult};
use crate::progress::{Phase, ProgressReporter, SilentProgress};
use crate::scan;
use crate::store::{AssetStore, MergeOutcome};
use crate::warnings::WarningsLog;

/// Where a run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacherState {
    /// Nothing loaded yet
    Empty,
    /// Previous cache imported (possibly as empty)
    Loaded,
    /// Source files merged
    Scanned,
    /// Inputs checked
    Validated,
    /// New cache written
    Exported,
}

impl fmt::Display for CacherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Loaded => "loaded",
            Self::Scanned => "scanned",
            Self::Validated => "validated",
            Self::Exported => "exported",
        };
        f.write_str(name)
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Assets read from the previous cache
    pub imported_assets: usize,
    /// Dependency records read from the previous cache
    pub imported_records: usize,
    /// Scanned assets with a new name
    pub new_assets: usize,
    /// Scanned assets that replaced an older copy
    pub updated_assets: usize,
    /// Source files that failed to decode
    pub skipped_files: usize,
    /// Input references that did not resolve
    pub missing_inputs: usize,
    /// Assets written to the new cache
    pub exported_assets: usize,
    /// Dependency records written to the new cache
    pub exported_records: usize,
}

/// Builds and maintains the asset cache under one root
pub struct AssetCacher {
    config: CacherConfig,
    store: AssetStore,
    warnings: WarningsLog,
    progress: Box<dyn ProgressReporter>,
    state: CacherState,
    candidates: usize,
    summary: RunSummary,
}

impl AssetCacher {
    /// Prepare a run: reset the warnings log and count candidate files
    pub fn new(config: CacherConfig) -> CacheResult<Self> {
        let metadata = fs::metadata(&config.root).map_err(|e| CacheError::io(&config.root, e))?;
        if !metadata.is_dir() {
            return Err(CacheError::io(
                &config.root,
                std::io::Error::new(ErrorKind::NotADirectory, "asset root is not a directory"),
            ));
        }

        let warnings = WarningsLog::reset(config.warnings_path())?;
        let candidates = scan::count_candidates(&config.root);
        info!(
            "Found {} candidate file(s) under {}",
            candidates,
            config.root.display()
        );

        Ok(Self {
            config,
            store: AssetStore::new(),
            warnings,
            progress: Box::new(SilentProgress),
            state: CacherState::Empty,
            candidates,
            summary: RunSummary::default(),
        })
    }

    /// Report progress to `progress`
    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Run every phase the configuration asks for
    pub fn run(&mut self) -> CacheResult<RunSummary> {
        if self.config.incremental {
            self.import_existing()?;
        }
        self.scan_and_merge()?;
        self.validate_inputs()?;
        self.export()?;

        let summary = self.summary;
        info!(
            "Cache complete: {} asset(s) ({} new, {} updated, {} imported), {} dependency record(s), {} missing input(s), {} skipped file(s)",
            summary.exported_assets,
            summary.new_assets,
            summary.updated_assets,
            summary.imported_assets,
            summary.exported_records,
            summary.missing_inputs,
            summary.skipped_files
        );
        Ok(summary)
    }

    /// Load the previous cache into the store
    ///
    /// A missing file, a foreign header or totals that cannot be written
    /// back all leave the store empty. Records that do not decode or that
    /// name unknown assets or chunks abort the run.
    pub fn import_existing(&mut self) -> CacheResult<()> {
        self.require("import the existing cache", &[CacherState::Empty])?;
        self.state = CacherState::Loaded;

        let path = self.config.cache_path();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No existing cache at {}", path.display());
                return Ok(());
            }
            Err(e) => return Err(CacheError::io(path, e)),
        };

        let mut cursor = Cursor::new(data.as_slice());
        let totals = CacheHeader::probe(&mut cursor)
            .map_err(|e| CacheError::corruption(&path, e.to_string()))?;
        let Some(totals) = totals else {
            warn!(
                "{} is not a valid cache file; starting from an empty cache",
                path.display()
            );
            return Ok(());
        };

        if !self.totals_fit(totals) {
            warn!(
                "Cache totals in {} ({} assets, {} records) do not fit with {} candidate(s); starting from an empty cache",
                path.display(),
                totals.asset_count,
                totals.input_record_count,
                self.candidates
            );
            return Ok(());
        }

        self.progress.begin(
            Phase::Import,
            u64::from(totals.asset_count) + u64::from(totals.input_record_count),
        );

        for i in 0..totals.asset_count {
            let asset = Asset::read(&mut cursor).map_err(|e| {
                CacheError::corruption(&path, format!("asset record {i}: {e}"))
            })?;
            self.store.merge(asset);
            self.progress.advance(1);
        }

        for i in 0..totals.input_record_count {
            let record = DependencyRecord::read(&mut cursor).map_err(|e| {
                CacheError::corruption(&path, format!("dependency record {i}: {e}"))
            })?;
            self.store
                .attach_inputs(record)
                .map_err(|e| CacheError::corruption(&path, e.to_string()))?;
            self.progress.advance(1);
        }

        let trailing = data.len() as u64 - cursor.position();
        if trailing > 0 {
            debug!("Ignoring {} trailing byte(s) in {}", trailing, path.display());
        }

        self.progress.finish(Phase::Import);
        self.summary.imported_assets = self.store.len();
        self.summary.imported_records = totals.input_record_count as usize;
        info!(
            "Imported {} asset(s) and {} dependency record(s) from {}",
            self.summary.imported_assets,
            self.summary.imported_records,
            path.display()
        );
        Ok(())
    }

    /// Decode every candidate file and merge it into the store
    ///
    /// A file that fails to decode is logged and skipped.
    pub fn scan_and_merge(&mut self) -> CacheResult<()> {
        self.require(
            "scan assets",
            &[CacherState::Empty, CacherState::Loaded],
        )?;

        self.progress.begin(Phase::Scan, self.candidates as u64);

        for path in scan::candidate_files(&self.config.root) {
            match Asset::from_file(&path) {
                Ok(asset) => match self.store.merge(asset) {
                    MergeOutcome::Added(_) => self.summary.new_assets += 1,
                    MergeOutcome::Updated(_) => self.summary.updated_assets += 1,
                    MergeOutcome::Kept(_) => {}
                },
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    self.summary.skipped_files += 1;
                }
            }
            self.progress.advance(1);
        }

        self.progress.finish(Phase::Scan);
        debug!(
            "Index holds {} asset(s) and {} chunk name(s)",
            self.store.index().asset_count(),
            self.store.index().chunk_count()
        );
        info!(
            "Scanned {}: {} new, {} updated, {} skipped",
            self.config.root.display(),
            self.summary.new_assets,
            self.summary.updated_assets,
            self.summary.skipped_files
        );
        self.state = CacherState::Scanned;
        Ok(())
    }

    /// Check every input against the index under the configured policy
    pub fn validate_inputs(&mut self) -> CacheResult<()> {
        self.require("validate inputs", &[CacherState::Scanned])?;

        let policy = self.config.input_policy;
        self.progress.begin(Phase::Validate, self.store.len() as u64);

        let missing = self.store.validate_inputs(policy.invalidates());
        if policy.logs_warnings() {
            for input in &missing {
                self.warnings.append(input)?;
            }
            self.warnings.flush()?;
            if self.warnings.lines() > 0 {
                info!(
                    "Wrote {} warning(s) to {}",
                    self.warnings.lines(),
                    self.warnings.path().display()
                );
            }
        }

        self.progress.advance(self.store.len() as u64);
        self.progress.finish(Phase::Validate);

        self.summary.missing_inputs = missing.len();
        if missing.is_empty() {
            debug!("All inputs resolve");
        } else {
            warn!(
                "{} input(s) do not resolve ({} policy)",
                missing.len(),
                policy
            );
        }
        self.state = CacherState::Validated;
        Ok(())
    }

    /// Write the new cache
    ///
    /// The previous cache is copied to the backup path first, best effort.
    /// The new cache is staged in a temporary file and renamed into place;
    /// on failure the staging file is removed and the previous cache stays.
    pub fn export(&mut self) -> CacheResult<()> {
        self.require("export the cache", &[CacherState::Validated])?;

        let path = self.config.cache_path();
        if path.exists() {
            if let Err(e) = fs::copy(&path, self.config.backup_path()) {
                warn!("Could not back up {}: {}", path.display(), e);
            }
        }

        self.progress.begin(
            Phase::Export,
            (self.store.len() + self.store.chunks_with_inputs()) as u64,
        );
        let records = self.store.dependency_records();
        let data = encode_cache(&self.store, &records, self.progress.as_mut())
            .map_err(|source| CacheError::Export {
                path: path.clone(),
                source,
            })?;

        let temp = self.config.temp_path();
        if let Err(e) = write_then_rename(&temp, &path, &data) {
            let _ = fs::remove_file(&temp);
            return Err(CacheError::Export {
                path,
                source: e.into(),
            });
        }
        self.progress.finish(Phase::Export);

        self.summary.exported_assets = self.store.len();
        self.summary.exported_records = records.len();
        info!(
            "Exported {} asset(s) and {} dependency record(s) to {}",
            self.summary.exported_assets,
            self.summary.exported_records,
            path.display()
        );
        self.state = CacherState::Exported;
        Ok(())
    }

    /// Current phase
    pub fn state(&self) -> CacherState {
        self.state
    }

    /// Assets gathered so far
    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Run parameters
    pub fn config(&self) -> &CacherConfig {
        &self.config
    }

    /// Candidate files found when the cacher was created
    pub fn candidates(&self) -> usize {
        self.candidates
    }

    /// Counts so far
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Lines written to the warnings log
    pub fn warning_count(&self) -> usize {
        self.warnings.lines()
    }

    fn require(&self, operation: &'static str, allowed: &[CacherState]) -> CacheResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(CacheError::Phase {
                operation,
                state: self.state,
            })
        }
    }

    /// Imported counts must still fit their 32-bit fields once the scan
    /// has added every candidate
    fn totals_fit(&self, totals: CacheTotals) -> bool {
        u32::try_from(self.candidates)
            .ok()
            .and_then(|candidates| totals.asset_count.checked_add(candidates))
            .is_some()
    }
}

fn encode_cache(
    store: &AssetStore,
    records: &[DependencyRecord],
    progress: &mut dyn ProgressReporter,
) -> CacheFileResult<Vec<u8>> {
    let asset_count = u32::try_from(store.len()).map_err(|_| CacheFileError::TooManyEntries {
        what: "assets",
        count: store.len(),
    })?;
    let record_count =
        u32::try_from(records.len()).map_err(|_| CacheFileError::TooManyEntries {
            what: "dependency records",
            count: records.len(),
        })?;

    let mut cursor = Cursor::new(Vec::new());
    cursor.write_le(&CacheHeader::new(CacheTotals::new(asset_count, record_count)))?;
    for asset in store.assets() {
        cursor.write_le(asset)?;
        progress.advance(1);
    }
    for record in records {
        cursor.write_le(record)?;
        progress.advance(1);
    }

    Ok(cursor.into_inner())
}

fn write_then_rename(temp: &Path, target: &Path, data: &[u8]) -> std::io::Result<()> {
    {
        let mut file = File::create(temp)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    fs::rename(temp, target)
}
