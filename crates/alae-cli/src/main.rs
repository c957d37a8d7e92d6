//! ALAE asset cacher binary entry point.
//!
//! A thin wrapper around the alae-cache library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Loads the settings document, applies overrides and saves it back
//! 4. Runs the cacher over the asset root

mod progress;

use std::path::PathBuf;

use alae_cache::config::SETTINGS_FILE_NAME;
use alae_cache::{AssetCacher, CacherConfig, InputPolicy, Settings, SilentProgress};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::progress::BarProgress;

#[derive(Debug, Parser)]
#[command(
    name = "alae",
    about = "Build and incrementally maintain the asset cache for a directory of W3D and texture files",
    version
)]
struct Cli {
    /// Asset root; the cache is written here as asset.dat
    #[arg(short, long, env = "ALAE_ROOT", default_value = ".")]
    root: PathBuf,

    /// Settings document (default: <root>/settings.json)
    #[arg(short, long, env = "ALAE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Import the existing cache and merge into it
    #[arg(short, long, conflicts_with = "fresh")]
    incremental: bool,

    /// Ignore the existing cache and rebuild from scratch
    #[arg(short, long)]
    fresh: bool,

    /// Treatment of unresolved inputs: relaxed, informative or pedantic
    #[arg(short, long)]
    policy: Option<InputPolicy>,

    /// Do not print the effective settings before the run
    #[arg(long)]
    hide_settings: bool,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Log level, used when RUST_LOG is not set
    #[arg(short, long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Cli {
    fn settings_path(&self) -> PathBuf {
        self.settings
            .clone()
            .unwrap_or_else(|| self.root.join(SETTINGS_FILE_NAME))
    }

    /// Command-line flags win over the persisted document
    fn apply(&self, settings: &mut Settings) {
        if self.incremental {
            settings.incremental = true;
        }
        if self.fresh {
            settings.incremental = false;
        }
        if let Some(policy) = self.policy {
            settings.input_policy = policy;
        }
        if self.hide_settings {
            settings.show_settings = false;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str())),
        )
        .with_target(false)
        .init();

    let settings_path = cli.settings_path();
    let mut settings = Settings::load(&settings_path);
    cli.apply(&mut settings);
    settings
        .save(&settings_path)
        .with_context(|| format!("failed to save settings to {}", settings_path.display()))?;

    if settings.show_settings {
        info!("Settings ({}): {}", settings_path.display(), settings);
    }

    let config = CacherConfig::from_settings(&cli.root, &settings);
    let mut cacher = AssetCacher::new(config)
        .with_context(|| format!("cannot prepare a cache run in {}", cli.root.display()))?;
    cacher = if cli.no_progress {
        cacher.with_progress(Box::new(SilentProgress))
    } else {
        cacher.with_progress(Box::new(BarProgress::new()))
    };

    let summary = cacher.run().context("cache run failed")?;
    if summary.missing_inputs > 0 && settings.input_policy != InputPolicy::Relaxed {
        info!(
            "Unresolved inputs are listed in {}",
            cacher.config().warnings_path().display()
        );
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::try_parse_from(["alae", "--root", "assets", "-i", "-p", "Pedantic", "--hide-settings"])
            .expect("Operation should succeed");
        let mut settings = Settings::default();
        cli.apply(&mut settings);

        assert!(settings.incremental);
        assert!(!settings.show_settings);
        assert_eq!(settings.input_policy, InputPolicy::Pedantic);
        assert_eq!(cli.settings_path(), PathBuf::from("assets").join("settings.json"));
    }

    #[test]
    fn test_no_flags_keep_settings() {
        let cli = Cli::try_parse_from(["alae"]).expect("Operation should succeed");
        let mut settings = Settings {
            incremental: true,
            show_settings: false,
            input_policy: InputPolicy::Relaxed,
        };
        let before = settings.clone();
        cli.apply(&mut settings);
        assert_eq!(settings, before);
    }

    #[test]
    fn test_fresh_clears_incremental() {
        let cli = Cli::try_parse_from(["alae", "--fresh"]).expect("Operation should succeed");
        let mut settings = Settings {
            incremental: true,
            ..Settings::default()
        };
        cli.apply(&mut settings);
        assert!(!settings.incremental);
    }

    #[test]
    fn test_conflicting_modes_rejected() {
        assert!(Cli::try_parse_from(["alae", "--incremental", "--fresh"]).is_err());
        assert!(Cli::try_parse_from(["alae", "--policy", "strict"]).is_err());
    }
}
