//! Progress reporting seam

use std::fmt;

/// Phases of a cache run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading the previous cache
    Import,
    /// Decoding source files
    Scan,
    /// Checking inputs against the index
    Validate,
    /// Writing the new cache
    Export,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Import => "Importing cache",
            Self::Scan => "Scanning assets",
            Self::Validate => "Validating inputs",
            Self::Export => "Exporting cache",
        };
        f.write_str(label)
    }
}

/// Receives progress events from a cacher
pub trait ProgressReporter {
    /// A phase starts; `expected` is the number of steps, if known
    fn begin(&mut self, _phase: Phase, _expected: u64) {}

    /// `steps` more units of work are done
    fn advance(&mut self, _steps: u64) {}

    /// The phase is complete
    fn finish(&mut self, _phase: Phase) {}
}

/// Reporter that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {}
