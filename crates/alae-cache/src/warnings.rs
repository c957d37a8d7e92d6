//! Run-scoped warnings log

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{CacheError, CacheResult};

/// Plain-text log of unresolved dependencies
///
/// The file is removed when the log is reset and only created again on the
/// first appended line, so a clean run leaves no log behind.
#[derive(Debug)]
pub struct WarningsLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    lines: usize,
}

impl WarningsLog {
    /// Start a new log at `path`, removing any previous one
    pub fn reset(path: impl Into<PathBuf>) -> CacheResult<Self> {
        let path = path.into();
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(CacheError::io(path, e)),
        }

        Ok(Self {
            path,
            writer: None,
            lines: 0,
        })
    }

    /// Append one line
    pub fn append(&mut self, line: &impl Display) -> CacheResult<()> {
        if self.writer.is_none() {
            let file = File::create(&self.path).map_err(|e| CacheError::io(&self.path, e))?;
            self.writer = Some(BufWriter::new(file));
        }

        if let Some(writer) = &mut self.writer {
            writeln!(writer, "{line}").map_err(|e| CacheError::io(&self.path, e))?;
            self.lines += 1;
        }
        Ok(())
    }

    /// Flush buffered lines to disk
    pub fn flush(&mut self) -> CacheResult<()> {
        if let Some(writer) = &mut self.writer {
            writer.flush().map_err(|e| CacheError::io(&self.path, e))?;
        }
        Ok(())
    }

    /// Lines written so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Location of the log
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_created_lazily() {
        let dir = TempDir::new().expect("Operation should succeed");
        let path = dir.path().join("warnings.log");

        let mut log = WarningsLog::reset(&path).expect("Operation should succeed");
        log.flush().expect("Operation should succeed");
        assert!(!path.exists());

        log.append(&"first").expect("Operation should succeed");
        log.append(&"second").expect("Operation should succeed");
        log.flush().expect("Operation should succeed");

        assert_eq!(log.lines(), 2);
        assert_eq!(
            fs::read_to_string(&path).expect("Operation should succeed"),
            "first\nsecond\n"
        );
    }

    #[test]
    fn test_reset_removes_previous_log() {
        let dir = TempDir::new().expect("Operation should succeed");
        let path = dir.path().join("warnings.log");
        fs::write(&path, "stale\n").expect("Operation should succeed");

        let log = WarningsLog::reset(&path).expect("Operation should succeed");
        assert!(!path.exists());
        assert_eq!(log.path(), path);
    }
}
