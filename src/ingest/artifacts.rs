use std::fs::{self, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, ScrubError};
use crate::ledger::{LedgerDiff, StructureLedger};

/// Tracked artifact locations for one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePaths {
    pub html: PathBuf,
    pub map: PathBuf,
    pub ledger: PathBuf,
}

impl FixturePaths {
    pub fn new(fixtures_dir: &Path, fixture: &str) -> Self {
        Self {
            html: fixtures_dir.join(format!("{fixture}.html")),
            map: fixtures_dir.join(format!("{fixture}.map.json")),
            ledger: fixtures_dir.join(format!("{fixture}.ledger.json")),
        }
    }

    /// Paths this run would create, in write order.
    pub fn targets(&self, debug_ledger: bool) -> Vec<&Path> {
        let mut targets = vec![self.html.as_path(), self.map.as_path()];
        if debug_ledger {
            targets.push(self.ledger.as_path());
        }
        targets
    }

    /// Refuse to run if any target already exists.
    pub fn preflight(&self, debug_ledger: bool) -> Result<()> {
        match self.targets(debug_ledger).into_iter().find(|p| p.exists()) {
            Some(existing) => Err(ScrubError::TargetExists {
                path: existing.to_path_buf(),
            }),
            None => Ok(()),
        }
    }
}

/// Debug dump written as `<fixture>.ledger.json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerDebug<'a> {
    pub policy_version: &'a str,
    pub raw: &'a StructureLedger,
    pub sanitized: &'a StructureLedger,
    pub diff: &'a LedgerDiff,
}

/// Filesystem-safe ISO-8601 stamp, e.g. `2026-10-18T09-30-00-123Z`.
pub fn archive_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// Copy the untouched input to `<root>/<timestamp>-<fixture>/raw.html`.
pub fn write_raw_archive(
    raw_root: &Path,
    timestamp: &str,
    fixture: &str,
    raw_html: &str,
) -> Result<PathBuf> {
    let dir = raw_root.join(format!("{timestamp}-{fixture}"));
    fs::create_dir_all(&dir)?;
    let path = dir.join("raw.html");
    fs::write(&path, raw_html)?;
    Ok(path)
}

/// Writes tracked files all-or-nothing.
///
/// Files are created with create-new semantics; on the first failure every file
/// this writer already created is removed again.
#[derive(Debug, Default)]
pub struct TrackedWriter {
    written: Vec<PathBuf>,
}

impl TrackedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_all(mut self, files: &[(&Path, &str)]) -> Result<Vec<PathBuf>> {
        for (path, contents) in files {
            if let Err(e) = self.create(path, contents) {
                self.rollback();
                return Err(e);
            }
        }
        Ok(self.written)
    }

    fn create(&mut self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
                return Err(ScrubError::TargetExists {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        self.written.push(path.to_path_buf());
        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    fn rollback(&mut self) {
        for path in self.written.drain(..) {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!("failed to remove partial artifact {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_fixture_paths() {
        let paths = FixturePaths::new(Path::new("fixtures"), "zhihu-answer");
        assert_eq!(paths.html, PathBuf::from("fixtures/zhihu-answer.html"));
        assert_eq!(paths.map, PathBuf::from("fixtures/zhihu-answer.map.json"));
        assert_eq!(paths.ledger, PathBuf::from("fixtures/zhihu-answer.ledger.json"));
        assert_eq!(paths.targets(false).len(), 2);
        assert_eq!(paths.targets(true).len(), 3);
    }

    #[test]
    fn test_preflight_detects_existing_map() {
        let tmp = TempDir::new().unwrap();
        let paths = FixturePaths::new(tmp.path(), "f");
        assert!(paths.preflight(true).is_ok());
        fs::write(&paths.map, "[]").unwrap();
        let err = paths.preflight(false).unwrap_err();
        assert!(matches!(err, ScrubError::TargetExists { ref path } if *path == paths.map));
    }

    #[test]
    fn test_timestamp_format() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 5).unwrap();
        assert_eq!(archive_timestamp(now), "2026-10-18T09-30-05-000Z");
    }

    #[test]
    fn test_raw_archive_layout() {
        let tmp = TempDir::new().unwrap();
        let path = write_raw_archive(tmp.path(), "2026-10-18T09-30-05-000Z", "f", "<p>x</p>").unwrap();
        assert_eq!(path, tmp.path().join("2026-10-18T09-30-05-000Z-f").join("raw.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_writer_rolls_back_on_conflict() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("a.html");
        let second = tmp.path().join("a.map.json");
        fs::write(&second, "existing").unwrap();

        let err = TrackedWriter::new()
            .write_all(&[(first.as_path(), "new"), (second.as_path(), "new")])
            .unwrap_err();
        assert!(matches!(err, ScrubError::TargetExists { .. }));
        assert!(!first.exists(), "partial artifact should be removed");
        assert_eq!(fs::read_to_string(&second).unwrap(), "existing");
    }
}
