//! Output of rendered schema documents.
//!
//! Generated documents are usually committed, so the writer leaves a file
//! alone when its content is already current and can tell whether a file
//! on disk matches a freshly rendered document.

use crate::error::{CliResult, WriteError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Outcome of [`FileWriter::write`].
#[derive(Debug, PartialEq, Eq)]
pub enum WriteResult {
    /// The file was created or replaced.
    Written { path: PathBuf, bytes: usize },

    /// The file already held exactly this content.
    Unchanged { path: PathBuf },

    /// Dry run; nothing was touched.
    DryRun { path: PathBuf, content: String },
}

impl WriteResult {
    /// The target path.
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. }
            | WriteResult::Unchanged { path }
            | WriteResult::DryRun { path, .. } => path,
        }
    }

    /// Whether the file on disk was modified.
    pub fn modified_disk(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }
}

/// How a file on disk compares to freshly rendered content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Same content, ignoring surrounding whitespace.
    UpToDate,

    /// The file exists but differs.
    Stale,

    /// There is no file.
    Missing,
}

/// Writes documents, optionally as a dry run or without replacing files.
#[derive(Debug)]
pub struct FileWriter {
    dry_run: bool,
    overwrite: bool,
}

impl FileWriter {
    /// Create a writer that replaces existing files.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            overwrite: true,
        }
    }

    /// Set whether a file with different content may be replaced.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Check if running in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Write `content` to `path`, creating parent directories.
    pub fn write(&self, path: &Path, content: &str) -> CliResult<WriteResult> {
        let target = path.to_path_buf();
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                path: target,
                content: content.to_string(),
            });
        }

        match read_existing(path)? {
            Some(existing) if existing == content => {
                tracing::debug!(path = %path.display(), "content unchanged, skipping write");
                return Ok(WriteResult::Unchanged { path: target });
            }
            Some(_) if !self.overwrite => {
                return Err(WriteError::AlreadyExists { path: target }.into());
            }
            _ => {}
        }

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| WriteError::WriteFile {
            path: target.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(WriteResult::Written {
            path: target,
            bytes: content.len(),
        })
    }

    /// Compare the file at `path` with freshly rendered `content`.
    pub fn freshness(path: &Path, content: &str) -> CliResult<Freshness> {
        Ok(match read_existing(path)? {
            None => Freshness::Missing,
            Some(existing) if existing.trim() == content.trim() => Freshness::UpToDate,
            Some(_) => Freshness::Stale,
        })
    }
}

/// Read a file, treating a missing file as `None`.
fn read_existing(path: &Path) -> CliResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(existing) => Ok(Some(existing)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(WriteError::ReadFile {
            path: path.to_path_buf(),
            source,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tempfile::TempDir;

    const CONTENT: &str = "{\n  \"title\": \"Tag\"\n}\n";

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/Tag.schema.json");

        let result = FileWriter::new(false).write(&path, CONTENT).unwrap();

        assert_eq!(
            result,
            WriteResult::Written {
                path: path.clone(),
                bytes: CONTENT.len()
            }
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CONTENT);
    }

    #[test]
    fn test_identical_content_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Tag.schema.json");
        std::fs::write(&path, CONTENT).unwrap();

        let result = FileWriter::new(false)
            .with_overwrite(false)
            .write(&path, CONTENT)
            .unwrap();

        assert_eq!(result, WriteResult::Unchanged { path });
        assert!(!result.modified_disk());
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Tag.schema.json");

        let writer = FileWriter::new(true);
        assert!(writer.is_dry_run());
        let result = writer.write(&path, CONTENT).unwrap();

        assert!(!path.exists());
        assert!(!result.modified_disk());
        assert_eq!(result.path(), path.as_path());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tagschema.toml");
        std::fs::write(&path, "# existing").unwrap();

        let err = FileWriter::new(false)
            .with_overwrite(false)
            .write(&path, CONTENT)
            .unwrap_err();

        assert!(matches!(
            err,
            CliError::Write(WriteError::AlreadyExists { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# existing");
    }

    #[test]
    fn test_freshness() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Tag.schema.json");
        assert_eq!(
            FileWriter::freshness(&path, CONTENT).unwrap(),
            Freshness::Missing
        );

        std::fs::write(&path, CONTENT.trim_end()).unwrap();
        assert_eq!(
            FileWriter::freshness(&path, CONTENT).unwrap(),
            Freshness::UpToDate
        );

        std::fs::write(&path, "{}").unwrap();
        assert_eq!(
            FileWriter::freshness(&path, CONTENT).unwrap(),
            Freshness::Stale
        );
    }
}
