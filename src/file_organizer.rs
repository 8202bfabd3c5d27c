/// Moving classified files into their category directories.
///
/// An [`Organizer`] lists the immediate entries of a source directory once,
/// classifies every regular file by extension and moves each match into
/// `<source>/<category>/`. A failed move is recorded as an outcome and the
/// run carries on with the next file.
use crate::file_category::{Category, CategoryTable};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that stop a run before any file is touched.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The source path does not name an existing directory.
    #[error("Invalid source directory: {}", .path.display())]
    InvalidSource { path: PathBuf },
    /// The directory exists but its entries could not be listed.
    #[error("Error reading directory {}: {source}", .path.display())]
    ListFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors from moving a single file.
#[derive(Debug, Error)]
pub enum MoveError {
    /// The category directory could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The path has no final file name component.
    #[error("{} has no file name", .path.display())]
    NoFileName { path: PathBuf },
    /// The rename itself failed.
    #[error("{} -> {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The copy fallback across filesystems failed.
    #[error("{} -> {} (cross-device copy): {source}", .from.display(), .to.display())]
    CrossDevice {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What happened to one classified file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Moved {
        file_name: String,
        category: Category,
        destination: PathBuf,
    },
    MoveFailed {
        file_name: String,
        category: Category,
        message: String,
    },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Moved { file_name, .. } | FileOutcome::MoveFailed { file_name, .. } => {
                file_name
            }
        }
    }

    pub fn category(&self) -> Category {
        match self {
            FileOutcome::Moved { category, .. } | FileOutcome::MoveFailed { category, .. } => {
                *category
            }
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, FileOutcome::Moved { .. })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Moved {
                file_name,
                category,
                ..
            } => write!(f, "Moved {} to {}", file_name, category),
            FileOutcome::MoveFailed { message, .. } => {
                write!(f, "Error moving file: {}", message)
            }
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizeReport {
    pub source_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    /// Every immediate entry of the source directory, files or not.
    pub entries_scanned: usize,
    /// Regular files whose extension matched no category.
    pub unclassified: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl OrganizeReport {
    fn new(source_dir: &Path) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            started_at: Utc::now(),
            entries_scanned: 0,
            unclassified: 0,
            outcomes: Vec::new(),
        }
    }

    /// True when the source directory had no entries at all.
    pub fn is_empty_source(&self) -> bool {
        self.entries_scanned == 0
    }

    pub fn moved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_moved()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.moved_count()
    }

    /// Number of files successfully moved into each category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for outcome in self.outcomes.iter().filter(|o| o.is_moved()) {
            *counts.entry(outcome.category()).or_insert(0) += 1;
        }
        counts
    }
}

/// Classifies and moves the regular files of one directory.
#[derive(Debug, Clone, Default)]
pub struct Organizer {
    table: CategoryTable,
}

impl Organizer {
    pub fn new(table: CategoryTable) -> Self {
        Self { table }
    }

    /// Organizes `source_dir` and returns the collected outcomes.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::file_organizer::Organizer;
    /// use std::path::Path;
    ///
    /// let report = Organizer::default().organize(Path::new("/home/me/Downloads"))?;
    /// println!("moved {} files", report.moved_count());
    /// # Ok::<(), dirsort::file_organizer::OrganizeError>(())
    /// ```
    pub fn organize(&self, source_dir: &Path) -> Result<OrganizeReport, OrganizeError> {
        self.organize_with(source_dir, |_| {})
    }

    /// Organizes `source_dir`, handing each outcome to `on_outcome` as soon
    /// as that file is done.
    ///
    /// Fails only if `source_dir` is not a directory or cannot be listed; in
    /// that case nothing has been created or moved.
    pub fn organize_with<F>(
        &self,
        source_dir: &Path,
        mut on_outcome: F,
    ) -> Result<OrganizeReport, OrganizeError>
    where
        F: FnMut(&FileOutcome),
    {
        if !source_dir.is_dir() {
            return Err(OrganizeError::InvalidSource {
                path: source_dir.to_path_buf(),
            });
        }

        let mut entries = fs::read_dir(source_dir)
            .and_then(|entries| entries.collect::<io::Result<Vec<_>>>())
            .map_err(|source| OrganizeError::ListFailed {
                path: source_dir.to_path_buf(),
                source,
            })?;
        entries.sort_by_key(|entry| entry.file_name());

        info!(source = %source_dir.display(), entries = entries.len(), "organizing");
        let mut report = OrganizeReport::new(source_dir);
        report.entries_scanned = entries.len();

        for entry in entries {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            match entry.file_type() {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => {
                    debug!(file = %file_name, "not a regular file, skipping");
                    continue;
                }
                Err(e) => {
                    debug!(file = %file_name, error = %e, "cannot stat entry, skipping");
                    continue;
                }
            }

            let Some(category) = self.table.classify(&file_name) else {
                debug!(file = %file_name, "no category for extension");
                report.unclassified += 1;
                continue;
            };

            let outcome = match move_to_category(source_dir, &entry.path(), category) {
                Ok(destination) => {
                    debug!(file = %file_name, %category, "moved");
                    FileOutcome::Moved {
                        file_name,
                        category,
                        destination,
                    }
                }
                Err(e) => {
                    warn!(file = %file_name, %category, error = %e, "move failed");
                    FileOutcome::MoveFailed {
                        file_name,
                        category,
                        message: e.to_string(),
                    }
                }
            };
            on_outcome(&outcome);
            report.outcomes.push(outcome);
        }

        info!(
            moved = report.moved_count(),
            failed = report.failed_count(),
            unclassified = report.unclassified,
            "done"
        );
        Ok(report)
    }
}

/// Creates `<source_dir>/<category>` (and any missing parents) if needed.
pub fn ensure_destination(source_dir: &Path, category: Category) -> Result<PathBuf, MoveError> {
    let category_path = source_dir.join(category.dir_name());
    fs::create_dir_all(&category_path).map_err(|source| MoveError::CreateDirectory {
        path: category_path.clone(),
        source,
    })?;
    Ok(category_path)
}

/// Moves `file_path` into the category directory under `source_dir`.
///
/// An existing file of the same name at the destination is replaced. When
/// source and destination are on different filesystems the file is copied
/// and the source removed; see [`copy_then_replace`].
///
/// Returns the destination path.
pub fn move_to_category(
    source_dir: &Path,
    file_path: &Path,
    category: Category,
) -> Result<PathBuf, MoveError> {
    let category_path = ensure_destination(source_dir, category)?;

    let file_name = file_path.file_name().ok_or_else(|| MoveError::NoFileName {
        path: file_path.to_path_buf(),
    })?;
    let destination = category_path.join(file_name);

    match fs::rename(file_path, &destination) {
        Ok(()) => Ok(destination),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(file = %file_path.display(), "rename crosses devices, copying");
            copy_then_replace(file_path, &destination).map_err(|source| {
                MoveError::CrossDevice {
                    from: file_path.to_path_buf(),
                    to: destination.clone(),
                    source,
                }
            })?;
            Ok(destination)
        }
        Err(source) => Err(MoveError::Rename {
            from: file_path.to_path_buf(),
            to: destination,
            source,
        }),
    }
}

/// Copies `from` to `to` through a temporary file beside `to`, then removes `from`.
///
/// The temporary file is renamed over `to` only once fully written, so a
/// half-copied destination is never visible. If `from` cannot be removed
/// afterwards the new copy at `to` is deleted again and the error returned.
pub fn copy_then_replace(from: &Path, to: &Path) -> io::Result<()> {
    let dir = to.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent")
    })?;

    let mut source = fs::File::open(from)?;
    let permissions = source.metadata()?.permissions();

    // Dropped (and deleted) on any early return below.
    let mut staging = NamedTempFile::new_in(dir)?;
    io::copy(&mut source, staging.as_file_mut())?;
    staging.as_file().sync_all()?;
    staging.as_file().set_permissions(permissions)?;
    drop(source);

    staging.persist(to).map_err(|e| e.error)?;

    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_move_creates_category_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "test content").unwrap();

        let destination = move_to_category(base_path, &file_path, Category::Documents)
            .expect("Failed to move file");

        assert_eq!(destination, base_path.join("documents").join("test.txt"));
        assert!(base_path.join("documents").is_dir());
        assert!(!file_path.exists());
        assert_eq!(fs::read_to_string(destination).unwrap(), "test content");
    }

    #[test]
    fn test_move_uses_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path();
        fs::create_dir(base_path.join("images")).unwrap();
        let file_path = base_path.join("test.png");
        fs::write(&file_path, "png").unwrap();

        move_to_category(base_path, &file_path, Category::Images).unwrap();

        assert!(!file_path.exists());
        assert!(base_path.join("images/test.png").exists());
    }

    #[test]
    fn test_move_replaces_existing_destination() {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path();
        fs::create_dir(base_path.join("documents")).unwrap();
        fs::write(base_path.join("documents/a.txt"), "old").unwrap();
        fs::write(base_path.join("a.txt"), "new").unwrap();

        move_to_category(base_path, &base_path.join("a.txt"), Category::Documents).unwrap();

        assert_eq!(
            fs::read_to_string(base_path.join("documents/a.txt")).unwrap(),
            "new"
        );
        assert!(!base_path.join("a.txt").exists());
    }

    #[test]
    fn test_move_fails_when_category_path_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path();
        fs::write(base_path.join("music"), "not a directory").unwrap();
        let file_path = base_path.join("song.mp3");
        fs::write(&file_path, "mp3").unwrap();

        let result = move_to_category(base_path, &file_path, Category::Music);

        assert!(matches!(result, Err(MoveError::CreateDirectory { .. })));
        assert!(file_path.exists());
    }

    #[test]
    fn test_move_missing_source_file() {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path();

        let result = move_to_category(base_path, &base_path.join("gone.zip"), Category::Archives);

        assert!(matches!(result, Err(MoveError::Rename { .. })));
    }

    #[test]
    fn test_copy_then_replace() {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path();
        let from = base_path.join("clip.mov");
        let to_dir = base_path.join("videos");
        fs::create_dir(&to_dir).unwrap();
        let to = to_dir.join("clip.mov");
        fs::write(&from, b"fresh").unwrap();
        fs::write(&to, b"stale").unwrap();

        copy_then_replace(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"fresh");
        assert_eq!(fs::read_dir(&to_dir).unwrap().count(), 1);
    }

    #[test]
    fn test_copy_then_replace_missing_source_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path();
        let to = base_path.join("out.bin");

        assert!(copy_then_replace(&base_path.join("absent.bin"), &to).is_err());
        assert!(!to.exists());
        assert_eq!(fs::read_dir(base_path).unwrap().count(), 0);
    }

    #[test]
    fn test_outcome_lines() {
        let moved = FileOutcome::Moved {
            file_name: "report.PDF".to_string(),
            category: Category::Documents,
            destination: PathBuf::from("/src/documents/report.PDF"),
        };
        let failed = FileOutcome::MoveFailed {
            file_name: "x.zip".to_string(),
            category: Category::Archives,
            message: "Permission denied (os error 13)".to_string(),
        };

        assert_eq!(moved.to_string(), "Moved report.PDF to documents");
        assert_eq!(
            failed.to_string(),
            "Error moving file: Permission denied (os error 13)"
        );
        assert_eq!(failed.file_name(), "x.zip");
        assert_eq!(failed.category(), Category::Archives);
    }

    #[test]
    fn test_organize_invalid_source() {
        let organizer = Organizer::default();
        let result = organizer.organize(Path::new("/does/not/exist"));
        match result {
            Err(e @ OrganizeError::InvalidSource { .. }) => {
                assert_eq!(e.to_string(), "Invalid source directory: /does/not/exist");
            }
            other => panic!("expected InvalidSource, got {:?}", other),
        }
    }

    #[test]
    fn test_organize_source_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("plain.txt");
        fs::write(&file_path, "x").unwrap();

        let result = Organizer::default().organize(&file_path);

        assert!(matches!(result, Err(OrganizeError::InvalidSource { .. })));
        assert!(file_path.exists());
    }

    #[test]
    fn test_organize_counts() {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path();
        for name in ["a.txt", "b.mp3", "c.mp3", "d.py", "noext"] {
            fs::write(base_path.join(name), name).unwrap();
        }
        fs::create_dir(base_path.join("nested")).unwrap();

        let mut streamed = Vec::new();
        let report = Organizer::default()
            .organize_with(base_path, |o| streamed.push(o.file_name().to_string()))
            .unwrap();

        assert_eq!(report.entries_scanned, 6);
        assert_eq!(report.moved_count(), 3);
        assert_eq!(report.failed_count(), 0);
        assert_eq!(report.unclassified, 2);
        assert_eq!(streamed, vec!["a.txt", "b.mp3", "c.mp3"]);

        let counts = report.category_counts();
        assert_eq!(counts.get(&Category::Documents), Some(&1));
        assert_eq!(counts.get(&Category::Music), Some(&2));
        assert_eq!(counts.get(&Category::Images), None);
    }
}
