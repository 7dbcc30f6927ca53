use crate::fs::FileSystem;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Something a conversion run put on disk, with the times it should end up with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedEntity {
    File {
        path: PathBuf,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    },
    Directory {
        path: PathBuf,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    },
}

impl CreatedEntity {
    pub fn path(&self) -> &Path {
        match self {
            CreatedEntity::File { path, .. } | CreatedEntity::Directory { path, .. } => path,
        }
    }

    fn times(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            CreatedEntity::File {
                created_at,
                modified_at,
                ..
            }
            | CreatedEntity::Directory {
                created_at,
                modified_at,
                ..
            } => (*created_at, *modified_at),
        }
    }
}

/// Outcome of [`ConversionRecord::finalize`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    pub removed: usize,
    pub stamped: usize,
    pub failures: usize,
}

/// Append-only log of everything one run created, in creation order
#[derive(Debug, Default)]
pub struct ConversionRecord {
    entries: Vec<CreatedEntity>,
    records_written: HashMap<PathBuf, usize>,
}

impl ConversionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created_directory(
        &mut self,
        path: &Path,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    ) {
        debug!("Created directory {:?}", path);
        self.entries.push(CreatedEntity::Directory {
            path: path.to_path_buf(),
            created_at,
            modified_at,
        });
    }

    pub fn created_file(&mut self, path: &Path, created_at: DateTime<Utc>, modified_at: DateTime<Utc>) {
        debug!("Created file {:?}", path);
        self.records_written.insert(path.to_path_buf(), 0);
        self.entries.push(CreatedEntity::File {
            path: path.to_path_buf(),
            created_at,
            modified_at,
        });
    }

    /// Count one bookmark line written to `path`
    pub fn wrote_record(&mut self, path: &Path) {
        *self.records_written.entry(path.to_path_buf()).or_insert(0) += 1;
    }

    pub fn records_in(&self, path: &Path) -> usize {
        self.records_written.get(path).copied().unwrap_or(0)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Delete or stamp every recorded entity, consuming the log
    ///
    /// With `rollback` everything is deleted. Otherwise files without records
    /// and directories left empty are deleted unless `keep_empty`, and the
    /// survivors get their recorded times. Directories are visited in reverse
    /// creation order, children before parents. Failures are logged, never
    /// returned.
    pub fn finalize<F: FileSystem>(self, fs: &F, rollback: bool, keep_empty: bool) -> FinalizeReport {
        let mut report = FinalizeReport::default();
        let (files, directories): (Vec<_>, Vec<_>) = self
            .entries
            .iter()
            .partition(|e| matches!(e, CreatedEntity::File { .. }));

        let mut survivors = Vec::new();

        for file in files {
            let path = file.path();
            let empty = self.records_in(path) == 0;
            if rollback || (!keep_empty && empty) {
                match fs.remove_file(path) {
                    Ok(()) => {
                        debug!("Removed file {:?}", path);
                        report.removed += 1;
                    }
                    Err(e) => {
                        warn!("Failed to remove {:?}: {}", path, e);
                        report.failures += 1;
                    }
                }
            } else {
                survivors.push(file);
            }
        }

        // Stamping a file does not touch its directory, so files may go first
        let mut surviving_directories = Vec::new();

        for directory in directories.into_iter().rev() {
            let path = directory.path();
            let remove = rollback
                || (!keep_empty
                    && fs.is_empty_dir(path).unwrap_or_else(|e| {
                        warn!("Cannot inspect {:?}: {}", path, e);
                        false
                    }));
            if remove {
                match fs.remove_dir(path) {
                    Ok(()) => {
                        debug!("Removed directory {:?}", path);
                        report.removed += 1;
                    }
                    Err(e) => {
                        warn!("Failed to remove {:?}: {}", path, e);
                        report.failures += 1;
                    }
                }
            } else {
                surviving_directories.push(directory);
            }
        }

        if rollback {
            return report;
        }

        survivors.extend(surviving_directories);
        for entity in survivors {
            let (created_at, modified_at) = entity.times();
            match fs.set_times(entity.path(), created_at, modified_at) {
                Ok(()) => report.stamped += 1,
                Err(e) => {
                    warn!("Failed to set times on {:?}: {}", entity.path(), e);
                    report.failures += 1;
                }
            }
        }

        report
    }
}
