use chrono::{DateTime, Utc};
use std::fs::{self, File, FileTimes, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Filesystem operations the converter needs
///
/// Errors are plain `io::Error`; callers attach the path.
pub trait FileSystem {
    type Writer: Write;

    /// Create a single directory; an existing directory is an error
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Create a new file for writing; an existing file is an error
    fn create_file(&self, path: &Path) -> io::Result<Self::Writer>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    fn is_empty_dir(&self, path: &Path) -> io::Result<bool>;

    /// Stamp creation and modification time of a file or directory
    fn set_times(&self, path: &Path, created: DateTime<Utc>, modified: DateTime<Utc>)
        -> io::Result<()>;
}

/// The local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    type Writer = BufWriter<File>;

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn create_file(&self, path: &Path) -> io::Result<Self::Writer> {
        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        Ok(BufWriter::new(file))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn is_empty_dir(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::read_dir(path)?.next().is_none())
    }

    fn set_times(
        &self,
        path: &Path,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    ) -> io::Result<()> {
        let times = FileTimes::new().set_modified(modified.into());
        let times = with_created(times, path, created);
        open_for_times(path)?.set_times(times)
    }
}

#[cfg(windows)]
fn with_created(times: FileTimes, _path: &Path, created: DateTime<Utc>) -> FileTimes {
    use std::os::windows::fs::FileTimesExt;
    times.set_created(created.into())
}

#[cfg(target_os = "macos")]
fn with_created(times: FileTimes, _path: &Path, created: DateTime<Utc>) -> FileTimes {
    use std::os::macos::fs::FileTimesExt;
    times.set_created(created.into())
}

#[cfg(not(any(windows, target_os = "macos")))]
fn with_created(times: FileTimes, path: &Path, created: DateTime<Utc>) -> FileTimes {
    log::debug!(
        "Creation time {} not settable on this platform, skipping for {:?}",
        created, path
    );
    times
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    // Needed to open directories at all
    const FILE_FLAG_BACKUP_SEMANTICS: u32 = 0x0200_0000;
    OpenOptions::new()
        .write(true)
        .custom_flags(FILE_FLAG_BACKUP_SEMANTICS)
        .open(path)
}

#[cfg(not(windows))]
fn open_for_times(path: &Path) -> io::Result<File> {
    File::open(path)
}
