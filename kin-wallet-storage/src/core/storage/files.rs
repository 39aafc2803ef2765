//! Atomic file primitives
//!
//! Writes go to a uniquely named sibling temp file that is synced and then
//! renamed over the target, so a reader sees either the old or the new bytes.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::shared::constants::TEMP_FILE_SUFFIX;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Durably replace the contents of `path` with `data`
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_string_lossy();
    fs::create_dir_all(dir)?;

    let temp_path = dir.join(format!(
        ".{}.{}.{}{}",
        file_name,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
        TEMP_FILE_SUFFIX
    ));

    let result = write_and_rename(&temp_path, path, data).and_then(|_| sync_dir(dir));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(temp_path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)
}

fn sync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    File::open(dir)?.sync_all()?;
    #[cfg(not(unix))]
    let _ = dir;
    Ok(())
}

/// Read a file, mapping "not found" to `None`
pub fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Remove a file; returns whether it existed
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Recursively remove a directory; returns whether it existed
pub fn remove_dir_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Immediate subdirectories of `path`, sorted; empty when `path` is missing
pub fn list_subdirectories(path: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let probed = entries.map(|entry| entry.map(|entry| (entry.path(), entry.file_type().map(|t| t.is_dir()))));
    Ok(keep_directories(probed))
}

// Entries that fail to read are logged and skipped
fn keep_directories<I>(entries: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = io::Result<(PathBuf, io::Result<bool>)>>,
{
    let mut dirs = Vec::new();
    for entry in entries {
        match entry {
            Ok((path, Ok(true))) => dirs.push(path),
            Ok((_, Ok(false))) => {}
            Ok((path, Err(e))) => log::warn!("Skipping unreadable entry {}: {}", path.display(), e),
            Err(e) => log::warn!("Skipping unreadable directory entry: {}", e),
        }
    }
    dirs.sort();
    dirs
}
