use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ReplayError, Result};

pub const REPLAY_EXTENSION: &str = "roa";

pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| ReplayError::io(path, e))?;
    tracing::debug!(path = %path.display(), "Created directory");
    Ok(())
}

pub fn file_name_string(p: &Path) -> String {
    p.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn has_extension(p: &Path, ext: &str) -> bool {
    p.extension()
        .map(|e| e.to_string_lossy() == ext)
        .unwrap_or(false)
}

/// Regular files directly under `dir` with the given extension, sorted by name.
/// Symlinks are not followed.
pub fn list_files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut v = vec![];
    for entry in fs::read_dir(dir).map_err(|e| ReplayError::io(dir, e))? {
        let e = entry.map_err(|e| ReplayError::io(dir, e))?;
        let file_type = e.file_type().map_err(|err| ReplayError::io(&e.path(), err))?;
        let p = e.path();
        if file_type.is_file() && has_extension(&p, ext) {
            v.push(p);
        }
    }
    v.sort();
    Ok(v)
}

pub fn list_replays(dir: &Path) -> Result<Vec<PathBuf>> {
    list_files_with_extension(dir, REPLAY_EXTENSION)
}

/// Names of the directories directly under `dir`, sorted. A missing `dir` yields nothing.
pub fn list_subdirectories(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let mut v = vec![];
    for entry in fs::read_dir(dir).map_err(|e| ReplayError::io(dir, e))? {
        let e = entry.map_err(|e| ReplayError::io(dir, e))?;
        let file_type = e.file_type().map_err(|err| ReplayError::io(&e.path(), err))?;
        if file_type.is_dir() {
            v.push(e.file_name().to_string_lossy().to_string());
        }
    }
    v.sort();
    Ok(v)
}

/// True iff `path` is a directory with at least one entry.
pub fn dir_has_entries(path: &Path) -> bool {
    match fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}

pub fn copy_file_into(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let dst = dest_dir.join(src.file_name().unwrap_or_default());
    fs::copy(src, &dst).map_err(|e| ReplayError::io(src, e))?;
    Ok(dst)
}

/// Move a file into `dest_dir`, replacing a same-named file there.
/// Falls back to copy + delete when a rename is not possible (e.g. across devices).
pub fn move_file_into(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let dst = dest_dir.join(src.file_name().unwrap_or_default());
    if fs::rename(src, &dst).is_err() {
        fs::copy(src, &dst).map_err(|e| ReplayError::io(src, e))?;
        fs::remove_file(src).map_err(|e| ReplayError::io(src, e))?;
    }
    Ok(dst)
}

pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| ReplayError::io(path, e))
}

/// Recursively copy `src` to `dst`. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0usize;
    for entry in WalkDir::new(src).follow_links(false) {
        let e = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            ReplayError::Io {
                path,
                source: e.into(),
            }
        })?;
        let rel = e.path().strip_prefix(src).unwrap_or(e.path());
        let target = dst.join(rel);
        if e.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|err| ReplayError::io(&target, err))?;
        } else if e.file_type().is_file() {
            fs::copy(e.path(), &target).map_err(|err| ReplayError::io(e.path(), err))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Move a whole directory tree. `dst`'s parent must exist.
pub fn move_tree(src: &Path, dst: &Path) -> Result<()> {
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    copy_tree(src, dst)?;
    fs::remove_dir_all(src).map_err(|e| ReplayError::io(src, e))
}
