use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{ReplayError, Result};
use crate::util;
use crate::version;

/// A single replay file, identified by its file name.
///
/// The id is also the name of the replay's frames and labels artifact directories.
#[derive(Debug, Clone)]
pub struct ReplayRecord {
    id: String,
    source_path: PathBuf,
    frames_dest: Option<PathBuf>,
    labels_dest: Option<PathBuf>,
}

impl PartialEq for ReplayRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ReplayRecord {}

impl ReplayRecord {
    pub fn from_path(path: &Path) -> Self {
        let source_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Self {
            id: util::file_name_string(path),
            source_path,
            frames_dest: None,
            labels_dest: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn frames_dest(&self) -> Option<&Path> {
        self.frames_dest.as_deref()
    }

    pub fn labels_dest(&self) -> Option<&Path> {
        self.labels_dest.as_deref()
    }

    /// Point the artifact destinations at `<root>/<id>`. Creates nothing.
    pub fn assign_destinations(&mut self, frames_root: &Path, labels_root: &Path) {
        self.frames_dest = Some(frames_root.join(&self.id));
        self.labels_dest = Some(labels_root.join(&self.id));
    }

    pub fn read_version_token(&self) -> Result<String> {
        let unreadable = |source| ReplayError::ReplayUnreadable {
            path: self.source_path.clone(),
            source,
        };
        let file = File::open(&self.source_path).map_err(unreadable)?;
        let mut line = Vec::new();
        BufReader::new(file)
            .read_until(b'\n', &mut line)
            .map_err(unreadable)?;
        version::extract_version_token(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn id_is_the_file_name_with_extension() {
        let rec = ReplayRecord::from_path(Path::new("/data/01_04_00/match01.roa"));
        assert_eq!(rec.id(), "match01.roa");
        assert_eq!(rec.source_path(), Path::new("/data/01_04_00/match01.roa"));
        assert!(rec.frames_dest().is_none());
    }

    #[test]
    fn destinations_derive_from_id() {
        let mut rec = ReplayRecord::from_path(Path::new("/data/match01.roa"));
        rec.assign_destinations(Path::new("/out/frames"), Path::new("/out/labels"));
        assert_eq!(rec.frames_dest(), Some(Path::new("/out/frames/match01.roa")));
        assert_eq!(rec.labels_dest(), Some(Path::new("/out/labels/match01.roa")));
        assert!(!Path::new("/out/frames/match01.roa").exists());
    }

    #[test]
    fn version_token_comes_from_first_line() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("m.roa");
        fs::write(&path, b"R011502xxxx\nplayer data 99_99_99").unwrap();
        let rec = ReplayRecord::from_path(&path);
        assert_eq!(rec.read_version_token().unwrap(), "01_15_02");
        assert_eq!(fs::read(&path).unwrap(), b"R011502xxxx\nplayer data 99_99_99");
    }

    #[test]
    fn short_first_line_is_malformed_even_if_file_is_long() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("m.roa");
        fs::write(&path, b"R01\n0400000000").unwrap();
        let rec = ReplayRecord::from_path(&path);
        assert!(matches!(
            rec.read_version_token(),
            Err(ReplayError::MalformedReplayHeader { .. })
        ));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let tmp = TempDir::new().expect("tempdir");
        let rec = ReplayRecord::from_path(&tmp.path().join("gone.roa"));
        assert!(matches!(
            rec.read_version_token(),
            Err(ReplayError::ReplayUnreadable { .. })
        ));
    }

    #[test]
    fn equality_is_by_id() {
        let a = ReplayRecord::from_path(Path::new("/x/m.roa"));
        let mut b = ReplayRecord::from_path(Path::new("/y/m.roa"));
        b.assign_destinations(Path::new("/f"), Path::new("/l"));
        assert_eq!(a, b);
    }
}
