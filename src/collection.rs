use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::error::{ReplayError, Result};
use crate::record::ReplayRecord;
use crate::util;

/// True iff `frames_root/<id>` and `labels_root/<id>` are both non-empty directories.
pub fn is_collected(frames_root: &Path, labels_root: &Path, id: &str) -> bool {
    util::dir_has_entries(&frames_root.join(id)) && util::dir_has_entries(&labels_root.join(id))
}

/// A directory of same-version replays. The unvisited queue holds replays that
/// are neither collected (see [`is_collected`]) nor offered by
/// [`pop_unvisited`](Self::pop_unvisited) since the last reset.
#[derive(Debug)]
pub struct ReplayCollection {
    name: String,
    collection_path: PathBuf,
    frames_root: PathBuf,
    labels_root: PathBuf,
    replays: Vec<ReplayRecord>,
    offered: Vec<bool>,
    unvisited: VecDeque<usize>,
}

impl ReplayCollection {
    pub fn load(collection_path: &Path, frames_root: &Path, labels_root: &Path) -> Result<Self> {
        if !collection_path.is_dir() {
            return Err(ReplayError::CollectionPathNotFound {
                path: collection_path.to_path_buf(),
            });
        }
        let absolute = |p: &Path| std::path::absolute(p).map_err(|e| ReplayError::io(p, e));
        let collection_path = absolute(collection_path)?;
        let frames_root = absolute(frames_root)?;
        let labels_root = absolute(labels_root)?;
        util::ensure_directory(&frames_root)?;
        util::ensure_directory(&labels_root)?;

        let mut seen = HashSet::new();
        let mut replays = Vec::new();
        for path in util::list_replays(&collection_path)? {
            let record = ReplayRecord::from_path(&path);
            if !seen.insert(record.id().to_string()) {
                return Err(ReplayError::DuplicateReplayId {
                    id: record.id().to_string(),
                    collection: collection_path,
                });
            }
            replays.push(record);
        }

        let mut collection = Self {
            name: util::file_name_string(&collection_path),
            offered: vec![false; replays.len()],
            collection_path,
            frames_root,
            labels_root,
            replays,
            unvisited: VecDeque::new(),
        };
        collection.reset_unvisited();

        tracing::info!(
            collection = %collection.name,
            size = collection.count(),
            unvisited = collection.count_unvisited(),
            "Loaded replay collection"
        );
        Ok(collection)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.collection_path
    }

    pub fn count(&self) -> usize {
        self.replays.len()
    }

    pub fn count_unvisited(&self) -> usize {
        self.unvisited.len()
    }

    pub fn replay_by_id(&self, id: &str) -> Option<&ReplayRecord> {
        self.replays.iter().find(|r| r.id() == id)
    }

    pub fn is_collected(&self, record: &ReplayRecord) -> bool {
        is_collected(&self.frames_root, &self.labels_root, record.id())
    }

    pub fn is_offered(&self, id: &str) -> bool {
        self.replays
            .iter()
            .position(|r| r.id() == id)
            .map(|i| self.offered[i])
            .unwrap_or(false)
    }

    /// Recompute the unvisited queue from artifact state and forget all offers.
    pub fn reset_unvisited(&mut self) -> usize {
        self.offered.iter_mut().for_each(|o| *o = false);
        self.unvisited = (0..self.replays.len())
            .filter(|&i| !self.is_collected(&self.replays[i]))
            .collect();
        tracing::debug!(
            collection = %self.name,
            unvisited = self.unvisited.len(),
            "Reset unvisited replays"
        );
        self.unvisited.len()
    }

    /// Hand out the next unvisited replay in listing order.
    pub fn pop_unvisited(&mut self) -> Option<ReplayRecord> {
        let i = self.unvisited.pop_front()?;
        self.offered[i] = true;
        Some(self.replays[i].clone())
    }
}
