use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::collection::ReplayCollection;
use crate::config::ManagerConfig;
use crate::error::{ReplayError, Result};
use crate::progress::{ProgressConfig, ProgressReporter};
use crate::record::ReplayRecord;
use crate::util;
use crate::version;

pub const FRAMES_DIR: &str = "frames";
pub const LABELS_DIR: &str = "labels";
pub const SETS_DIR: &str = "sets";
pub const BACKUP_DIR: &str = "backup";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSummary {
    pub moved: usize,
    pub per_version: BTreeMap<String, usize>,
}

/// The live slot (`replays_path`) holds at most one replay while the capture
/// process runs; [`ReplayManager::load_next_replay`] flushes it before copying
/// the next replay in.
#[derive(Debug)]
pub struct ReplayManager {
    replays_path: PathBuf,
    destination_root: PathBuf,
    frames_root: PathBuf,
    labels_root: PathBuf,
    sets_root: PathBuf,
    game_version: String,
    collection: Option<ReplayCollection>,
}

impl ReplayManager {
    pub fn new(config: ManagerConfig) -> Result<Self> {
        let destination_root = config.destination_root().to_path_buf();
        let manager = Self {
            frames_root: destination_root.join(FRAMES_DIR),
            labels_root: destination_root.join(LABELS_DIR),
            sets_root: destination_root.join(SETS_DIR),
            replays_path: config.replays_path,
            destination_root,
            game_version: config.game_version,
            collection: None,
        };

        if !config.skip_folder_creation {
            util::ensure_directory(&manager.frames_root)?;
            util::ensure_directory(&manager.labels_root)?;
        }
        if !config.skip_backups {
            manager.backup_replays()?;
        }
        Ok(manager)
    }

    pub fn replays_path(&self) -> &Path {
        &self.replays_path
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    pub fn frames_root(&self) -> &Path {
        &self.frames_root
    }

    pub fn labels_root(&self) -> &Path {
        &self.labels_root
    }

    pub fn sets_root(&self) -> &Path {
        &self.sets_root
    }

    pub fn game_version(&self) -> &str {
        &self.game_version
    }

    pub fn collection(&self) -> Option<&ReplayCollection> {
        self.collection.as_ref()
    }

    /// Move every replay out of the live slot into `<replays>/backup`.
    pub fn backup_replays(&self) -> Result<usize> {
        let backup = self.replays_path.join(BACKUP_DIR);
        util::ensure_directory(&backup)?;
        let replays = util::list_replays(&self.replays_path)?;
        for path in &replays {
            util::move_file_into(path, &backup)?;
        }
        if !replays.is_empty() {
            tracing::info!(
                count = replays.len(),
                backup = %backup.display(),
                "Backed up live replays"
            );
        }
        Ok(replays.len())
    }

    /// Delete every replay in the live slot. Not recoverable.
    pub fn flush_replays(&self) -> Result<usize> {
        let replays = util::list_replays(&self.replays_path)?;
        for path in &replays {
            util::remove_file(path)?;
            tracing::debug!(path = %path.display(), "Flushed live replay");
        }
        Ok(replays.len())
    }

    /// Replays currently sitting in the live slot.
    pub fn live_replays(&self) -> Result<Vec<ReplayRecord>> {
        Ok(util::list_replays(&self.replays_path)?
            .iter()
            .map(|p| ReplayRecord::from_path(p))
            .collect())
    }

    pub fn default_collection_path(&self) -> Result<PathBuf> {
        let token = version::version_to_token(&self.game_version)?;
        Ok(self.replays_path.join(token))
    }

    /// Load a collection, replacing whatever was loaded before.
    /// Without a path, the collection for the configured game version is used.
    pub fn load_collection(&mut self, collection_path: Option<&Path>) -> Result<String> {
        let path = match collection_path {
            Some(p) => p.to_path_buf(),
            None => self.default_collection_path()?,
        };
        let collection = ReplayCollection::load(&path, &self.frames_root, &self.labels_root)?;
        let name = collection.name().to_string();
        self.collection = Some(collection);
        Ok(name)
    }

    pub fn reset_collection(&mut self) -> Result<usize> {
        let collection = self
            .collection
            .as_mut()
            .ok_or(ReplayError::NoCollectionLoaded)?;
        Ok(collection.reset_unvisited())
    }

    /// Rotate the next unvisited replay into the live slot and prepare its
    /// (empty) artifact directories.
    ///
    /// With `skip_deletions`, replays already in the slot are left in place; the
    /// capture process may then see more than one file.
    pub fn load_next_replay(&mut self, skip_deletions: bool) -> Result<ReplayRecord> {
        if self.collection.is_none() {
            return Err(ReplayError::NoCollectionLoaded);
        }
        if !skip_deletions {
            self.flush_replays()?;
        }

        let collection = self
            .collection
            .as_mut()
            .ok_or(ReplayError::NoCollectionLoaded)?;
        let mut record = collection
            .pop_unvisited()
            .ok_or_else(|| ReplayError::NoUnvisitedReplays {
                collection: collection.name().to_string(),
            })?;

        record.assign_destinations(&self.frames_root, &self.labels_root);
        let dests = [record.frames_dest(), record.labels_dest()];
        for dest in dests.into_iter().flatten() {
            if util::dir_has_entries(dest) {
                return Err(ReplayError::ArtifactDirectoryConflict {
                    path: dest.to_path_buf(),
                });
            }
        }

        util::copy_file_into(record.source_path(), &self.replays_path)?;
        for dest in dests.into_iter().flatten() {
            util::ensure_directory(dest)?;
        }

        tracing::info!(
            replay = record.id(),
            collection = collection.name(),
            remaining = collection.count_unvisited(),
            "Fetched replay into live slot"
        );
        Ok(record)
    }

    /// Like [`load_next_replay`](Self::load_next_replay), but steps past replays whose
    /// artifact directories were left partly written by an earlier capture.
    pub fn load_next_available(&mut self, skip_deletions: bool) -> Result<ReplayRecord> {
        loop {
            match self.load_next_replay(skip_deletions) {
                Err(ReplayError::ArtifactDirectoryConflict { path }) => {
                    tracing::warn!(
                        path = %path.display(),
                        "Skipping replay with partial artifacts"
                    );
                }
                other => return other,
            }
        }
    }

    /// Group the replays in the live folder by their header version token.
    pub fn collections_by_version(&self) -> Result<BTreeMap<String, Vec<ReplayRecord>>> {
        let mut grouped: BTreeMap<String, Vec<ReplayRecord>> = BTreeMap::new();
        for path in util::list_replays(&self.replays_path)? {
            let record = ReplayRecord::from_path(&path);
            let token = record.read_version_token()?;
            grouped.entry(token).or_default().push(record);
        }
        Ok(grouped)
    }

    /// Sort the replays in the live folder into `<destination>/<version token>/`.
    /// Files already sorted are no longer in the live folder, so reruns move nothing.
    pub fn make_collections(&self, progress: ProgressConfig) -> Result<SortSummary> {
        let replays = util::list_replays(&self.replays_path)?;
        let mut reporter = ProgressReporter::new("sort", replays.len() as u64, progress);
        let mut summary = SortSummary::default();
        for path in replays {
            let record = ReplayRecord::from_path(&path);
            let token = record.read_version_token()?;
            let target = self.destination_root.join(&token);
            util::ensure_directory(&target)?;
            util::move_file_into(&path, &target)?;
            tracing::info!(replay = record.id(), version = %token, "Sorted replay");
            summary.moved += 1;
            *summary.per_version.entry(token).or_default() += 1;
            reporter.inc(record.id());
        }
        reporter.finish("sort complete");
        Ok(summary)
    }

    /// Version-token directories under the destination root.
    pub fn list_collections(&self) -> Result<Vec<String>> {
        Ok(util::list_subdirectories(&self.destination_root)?
            .into_iter()
            .filter(|name| version::is_version_token(name))
            .collect())
    }
}
