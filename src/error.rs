use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    /// A dotted version or underscore token had a non-numeric or empty component.
    #[error("invalid version format: {input:?}")]
    InvalidVersionFormat { input: String },

    /// The first line of a replay file does not carry a readable version.
    #[error("malformed replay header: {detail}")]
    MalformedReplayHeader { detail: String },

    #[error("replay unreadable: {}: {source}", .path.display())]
    ReplayUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("collection path not found or not a directory: {}", .path.display())]
    CollectionPathNotFound { path: PathBuf },

    /// Every replay in the collection has been offered or collected.
    #[error("no unvisited replays left in collection {collection:?}")]
    NoUnvisitedReplays { collection: String },

    #[error("artifact directory already populated: {}", .path.display())]
    ArtifactDirectoryConflict { path: PathBuf },

    #[error("duplicate replay id {id:?} in {}", .collection.display())]
    DuplicateReplayId { id: String, collection: PathBuf },

    #[error("no replay collection loaded")]
    NoCollectionLoaded,

    #[error("requested {requested} replays but only {available} are collected")]
    InsufficientReplays { requested: usize, available: usize },

    /// Split ratios outside `[0, 1]`, NaN included.
    #[error("train-ratio must be between 0 and 1, got {ratio}")]
    InvalidTrainRatio { ratio: f64 },

    #[error("config unreadable: {}: {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {message}", .path.display())]
    ConfigInvalid { path: PathBuf, message: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReplayError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_version(input: &str) -> Self {
        Self::InvalidVersionFormat {
            input: input.to_string(),
        }
    }

    /// Work exhausted for the current pass, as opposed to a real failure.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::NoUnvisitedReplays { .. })
    }
}
