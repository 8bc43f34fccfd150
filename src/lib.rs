//! Replay corpus management for a Rivals of Aether ML pipeline.
//!
//! Replays are sorted into one directory per game version ([`manager::ReplayManager::make_collections`]),
//! then rotated one at a time into the live replay folder that the capture process reads
//! ([`manager::ReplayManager::load_next_replay`]). Whether a replay is done is decided only by
//! its artifact directories on disk, so progress survives restarts without a journal.

pub mod collection;
pub mod config;
pub mod error;
pub mod manager;
pub mod progress;
pub mod record;
pub mod sets;
pub mod util;
pub mod version;

pub use collection::ReplayCollection;
pub use config::{ManagerConfig, Settings};
pub use error::{ReplayError, Result};
pub use manager::ReplayManager;
pub use record::ReplayRecord;
