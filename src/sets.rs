use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::collection::is_collected;
use crate::error::{ReplayError, Result};
use crate::progress::{ProgressConfig, ProgressReporter};
use crate::util;

pub const TRAINING_SET: &str = "training";
pub const TESTING_SET: &str = "testing";
pub const RANDOM_SET: &str = "random";

pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Copy,
    Move,
}

#[derive(Debug, Clone)]
pub struct SetRoots {
    pub frames_root: PathBuf,
    pub labels_root: PathBuf,
    pub sets_root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TransferSummary {
    pub set: String,
    pub mode: TransferMode,
    pub transferred: usize,
    pub skipped: usize,
    pub elapsed: Duration,
    pub warnings: Vec<String>,
}

/// Ids of replays with both artifact directories populated, sorted.
pub fn collected_ids(frames_root: &Path, labels_root: &Path) -> Result<Vec<String>> {
    Ok(util::list_subdirectories(frames_root)?
        .into_iter()
        .filter(|id| is_collected(frames_root, labels_root, id))
        .collect())
}

/// Split every collected replay between the training and testing sets,
/// moving its artifacts. Each replay lands in training with probability `train_ratio`.
///
/// Sets mirror the artifact roots: `<sets>/<set>/frames/<id>/` and `<sets>/<set>/labels/<id>/`.
pub fn make_ml_sets<R: Rng>(
    roots: &SetRoots,
    train_ratio: f64,
    rng: &mut R,
    progress: ProgressConfig,
) -> Result<[TransferSummary; 2]> {
    if !(0.0..=1.0).contains(&train_ratio) {
        return Err(ReplayError::InvalidTrainRatio { ratio: train_ratio });
    }
    let mut training = Vec::new();
    let mut testing = Vec::new();
    for id in collected_ids(&roots.frames_root, &roots.labels_root)? {
        if rng.gen_bool(train_ratio) {
            training.push(id);
        } else {
            testing.push(id);
        }
    }
    tracing::info!(
        training = training.len(),
        testing = testing.len(),
        "Split collected replays"
    );

    Ok([
        transfer_batch(roots, &training, TRAINING_SET, TransferMode::Move, progress)?,
        transfer_batch(roots, &testing, TESTING_SET, TransferMode::Move, progress)?,
    ])
}

/// Copy `sample_size` distinct collected replays into the random set.
pub fn make_random_sample<R: Rng>(
    roots: &SetRoots,
    sample_size: usize,
    rng: &mut R,
    progress: ProgressConfig,
) -> Result<TransferSummary> {
    let ids = collected_ids(&roots.frames_root, &roots.labels_root)?;
    if sample_size > ids.len() {
        return Err(ReplayError::InsufficientReplays {
            requested: sample_size,
            available: ids.len(),
        });
    }
    let batch: Vec<String> = ids.choose_multiple(rng, sample_size).cloned().collect();
    tracing::info!(size = batch.len(), "Drew random sample");
    transfer_batch(roots, &batch, RANDOM_SET, TransferMode::Copy, progress)
}

fn transfer_batch(
    roots: &SetRoots,
    batch: &[String],
    set: &str,
    mode: TransferMode,
    progress: ProgressConfig,
) -> Result<TransferSummary> {
    let set_root = roots.sets_root.join(set);
    let frames_dst_root = set_root.join("frames");
    let labels_dst_root = set_root.join("labels");
    util::ensure_directory(&frames_dst_root)?;
    util::ensure_directory(&labels_dst_root)?;

    let mut reporter = ProgressReporter::new(set, batch.len() as u64, progress);
    let mut transferred = 0usize;
    let mut skipped = 0usize;
    for id in batch {
        let frames_src = roots.frames_root.join(id);
        let labels_src = roots.labels_root.join(id);
        let frames_dst = frames_dst_root.join(id);
        let labels_dst = labels_dst_root.join(id);

        if frames_dst.exists() || labels_dst.exists() {
            reporter.warn(format!("{id} already in {set} set, skipped"));
            skipped += 1;
            reporter.inc(id);
            continue;
        }

        match mode {
            TransferMode::Copy => {
                util::copy_tree(&frames_src, &frames_dst)?;
                util::copy_tree(&labels_src, &labels_dst)?;
            }
            TransferMode::Move => {
                util::move_tree(&frames_src, &frames_dst)?;
                util::move_tree(&labels_src, &labels_dst)?;
            }
        }
        tracing::debug!(replay = %id, set, ?mode, "Transferred artifacts");
        transferred += 1;
        reporter.inc(id);
    }

    let outcome = reporter.finish(&format!("{set} set complete"));
    Ok(TransferSummary {
        set: set.to_string(),
        mode,
        transferred,
        skipped,
        elapsed: outcome.elapsed,
        warnings: outcome.warnings,
    })
}
