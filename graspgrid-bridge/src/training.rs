//! Glue around an external training loop: cooperative stop, epoch and
//! checkpoint bookkeeping, and dataset assembly from a cutout directory.

use anyhow::{Context, Result};
use graspgrid_features::{random_split, Dataset, DEFAULT_TRAIN_FRACTION};
use graspgrid_labels::{find_label_file, LabelStore, UseCase};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::PipelineConfig;

/// Shared cancel request, checked by the worker between epochs.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self { Self::default() }
    pub fn request(&self) { self.0.store(true, Ordering::SeqCst); }
    pub fn is_requested(&self) -> bool { self.0.load(Ordering::SeqCst) }
    pub fn reset(&self) { self.0.store(false, Ordering::SeqCst); }
}

/// One epoch handed to the training callback.
#[derive(Clone, Debug, PartialEq)]
pub struct Epoch {
    pub index: usize,
    /// Where to write model weights this epoch, if it is a checkpoint epoch.
    pub checkpoint: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub stopped: bool,
}

#[derive(Clone, Debug)]
pub struct EpochSchedule {
    pub epochs: usize,
    /// Checkpoint when `epoch % checkpoint_every == 0`; 0 disables.
    pub checkpoint_every: usize,
    pub out_dir: PathBuf,
}

impl EpochSchedule {
    pub fn new(epochs: usize, config: &PipelineConfig, out_dir: impl Into<PathBuf>) -> Self {
        Self { epochs, checkpoint_every: config.checkpoint_every, out_dir: out_dir.into() }
    }

    pub fn checkpoint_path(&self, epoch: usize) -> Option<PathBuf> {
        if self.checkpoint_every == 0 || epoch % self.checkpoint_every != 0 { return None; }
        Some(self.out_dir.join(format!("GraspDirection_Model_Epoch_{epoch}.pth")))
    }

    /// Run `step` once per epoch. The stop flag is consulted after each
    /// finished epoch, never in the middle of one.
    pub fn run<F>(&self, stop: &StopFlag, mut step: F) -> Result<RunSummary>
    where
        F: FnMut(&Epoch) -> Result<()>,
    {
        let mut completed = 0;
        for index in 0..self.epochs {
            let epoch = Epoch { index, checkpoint: self.checkpoint_path(index) };
            step(&epoch).with_context(|| format!("epoch {index}"))?;
            completed += 1;
            if stop.is_requested() {
                info!("training stopped after epoch {index}");
                return Ok(RunSummary { completed, stopped: true });
            }
        }
        Ok(RunSummary { completed, stopped: false })
    }
}

/// Kernel key encoded in a cutout file name: the last `_` segment of the
/// stem, e.g. `scan_Cutout_3x3.csv` -> `3x3`.
pub fn kernel_from_name(name: &str) -> &str {
    let stem = Path::new(name).file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    stem.rsplit('_').next().unwrap_or(stem)
}

fn open_store(cutout_dir: &Path) -> Result<LabelStore> {
    let file = find_label_file(cutout_dir)?
        .with_context(|| format!("no *Results_Labeled.csv in {}", cutout_dir.display()))?;
    Ok(LabelStore::open_file(file)?)
}

pub struct TrainingSets {
    pub train: Dataset,
    pub valid: Dataset,
}

/// Train records of the store in `cutout_dir`, split into train/valid.
pub fn load_training_sets(cutout_dir: &Path, config: &PipelineConfig, seed: u64) -> Result<TrainingSets> {
    let store = open_store(cutout_dir)?;
    let all = Dataset::load(&store, cutout_dir, UseCase::Train, config.voxel_size, config.floor_threshold)?;
    if all.is_empty() {
        warn!("no train records in {}", cutout_dir.display());
    }
    let (t, v) = random_split(all.len(), DEFAULT_TRAIN_FRACTION, seed);
    Ok(TrainingSets { train: all.subset(&t), valid: all.subset(&v) })
}

/// Test records of the store in `cutout_dir`.
pub fn load_test_set(cutout_dir: &Path, config: &PipelineConfig) -> Result<Dataset> {
    let store = open_store(cutout_dir)?;
    Ok(Dataset::load(&store, cutout_dir, UseCase::Test, config.voxel_size, config.floor_threshold)?)
}
