//! graspgrid-bridge: the pipeline wired together for interactive front ends
//! and batch tools.
//!
//! `LabelingSession` owns the state a labeling window needs (open cloud,
//! kernel, cutout flag, pending offsets); `training` carries the helpers an
//! external training loop calls into.

pub mod config;
pub mod session;
pub mod training;

pub use config::{load_config, PipelineConfig};
pub use session::{LabelingSession, Saved};
pub use training::{
    kernel_from_name, load_test_set, load_training_sets, Epoch, EpochSchedule, RunSummary, StopFlag,
    TrainingSets,
};
