//! graspgrid-features: height maps to classifier input, plus the dataset,
//! split and metric helpers used around training.

mod dataset;
pub mod metrics;
mod normalize;
mod split;

pub use dataset::Dataset;
pub use metrics::{accuracy, argmax, decode, evaluate, hardmax, ConfusionMatrix, Evaluation};
pub use normalize::{min_max, orient, pad_to, prepare, FeatureBatch};
pub use split::{random_split, DEFAULT_TRAIN_FRACTION};
