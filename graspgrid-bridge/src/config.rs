use anyhow::{Context, Result};
use graspgrid_cutout::Kernel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Pipeline knobs shared by the session, batch tools and training helpers.
/// Missing JSON fields fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Z cut applied on every load (points must lie strictly above it).
    pub floor_threshold: f32,
    pub voxel_size: f32,
    /// Every k-th point is drawn in the point-cloud view.
    pub sample_rate: usize,
    pub col_width: f32,
    pub row_height: f32,
    pub kernel: Kernel,
    /// Coordinate multiplier of the batch `.npy` pass.
    pub prepare_scale: f32,
    pub checkpoint_every: usize,
    pub display_rotate_limit: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            floor_threshold: -2.5,
            voxel_size: 10.0,
            sample_rate: 60,
            col_width: 80.0,
            row_height: 50.0,
            kernel: Kernel::K3X3,
            prepare_scale: 10.0,
            checkpoint_every: 10,
            display_rotate_limit: 500.0,
        }
    }
}

pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config: PipelineConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parse config {}", path.display()))?;
    Ok(config)
}
