//! graspgrid-viewer: plain view data for the three plot kinds.
//!
//! Front ends pick a [`ViewKind`] and draw whatever [`build_view`] hands back;
//! no widget or plotting types cross this boundary.

use graspgrid_core::Cloud;
use graspgrid_cutout::PlotBounds;
use graspgrid_filters::uniform_downsample;
use graspgrid_grid::{heightmap, voxelize, HeightMap, VoxelPointSet};
use log::debug;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Spans at or above this stay unrotated in the heat map.
pub const DEFAULT_ROTATE_LIMIT: f32 = 500.0;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ViewKind {
    PointCloud { sample_rate: usize },
    Voxel { voxel_size: f32 },
    Heatmap { voxel_size: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewData {
    PointCloud(Cloud),
    Voxel(VoxelPointSet),
    Heatmap(HeatmapView),
}

/// Height map as displayed: possibly rotated clockwise, with the extent of
/// the displayed axes.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapView {
    pub map: HeightMap,
    /// Row 0 is the bottom of the plot.
    pub display: DMatrix<f32>,
    /// (min, max) of the horizontal axis then of the vertical axis.
    pub extent: Option<[f32; 4]>,
    /// True when the display shows world Y horizontally.
    pub rotated: bool,
}

impl HeatmapView {
    /// Rotate for display when `width < height < rotate_limit`, where width
    /// and height are the world X and Y spans of the map.
    pub fn from_map(map: HeightMap, rotate_limit: f32) -> Self {
        let Some([x0, x1, y0, y1]) = map.extent() else {
            return HeatmapView { display: map.values.clone(), map, extent: None, rotated: false };
        };
        let (width, height) = (x1 - x0, y1 - y0);
        let rotated = width < height && height < rotate_limit;
        let (display, extent) = if rotated {
            (rotate_clockwise(&map.values), [y0, y1, x0, x1])
        } else {
            (map.values.clone(), [x0, x1, y0, y1])
        };
        debug!("heatmap view {}x{} rotated={rotated}", display.nrows(), display.ncols());
        HeatmapView { map, display, extent: Some(extent), rotated }
    }

    /// Axis bounds used to clamp the cutout rectangle.
    pub fn plot_bounds(&self) -> Option<PlotBounds> {
        self.extent.map(PlotBounds::from_extent)
    }
}

fn rotate_clockwise(m: &DMatrix<f32>) -> DMatrix<f32> {
    let (r, c) = (m.nrows(), m.ncols());
    DMatrix::from_fn(c, r, |i, j| m[(r - 1 - j, i)])
}

/// World point the operator calls the "upper-left" reference corner:
/// (min x, max y) for clouds taller than wide, (min x, min y) otherwise.
pub fn reference_corner(cloud: &Cloud) -> Option<[f32; 2]> {
    let b = cloud.bounds()?;
    let [w, h, _] = b.extent();
    Some(if w < h { [b.min[0], b.max[1]] } else { [b.min[0], b.min[1]] })
}

/// Produce the data one view kind needs.
pub fn build_view(cloud: &Cloud, kind: ViewKind, rotate_limit: f32) -> ViewData {
    match kind {
        ViewKind::PointCloud { sample_rate } => ViewData::PointCloud(uniform_downsample(cloud, sample_rate)),
        ViewKind::Voxel { voxel_size } => ViewData::Voxel(voxelize(cloud, voxel_size)),
        ViewKind::Heatmap { voxel_size } => {
            ViewData::Heatmap(HeatmapView::from_map(heightmap(cloud, voxel_size), rotate_limit))
        }
    }
}
