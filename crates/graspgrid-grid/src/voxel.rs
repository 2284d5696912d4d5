use graspgrid_core::{Cloud, CloudView};
use log::{debug, warn};

/// Occupancy over `[0, dims[0]) × [0, dims[1]) × [0, dims[2])`.
///
/// Cells are stored sparsely, sorted in C order (x slowest, z fastest), which
/// is the order occupied cells are recovered in. A cell is occupied iff at
/// least one source point falls into it.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    voxel_size: f32,
    /// `round(max_bound - min_bound)` of the voxelized grid.
    resolution: [usize; 3],
    dims: [usize; 3],
    cells: Vec<[usize; 3]>,
    /// Mean of the source points, used to recenter X/Y.
    center: [f32; 3],
}

impl VoxelGrid {
    /// Voxelize `pts` with cubic voxels of edge `voxel_size`.
    ///
    /// The grid origin sits half a voxel below the cloud minimum, so a voxel
    /// index is `floor((p - min + voxel/2) / voxel)`. Each index is scaled by
    /// `voxel_size` and truncated to obtain its cell, which lets the grid
    /// extend slightly past the raw cloud.
    pub fn build(pts: CloudView<'_>, voxel_size: f32) -> Self {
        let mut grid = VoxelGrid {
            voxel_size,
            resolution: [0; 3],
            dims: [0; 3],
            cells: Vec::new(),
            center: [0.0; 3],
        };
        if !(voxel_size > 0.0 && voxel_size.is_finite()) {
            warn!("voxelize: ignoring non-positive voxel size {voxel_size}");
            return grid;
        }

        let finite: Vec<usize> = (0..pts.len())
            .filter(|&i| pts.x[i].is_finite() && pts.y[i].is_finite() && pts.z[i].is_finite())
            .collect();
        if finite.len() < pts.len() {
            debug!("voxelize: skipped {} non-finite points", pts.len() - finite.len());
        }
        if finite.is_empty() { return grid; }

        let cols = [pts.x, pts.y, pts.z];
        let mut min = [f32::INFINITY; 3];
        let mut sum = [0.0f64; 3];
        for &i in &finite {
            for k in 0..3 {
                min[k] = min[k].min(cols[k][i]);
                sum[k] += cols[k][i] as f64;
            }
        }
        let n = finite.len() as f64;
        grid.center = sum.map(|s| (s / n) as f32);

        let half = voxel_size * 0.5;
        let inv = 1.0 / voxel_size;
        let mut max_idx = [0usize; 3];
        let mut cells = Vec::with_capacity(finite.len());
        for &i in &finite {
            let mut cell = [0usize; 3];
            for k in 0..3 {
                let idx = ((cols[k][i] - min[k] + half) * inv).floor().max(0.0) as usize;
                max_idx[k] = max_idx[k].max(idx);
                cell[k] = (idx as f32 * voxel_size) as usize;
            }
            cells.push(cell);
        }
        cells.sort_unstable();
        cells.dedup();

        for k in 0..3 {
            // max_bound - min_bound of the voxel grid = (max index + 1) voxels
            grid.resolution[k] = ((max_idx[k] + 1) as f32 * voxel_size).round() as usize;
            let needed = cells.iter().map(|c| c[k] + 1).max().unwrap_or(0);
            grid.dims[k] = grid.resolution[k].max(needed);
        }
        grid.cells = cells;
        debug!(
            "voxelize: {} pts -> {} cells, resolution {:?}, voxel {}",
            finite.len(), grid.cells.len(), grid.resolution, voxel_size
        );
        grid
    }

    pub fn voxel_size(&self) -> f32 { self.voxel_size }
    pub fn resolution(&self) -> [usize; 3] { self.resolution }
    pub fn dims(&self) -> [usize; 3] { self.dims }
    pub fn occupied_count(&self) -> usize { self.cells.len() }
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    /// Occupied cells in C order.
    pub fn cells(&self) -> &[[usize; 3]] { &self.cells }

    pub fn is_occupied(&self, cell: [usize; 3]) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    /// Occupied cells as world points: X/Y shifted by half the resolution and
    /// moved onto the source centroid, Z left as the scaled index.
    pub fn to_points(&self) -> VoxelPointSet {
        let shift_x = self.resolution[0] as f32 / 2.0;
        let shift_y = self.resolution[1] as f32 / 2.0;
        let mut points = Cloud::with_capacity(self.cells.len());
        for c in &self.cells {
            points.push(
                canonical(c[0] as f32 - shift_x + self.center[0]),
                canonical(c[1] as f32 - shift_y + self.center[1]),
                c[2] as f32,
            );
        }
        VoxelPointSet { points, voxel_size: self.voxel_size }
    }
}

// fold -0.0 into 0.0 so equal coordinates share one bit pattern
#[inline]
fn canonical(v: f32) -> f32 { if v == 0.0 { 0.0 } else { v } }

/// World-space centers of occupied voxels, in C order of their cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoxelPointSet {
    pub points: Cloud,
    pub voxel_size: f32,
}

impl VoxelPointSet {
    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }
}

/// Voxelize a cloud and return its occupied voxel centers.
/// Empty input (or a non-positive voxel size) yields an empty set.
pub fn voxelize(cloud: &Cloud, voxel_size: f32) -> VoxelPointSet {
    VoxelGrid::build(cloud.into(), voxel_size).to_points()
}
