use graspgrid_core::Cloud;
use hashbrown::HashMap;
use log::debug;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::voxel::{voxelize, VoxelPointSet};

/// Top-down height map: rows follow the sorted unique Y coordinates, columns
/// the sorted unique X coordinates, cells hold a Z value (0 where no voxel).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightMap {
    pub xs: Vec<f32>,
    pub ys: Vec<f32>,
    pub values: DMatrix<f32>,
}

impl HeightMap {
    /// Project voxel centers onto (y, x).
    ///
    /// When several points share an (x, y) pair the one appearing last in the
    /// set wins, whatever its Z. Voxel sets come out in C order, so for them
    /// this is the topmost voxel.
    pub fn from_voxels(set: &VoxelPointSet) -> Self {
        let pts = &set.points;
        let xs = sorted_unique(&pts.x);
        let ys = sorted_unique(&pts.y);
        let col_of: HashMap<u32, usize> = xs.iter().enumerate().map(|(i, v)| (v.to_bits(), i)).collect();
        let row_of: HashMap<u32, usize> = ys.iter().enumerate().map(|(i, v)| (v.to_bits(), i)).collect();

        let mut values = DMatrix::<f32>::zeros(ys.len(), xs.len());
        for i in 0..pts.len() {
            let (Some(&r), Some(&c)) = (row_of.get(&pts.y[i].to_bits()), col_of.get(&pts.x[i].to_bits())) else {
                continue; // NaN coordinates never make it into the axes
            };
            values[(r, c)] = pts.z[i];
        }
        debug!("heightmap: {} voxels -> {}x{}", pts.len(), ys.len(), xs.len());
        Self { xs, ys, values }
    }

    pub fn empty() -> Self {
        Self { xs: Vec::new(), ys: Vec::new(), values: DMatrix::zeros(0, 0) }
    }

    /// (rows, cols) = (|unique Y|, |unique X|)
    pub fn shape(&self) -> (usize, usize) { (self.values.nrows(), self.values.ncols()) }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Value at (y row, x column).
    pub fn get(&self, row: usize, col: usize) -> f32 { self.values[(row, col)] }

    /// (min x, max x, min y, max y), `None` when empty.
    pub fn extent(&self) -> Option<[f32; 4]> {
        Some([*self.xs.first()?, *self.xs.last()?, *self.ys.first()?, *self.ys.last()?])
    }

    /// Row-major copy, first row = smallest Y.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.values.row_iter().map(|r| r.iter().copied().collect()).collect()
    }
}

fn sorted_unique(col: &[f32]) -> Vec<f32> {
    let mut v: Vec<f32> = col.iter().copied().filter(|x| !x.is_nan()).collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v.dedup_by(|a, b| a.to_bits() == b.to_bits());
    v
}

/// Voxelize `cloud` and build its height map.
pub fn heightmap(cloud: &Cloud, voxel_size: f32) -> HeightMap {
    let set = voxelize(cloud, voxel_size);
    if set.is_empty() { return HeightMap::empty(); }
    HeightMap::from_voxels(&set)
}
