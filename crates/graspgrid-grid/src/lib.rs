//! graspgrid-grid: voxel occupancy grids and top-down height maps.
//!
//! `voxelize` turns a cloud into the world-space centers of its occupied
//! voxels; `heightmap` projects those onto a dense (Y, X) matrix of Z values.

mod heightmap;
mod voxel;

pub use heightmap::{heightmap, HeightMap};
pub use voxel::{voxelize, VoxelGrid, VoxelPointSet};
