//! graspgrid-core: point-cloud data model, labels and the shared error type.
//!
//! Units are centimeters throughout. Clouds are immutable from the caller's
//! point of view: filters and transforms hand back new instances.

use serde::{Deserialize, Serialize};

mod error;
mod geom;
mod labels;

pub use error::{Error, Result};
pub use geom::{BBox, OffsetSet};
pub use labels::{Arrow, ArrowFlags};

/// Structure-of-Arrays point cloud.
/// Keep the x,y,z columns tight and in source order; order is significant
/// for voxelization and height-map tie breaks downstream.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
}

impl Cloud {
    pub fn with_capacity(n: usize) -> Self {
        Self { x: Vec::with_capacity(n), y: Vec::with_capacity(n), z: Vec::with_capacity(n) }
    }
    pub fn len(&self) -> usize { self.x.len() }
    pub fn is_empty(&self) -> bool { self.x.is_empty() }
    pub fn push(&mut self, px: f32, py: f32, pz: f32) {
        self.x.push(px); self.y.push(py); self.z.push(pz);
    }
    pub fn reserve(&mut self, n: usize) {
        self.x.reserve(n); self.y.reserve(n); self.z.reserve(n);
    }

    #[inline]
    pub fn point(&self, i: usize) -> [f32; 3] { [self.x[i], self.y[i], self.z[i]] }

    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        (0..self.len()).map(move |i| self.point(i))
    }

    /// Coordinate column for `axis`.
    pub fn column(&self, axis: Axis) -> &[f32] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// New cloud holding the points at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> Cloud {
        let mut out = Cloud::with_capacity(indices.len());
        for &i in indices {
            out.push(self.x[i], self.y[i], self.z[i]);
        }
        out
    }

    /// Uniform scale of all three coordinates.
    pub fn scaled(&self, factor: f32) -> Cloud {
        Cloud {
            x: self.x.iter().map(|v| v * factor).collect(),
            y: self.y.iter().map(|v| v * factor).collect(),
            z: self.z.iter().map(|v| v * factor).collect(),
        }
    }

    /// Axis-aligned bounds, `None` for an empty cloud.
    pub fn bounds(&self) -> Option<Aabb> {
        if self.is_empty() { return None; }
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for p in self.points() {
            for k in 0..3 {
                min[k] = min[k].min(p[k]);
                max[k] = max[k].max(p[k]);
            }
        }
        Some(Aabb { min, max })
    }

    /// Mean point (accumulated in f64), `None` for an empty cloud.
    pub fn centroid(&self) -> Option<[f32; 3]> {
        if self.is_empty() { return None; }
        let n = self.len() as f64;
        let sum = |c: &[f32]| c.iter().map(|&v| v as f64).sum::<f64>() / n;
        Some([sum(&self.x) as f32, sum(&self.y) as f32, sum(&self.z) as f32])
    }
}

impl FromIterator<[f32; 3]> for Cloud {
    fn from_iter<I: IntoIterator<Item = [f32; 3]>>(iter: I) -> Self {
        let mut c = Cloud::default();
        for [x, y, z] in iter { c.push(x, y, z); }
        c
    }
}

/// Zero-copy view into a Cloud (slice-of-SoA).
#[derive(Copy, Clone)]
pub struct CloudView<'a> {
    pub x: &'a [f32],
    pub y: &'a [f32],
    pub z: &'a [f32],
}

impl<'a> CloudView<'a> {
    pub fn len(&self) -> usize { self.x.len() }
    pub fn is_empty(&self) -> bool { self.x.is_empty() }
}

impl<'a> From<&'a Cloud> for CloudView<'a> {
    fn from(c: &'a Cloud) -> Self { Self { x: &c.x, y: &c.y, z: &c.z } }
}

/// Coordinate axis selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis { X, Y, Z }

impl Axis {
    pub fn index(self) -> usize {
        match self { Axis::X => 0, Axis::Y => 1, Axis::Z => 2 }
    }

    /// "X" and "Y" select those axes; any other name selects Z.
    pub fn from_name(name: &str) -> Axis {
        match name {
            "X" => Axis::X,
            "Y" => Axis::Y,
            _ => Axis::Z,
        }
    }
}

/// Simple AABB
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb { pub min: [f32; 3], pub max: [f32; 3] }

impl Aabb {
    pub fn contains(&self, p: [f32; 3]) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
    pub fn extent(&self) -> [f32; 3] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1], self.max[2] - self.min[2]]
    }
}
