use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Equal-shape, min-max scaled height maps ready for a classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureBatch {
    rows: usize,
    cols: usize,
    samples: Vec<DMatrix<f32>>,
}

impl FeatureBatch {
    pub fn len(&self) -> usize { self.samples.len() }
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    /// (samples, rows, cols)
    pub fn shape(&self) -> (usize, usize, usize) { (self.samples.len(), self.rows, self.cols) }

    pub fn samples(&self) -> &[DMatrix<f32>] { &self.samples }
    pub fn get(&self, i: usize) -> Option<&DMatrix<f32>> { self.samples.get(i) }

    /// Samples at `indices`, keeping the batch shape.
    pub fn select(&self, indices: &[usize]) -> FeatureBatch {
        FeatureBatch {
            rows: self.rows,
            cols: self.cols,
            samples: indices.iter().map(|&i| self.samples[i].clone()).collect(),
        }
    }

    /// Row-major `[sample][row][col]` buffer.
    pub fn to_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.samples.len() * self.rows * self.cols);
        for m in &self.samples {
            for r in 0..self.rows {
                out.extend(m.row(r).iter().copied());
            }
        }
        out
    }
}

/// Rotate 90° counter-clockwise when the map is taller than wide, so every
/// map is wide or square.
pub fn orient(m: DMatrix<f32>) -> DMatrix<f32> {
    if m.nrows() <= m.ncols() { return m; }
    let (r, c) = (m.nrows(), m.ncols());
    DMatrix::from_fn(c, r, |i, j| m[(j, c - 1 - i)])
}

/// Zero-pad on the bottom and right up to `rows` x `cols`.
pub fn pad_to(m: &DMatrix<f32>, rows: usize, cols: usize) -> DMatrix<f32> {
    let mut out = DMatrix::zeros(rows, cols);
    let (r, c) = (m.nrows().min(rows), m.ncols().min(cols));
    out.view_mut((0, 0), (r, c)).copy_from(&m.view((0, 0), (r, c)));
    out
}

/// `(v - min) / (max - min)` over the whole sample. A flat sample (and an
/// empty one) maps to all zeros.
pub fn min_max(m: &mut DMatrix<f32>) {
    if m.is_empty() { return; }
    let lo = m.min();
    let span = m.max() - lo;
    if span > 0.0 && span.is_finite() {
        m.apply(|v| *v = (*v - lo) / span);
    } else {
        m.fill(0.0);
    }
}

/// Orient every map, zero-pad all of them to the element-wise maximum
/// shape, then min-max scale each sample.
pub fn prepare(maps: Vec<DMatrix<f32>>) -> FeatureBatch {
    let oriented: Vec<DMatrix<f32>> = maps.into_iter().map(orient).collect();
    let rows = oriented.iter().map(|m| m.nrows()).max().unwrap_or(0);
    let cols = oriented.iter().map(|m| m.ncols()).max().unwrap_or(0);

    let samples: Vec<DMatrix<f32>> = oriented
        .par_iter()
        .map(|m| {
            let mut p = pad_to(m, rows, cols);
            min_max(&mut p);
            p
        })
        .collect();
    debug!("prepare: {} maps -> {}x{}", samples.len(), rows, cols);
    FeatureBatch { rows, cols, samples }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn seq(r: usize, c: usize, start: f32) -> DMatrix<f32> {
        DMatrix::from_fn(r, c, |i, j| start + (i * c + j) as f32)
    }

    #[test]
    fn wide_and_tall_maps_meet_in_one_shape() {
        let a = seq(3, 5, 1.0);
        let b = seq(6, 2, 1.0);
        let batch = prepare(vec![a, b]);
        assert_eq!(batch.shape(), (2, 3, 6));

        // a keeps its layout; column 5 is padding and sets the minimum
        let pa = batch.get(0).unwrap();
        assert!(pa.column(5).iter().all(|&v| v == 0.0));
        assert_abs_diff_eq!(pa[(0, 0)], 1.0 / 15.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pa[(2, 4)], 1.0);

        // b rotated to 2x6; row 2 is padding
        let pb = batch.get(1).unwrap();
        assert!(pb.row(2).iter().all(|&v| v == 0.0));
        assert!(pb.view((0, 0), (2, 6)).iter().all(|&v| v > 0.0));
    }

    #[test]
    fn rotation_is_counter_clockwise() {
        // [[1,2],[3,4],[5,6]] -> [[2,4,6],[1,3,5]]
        let m = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let r = orient(m);
        assert_eq!(r, DMatrix::from_row_slice(2, 3, &[2.0, 4.0, 6.0, 1.0, 3.0, 5.0]));
    }

    #[test]
    fn square_and_wide_maps_are_not_rotated() {
        let m = seq(2, 2, 0.0);
        assert_eq!(orient(m.clone()), m);
    }

    #[test]
    fn flat_sample_becomes_zeros() {
        let mut m = DMatrix::from_element(2, 3, 7.5f32);
        min_max(&mut m);
        assert!(m.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn scales_each_sample_to_unit_range() {
        let batch = prepare(vec![DMatrix::from_row_slice(1, 3, &[2.0, 4.0, 3.0])]);
        assert_eq!(batch.to_flat(), vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn empty_input_gives_empty_batch() {
        let batch = prepare(Vec::new());
        assert!(batch.is_empty());
        assert_eq!(batch.shape(), (0, 0, 0));
    }
}
