//! graspgrid-filters: pass-through (threshold) filtering, XY crop, sampling.

use graspgrid_core::{Axis, BBox, Cloud};
use log::debug;

/// Comparison kept by [`threshold`]: a point survives when
/// `coordinate <op> threshold` holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Compare { Eq, Ge, Le, Lt, Ne, Gt }

impl Compare {
    /// Parse "=", ">=", "<=", "<", "!=", ">". Anything else means ">".
    pub fn from_symbol(sym: &str) -> Compare {
        match sym {
            "=" => Compare::Eq,
            ">=" => Compare::Ge,
            "<=" => Compare::Le,
            "<" => Compare::Lt,
            "!=" => Compare::Ne,
            _ => Compare::Gt,
        }
    }

    #[inline]
    pub fn keeps(self, v: f32, t: f32) -> bool {
        match self {
            Compare::Eq => v == t,
            Compare::Ge => v >= t,
            Compare::Le => v <= t,
            Compare::Lt => v < t,
            Compare::Ne => v != t,
            Compare::Gt => v > t,
        }
    }
}

impl Default for Compare {
    fn default() -> Self { Compare::Gt }
}

/// Keep the points whose `axis` coordinate satisfies `cmp` against `t`.
/// Relative order of the survivors is preserved; the input is untouched.
pub fn threshold(input: &Cloud, axis: Axis, t: f32, cmp: Compare) -> Cloud {
    let col = input.column(axis);
    let keep: Vec<usize> = (0..input.len()).filter(|&i| cmp.keeps(col[i], t)).collect();
    let out = input.select(&keep);
    debug!("threshold {:?} {:?} {}: {} -> {}", axis, cmp, t, input.len(), out.len());
    out
}

/// Floor removal applied to every freshly loaded cloud (`Z > floor`).
pub fn strip_floor(input: &Cloud, floor: f32) -> Cloud {
    threshold(input, Axis::Z, floor, Compare::Gt)
}

/// Crop to a rectangle with four successive inclusive threshold passes
/// (x >= x1, x <= x2, y >= y1, y <= y2).
pub fn crop_xy(input: &Cloud, b: &BBox) -> Cloud {
    let c = threshold(input, Axis::X, b.x1, Compare::Ge);
    let c = threshold(&c, Axis::X, b.x2, Compare::Le);
    let c = threshold(&c, Axis::Y, b.y1, Compare::Ge);
    threshold(&c, Axis::Y, b.y2, Compare::Le)
}

/// Keep every `k`-th point starting at index 0. `k <= 1` returns a copy.
pub fn uniform_downsample(input: &Cloud, k: usize) -> Cloud {
    let step = k.max(1);
    let idx: Vec<usize> = (0..input.len()).step_by(step).collect();
    input.select(&idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    // small deterministic LCG so the partition check sees varied data
    fn noisy_cloud(n: usize, seed: u64) -> Cloud {
        let mut s = seed;
        let mut next = || {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((s >> 33) as f32 / (1u64 << 31) as f32) * 20.0 - 10.0
        };
        (0..n).map(|_| [next(), next(), next().round()]).collect()
    }

    #[test]
    fn gt_and_le_partition_the_cloud() {
        for seed in 1..6u64 {
            let c = noisy_cloud(200, seed);
            for axis in [Axis::X, Axis::Y, Axis::Z] {
                for t in [-10.0f32, -2.5, 0.0, 3.0, 11.0] {
                    let hi = threshold(&c, axis, t, Compare::Gt);
                    let lo = threshold(&c, axis, t, Compare::Le);
                    assert_eq!(hi.len() + lo.len(), c.len());
                    assert!(hi.column(axis).iter().all(|&v| v > t));
                    assert!(lo.column(axis).iter().all(|&v| v <= t));
                    let mut merged: Vec<[u32; 3]> = hi.points().chain(lo.points())
                        .map(|p| p.map(f32::to_bits)).collect();
                    let mut orig: Vec<[u32; 3]> = c.points().map(|p| p.map(f32::to_bits)).collect();
                    merged.sort();
                    orig.sort();
                    assert_eq!(merged, orig);
                }
            }
        }
    }

    #[test]
    fn unknown_direction_means_greater_than() {
        assert_eq!(Compare::from_symbol("~"), Compare::Gt);
        assert_eq!(Compare::from_symbol(""), Compare::Gt);
        assert_eq!(Compare::from_symbol("!="), Compare::Ne);
    }

    #[test]
    fn survivors_keep_relative_order() {
        let c: Cloud = [[5.0, 0.0, 0.0], [1.0, 0.0, 0.0], [7.0, 0.0, 0.0], [3.0, 0.0, 0.0]]
            .into_iter().collect();
        let out = threshold(&c, Axis::X, 2.0, Compare::Ge);
        assert_eq!(out.x, vec![5.0, 7.0, 3.0]);
        let eq = threshold(&c, Axis::X, 7.0, Compare::Eq);
        assert_eq!(eq.x, vec![7.0]);
        let ne = threshold(&c, Axis::X, 7.0, Compare::Ne);
        assert_eq!(ne.x, vec![5.0, 1.0, 3.0]);
    }

    #[test]
    fn crop_is_inclusive_on_all_edges() {
        let c: Cloud = [[0.0, 0.0, 1.0], [10.0, 20.0, 1.0], [10.1, 5.0, 1.0], [5.0, -0.1, 1.0], [5.0, 5.0, 1.0]]
            .into_iter().collect();
        let out = crop_xy(&c, &BBox::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(out.len(), 3);
        assert_eq!(out.point(2), [5.0, 5.0, 1.0]);
    }

    #[test]
    fn floor_and_empty_inputs() {
        let c: Cloud = [[0.0, 0.0, -2.5], [0.0, 0.0, -2.4], [0.0, 0.0, -3.0]].into_iter().collect();
        assert_eq!(strip_floor(&c, -2.5).z, vec![-2.4]);
        assert!(strip_floor(&Cloud::default(), -2.5).is_empty());
    }

    #[test]
    fn downsample_takes_every_kth() {
        let c: Cloud = (0..7).map(|i| [i as f32, 0.0, 0.0]).collect();
        assert_eq!(uniform_downsample(&c, 3).x, vec![0.0, 3.0, 6.0]);
        assert_eq!(uniform_downsample(&c, 0).len(), 7);
    }
}
