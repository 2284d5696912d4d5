use graspgrid_core::{BBox, OffsetSet};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::kernel::Kernel;

/// Axis limits of the plot the rectangle lives in: `[min, max]` per axis.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotBounds { pub x: [f32; 2], pub y: [f32; 2] }

impl PlotBounds {
    /// From a height-map style extent `[x_min, x_max, y_min, y_max]`.
    pub fn from_extent(e: [f32; 4]) -> Self { Self { x: [e[0], e[1]], y: [e[2], e[3]] } }
}

/// Cutout rectangle centered at (cx, cy) in world coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CutoutRect {
    pub cx: f32,
    pub cy: f32,
    pub col_width: f32,
    pub row_height: f32,
    pub kernel: Kernel,
    pub rotated: bool,
}

impl CutoutRect {
    /// World (width, height); rotation swaps the roles.
    pub fn size(&self) -> (f32, f32) {
        let w = self.col_width * self.kernel.cols as f32;
        let h = self.row_height * self.kernel.rows as f32;
        if self.rotated { (h, w) } else { (w, h) }
    }

    pub fn bbox(&self) -> BBox {
        let (w, h) = self.size();
        BBox::new(self.cx - w / 2.0, self.cy - h / 2.0, self.cx + w / 2.0, self.cy + h / 2.0)
    }

    /// Rebuild from a lower-left corner, keeping cell sizes and kernel.
    pub(crate) fn with_corner(mut self, x: f32, y: f32) -> Self {
        let (w, h) = self.size();
        self.cx = x + w / 2.0;
        self.cy = y + h / 2.0;
        self
    }
}

// lower bound is checked first; only when it passes is the upper bound
// consulted, so a plot narrower than the rectangle snaps to `lo`
fn clamp_ordered(v: f32, lo: f32, hi: f32) -> f32 {
    if v < lo { lo } else if v > hi { hi } else { v }
}

/// Place a kernel-sized rectangle around (cx, cy), pulling the center back
/// so the rectangle stays within `bounds`.
pub fn place_rect(
    bounds: PlotBounds,
    cx: f32,
    cy: f32,
    col_width: f32,
    row_height: f32,
    kernel: Kernel,
    rotated: bool,
) -> CutoutRect {
    let mut rect = CutoutRect { cx, cy, col_width, row_height, kernel, rotated };
    let (w, h) = rect.size();
    rect.cx = clamp_ordered(cx, bounds.x[0] + w / 2.0, bounds.x[1] - w / 2.0);
    rect.cy = clamp_ordered(cy, bounds.y[0] + h / 2.0, bounds.y[1] - h / 2.0);
    if (rect.cx, rect.cy) != (cx, cy) {
        debug!("place_rect: center ({cx}, {cy}) clamped to ({}, {})", rect.cx, rect.cy);
    }
    rect
}

/// Bounding box of the finalized rectangle.
pub fn realize(rect: &CutoutRect) -> BBox { rect.bbox() }

/// Nine reference points of `b`. With `rotated` the labels are permuted so
/// that they keep naming the same physical corner as in the unrotated view.
pub fn compute_offsets(b: &BBox, rotated: bool) -> OffsetSet {
    let (x1, y1, x2, y2) = (b.x1, b.y1, b.x2, b.y2);
    let mid_x = (x1 + x2) / 2.0;
    let mid_y = (y1 + y2) / 2.0;

    let lo = [x1, y2];
    let o = [mid_x, y2];
    let ro = [x2, y2];
    let l = [x1, mid_y];
    let center = [mid_x, mid_y];
    let r = [x2, mid_y];
    let lu = [x1, y1];
    let u = [mid_x, y1];
    let ru = [x2, y1];

    if rotated {
        // fixed relabeling table; not a plain 180° turn (ru comes from lu)
        OffsetSet { lo: ro, o: r, ro: ru, l: o, center, r: u, lu: lo, u: l, ru: lu }
    } else {
        OffsetSet { lo, o, ro, l, center, r, lu, u, ru }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(x: [f32; 2], y: [f32; 2]) -> PlotBounds { PlotBounds { x, y } }

    #[test]
    fn clamps_center_inside_bounds() {
        let k = Kernel { rows: 1, cols: 3 };
        let b = bounds([0.0, 100.0], [0.0, 100.0]);
        assert_eq!(place_rect(b, 200.0, 50.0, 20.0, 10.0, k, false).cx, 70.0);
        assert_eq!(place_rect(b, -50.0, 50.0, 20.0, 10.0, k, false).cx, 30.0);
        assert_eq!(place_rect(b, 55.0, 50.0, 20.0, 10.0, k, false).cx, 55.0);
    }

    #[test]
    fn rotation_swaps_clamp_extents() {
        let k = Kernel { rows: 3, cols: 3 };
        let b = bounds([0.0, 1000.0], [0.0, 1000.0]);
        // unrotated: width 240, height 150
        let r = place_rect(b, 0.0, 0.0, 80.0, 50.0, k, false);
        assert_eq!((r.cx, r.cy), (120.0, 75.0));
        // rotated: width 150, height 240
        let r = place_rect(b, 0.0, 0.0, 80.0, 50.0, k, true);
        assert_eq!((r.cx, r.cy), (75.0, 120.0));
        assert_eq!(realize(&r), BBox::new(0.0, 0.0, 150.0, 240.0));
    }

    #[test]
    fn narrow_plot_snaps_to_lower_limit() {
        // lo = 30 > hi = 10: below-lo wins, otherwise above-hi wins
        let k = Kernel { rows: 1, cols: 3 };
        let b = bounds([0.0, 40.0], [0.0, 100.0]);
        assert_eq!(place_rect(b, 20.0, 50.0, 20.0, 10.0, k, false).cx, 30.0);
        assert_eq!(place_rect(b, 35.0, 50.0, 20.0, 10.0, k, false).cx, 10.0);
    }

    #[test]
    fn offsets_unrotated() {
        let s = compute_offsets(&BBox::new(0.0, 0.0, 10.0, 20.0), false);
        assert_eq!(s.lo, [0.0, 20.0]);
        assert_eq!(s.o, [5.0, 20.0]);
        assert_eq!(s.ro, [10.0, 20.0]);
        assert_eq!(s.l, [0.0, 10.0]);
        assert_eq!(s.center, [5.0, 10.0]);
        assert_eq!(s.r, [10.0, 10.0]);
        assert_eq!(s.lu, [0.0, 0.0]);
        assert_eq!(s.u, [5.0, 0.0]);
        assert_eq!(s.ru, [10.0, 0.0]);
    }

    #[test]
    fn offsets_rotated_follow_relabel_table() {
        let b = BBox::new(0.0, 0.0, 10.0, 20.0);
        let plain = compute_offsets(&b, false);
        let rot = compute_offsets(&b, true);
        assert_eq!(rot.center, [5.0, 10.0]);
        assert_eq!(rot.lo, [10.0, 20.0]);
        assert_eq!(rot.o, [10.0, 10.0]);
        assert_eq!(rot.ro, [10.0, 0.0]);
        assert_eq!(rot.l, [5.0, 20.0]);
        assert_eq!(rot.r, [5.0, 0.0]);
        assert_eq!(rot.lu, [0.0, 20.0]);
        assert_eq!(rot.u, [0.0, 10.0]);
        assert_eq!(rot.ru, [0.0, 0.0]);

        // inverting the table recovers the unrotated set
        let back = OffsetSet {
            ro: rot.lo, r: rot.o, ru: rot.ro, o: rot.l, center: rot.center,
            u: rot.r, lo: rot.lu, l: rot.u, lu: rot.ru,
        };
        assert_eq!(back, plain);
    }

    #[test]
    fn degenerate_box_collapses_offsets() {
        let s = compute_offsets(&BBox::new(3.0, 4.0, 3.0, 4.0), true);
        for p in s.to_columns() { assert_eq!(p, [3.0, 4.0]); }
    }
}
