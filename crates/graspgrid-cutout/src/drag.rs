use graspgrid_core::{BBox, OffsetSet};
use log::trace;

use crate::rect::{compute_offsets, realize, CutoutRect, PlotBounds};

/// Interaction phase of a [`RectDrag`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DragState {
    Idle,
    /// `origin` is the lower-left corner at press time, `press` the pointer.
    Dragging { origin: [f32; 2], press: [f32; 2] },
    Released,
}

/// A cutout rectangle being moved around a plot by pointer events.
///
/// Owning the state here means at most one drag is active per rectangle and
/// the geometry stays testable without an event loop.
#[derive(Clone, Debug)]
pub struct RectDrag {
    rect: CutoutRect,
    bounds: PlotBounds,
    state: DragState,
}

impl RectDrag {
    pub fn new(rect: CutoutRect, bounds: PlotBounds) -> Self {
        Self { rect, bounds, state: DragState::Idle }
    }

    pub fn rect(&self) -> &CutoutRect { &self.rect }
    pub fn state(&self) -> DragState { self.state }
    pub fn is_dragging(&self) -> bool { matches!(self.state, DragState::Dragging { .. }) }

    /// Start a drag if the pointer is on the rectangle and none is active.
    pub fn press(&mut self, x: f32, y: f32) -> bool {
        if self.is_dragging() { return false; }
        let b = self.rect.bbox();
        if !b.contains(x, y) { return false; }
        self.state = DragState::Dragging { origin: [b.x1, b.y1], press: [x, y] };
        true
    }

    /// Follow the pointer. Each axis moves only if the moved rectangle stays
    /// inside the plot on that axis; returns whether anything moved.
    pub fn motion(&mut self, x: f32, y: f32) -> bool {
        let DragState::Dragging { origin, press } = self.state else { return false; };
        let new_x = origin[0] + (x - press[0]);
        let new_y = origin[1] + (y - press[1]);
        let (w, h) = self.rect.size();
        let b = self.rect.bbox();
        let mut corner = [b.x1, b.y1];
        if self.bounds.x[0] <= new_x && new_x <= self.bounds.x[1] - w { corner[0] = new_x; }
        if self.bounds.y[0] <= new_y && new_y <= self.bounds.y[1] - h { corner[1] = new_y; }
        let moved = corner != [b.x1, b.y1];
        if moved {
            self.rect = self.rect.with_corner(corner[0], corner[1]);
            trace!("drag: corner -> ({}, {})", corner[0], corner[1]);
        }
        moved
    }

    /// End the active drag.
    pub fn release(&mut self) -> bool {
        if !self.is_dragging() { return false; }
        self.state = DragState::Released;
        true
    }

    /// Swap width and height around the lower-left corner and flip `rotated`.
    pub fn toggle_rotation(&mut self) {
        let b = self.rect.bbox();
        self.rect.rotated = !self.rect.rotated;
        self.rect = self.rect.with_corner(b.x1, b.y1);
    }

    /// Finalize: bounding box and its offsets under the current rotation.
    pub fn cut(&self) -> (BBox, OffsetSet) {
        let b = realize(&self.rect);
        (b, compute_offsets(&b, self.rect.rotated))
    }
}
