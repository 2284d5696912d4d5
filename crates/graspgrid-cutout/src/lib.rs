//! graspgrid-cutout: geometry of the cutout rectangle.
//!
//! Pure functions: placing a kernel-sized rectangle inside the plot bounds,
//! reading back its bounding box, and deriving the nine offset points. The
//! drag state machine and point picking sit on top for interactive callers.

mod drag;
mod kernel;
mod pick;
mod rect;

pub use drag::{DragState, RectDrag};
pub use kernel::Kernel;
pub use pick::pick_highest;
pub use rect::{compute_offsets, place_rect, realize, CutoutRect, PlotBounds};
