use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world XY: (x1, y1) lower-left, (x2, y2) upper-right.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox { pub x1: f32, pub y1: f32, pub x2: f32, pub y2: f32 }

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self { Self { x1, y1, x2, y2 } }
    pub fn width(&self) -> f32 { self.x2 - self.x1 }
    pub fn height(&self) -> f32 { self.y2 - self.y1 }
    pub fn center(&self) -> [f32; 2] { [(self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0] }
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// The nine reference points of a cutout (corners, edge midpoints, center),
/// named relative to the physical "upper-left" reference corner.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OffsetSet {
    pub lo: [f32; 2],
    pub o: [f32; 2],
    pub ro: [f32; 2],
    pub l: [f32; 2],
    pub center: [f32; 2],
    pub r: [f32; 2],
    pub lu: [f32; 2],
    pub u: [f32; 2],
    pub ru: [f32; 2],
}

impl OffsetSet {
    /// Store column order for the nine points.
    pub const COLUMNS: [&'static str; 9] = [
        "offset_lu", "offset_l", "offset_lo", "offset_u", "offset_o",
        "offset_ru", "offset_r", "offset_ro", "center",
    ];

    /// Points in [`OffsetSet::COLUMNS`] order.
    pub fn to_columns(&self) -> [[f32; 2]; 9] {
        [self.lu, self.l, self.lo, self.u, self.o, self.ru, self.r, self.ro, self.center]
    }

    pub fn from_columns(c: [[f32; 2]; 9]) -> Self {
        let [lu, l, lo, u, o, ru, r, ro, center] = c;
        Self { lo, o, ro, l, center, r, lu, u, ru }
    }
}
