use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// Grasp direction relative to the "upper-left" reference corner.
///
/// The center cell is not a class; it only exists as an offset point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Arrow { Lo, O, Ro, L, R, Lu, U, Ru }

impl Arrow {
    /// Label order used by the store columns and the classifier output.
    pub const ALL: [Arrow; 8] = [Arrow::Lo, Arrow::O, Arrow::Ro, Arrow::L, Arrow::R, Arrow::Lu, Arrow::U, Arrow::Ru];

    pub fn index(self) -> usize { self as usize }

    pub fn name(self) -> &'static str {
        match self {
            Arrow::Lo => "lo",
            Arrow::O => "o",
            Arrow::Ro => "ro",
            Arrow::L => "l",
            Arrow::R => "r",
            Arrow::Lu => "lu",
            Arrow::U => "u",
            Arrow::Ru => "ru",
        }
    }

    /// Column header in the label store, e.g. `arrowlo`.
    pub fn column(self) -> String { format!("arrow{}", self.name()) }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Arrow {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let s = s.strip_prefix("arrow").unwrap_or(&s);
        Arrow::ALL.into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| format!("unknown arrow '{s}'"))
    }
}

/// Multi-label annotation: one flag per [`Arrow`], in [`Arrow::ALL`] order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowFlags(pub [bool; 8]);

impl ArrowFlags {
    pub fn from_arrows(arrows: &[Arrow]) -> Self {
        let mut f = ArrowFlags::default();
        for &a in arrows { f.set(a, true); }
        f
    }
    pub fn set(&mut self, arrow: Arrow, on: bool) { self.0[arrow.index()] = on; }
    pub fn get(&self, arrow: Arrow) -> bool { self.0[arrow.index()] }
    pub fn selected(&self) -> impl Iterator<Item = Arrow> + '_ {
        Arrow::ALL.into_iter().filter(|a| self.get(*a))
    }
    pub fn is_empty(&self) -> bool { !self.0.iter().any(|&b| b) }

    /// One-hot style target vector (1.0 where flagged).
    pub fn to_target(&self) -> [f32; 8] { self.0.map(|b| if b { 1.0 } else { 0.0 }) }
}

impl Index<Arrow> for ArrowFlags {
    type Output = bool;
    fn index(&self, a: Arrow) -> &bool { &self.0[a.index()] }
}
