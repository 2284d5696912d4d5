use graspgrid_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cutout kernel: `rows x cols` conceptual cells, written "RxC".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Kernel { pub rows: usize, pub cols: usize }

impl Kernel {
    pub const K3X3: Kernel = Kernel { rows: 3, cols: 3 };
    pub const K5X5: Kernel = Kernel { rows: 5, cols: 5 };

    /// Kernels offered for labeling.
    pub const CHOICES: [Kernel; 2] = [Kernel::K3X3, Kernel::K5X5];
}

impl Default for Kernel {
    fn default() -> Self { Kernel::K3X3 }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}x{}", self.rows, self.cols) }
}

impl FromStr for Kernel {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        let bad = || Error::InvalidKernel(s.to_string());
        let (r, c) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
        let rows: usize = r.trim().parse().map_err(|_| bad())?;
        let cols: usize = c.trim().parse().map_err(|_| bad())?;
        if rows == 0 || cols == 0 { return Err(bad()); }
        Ok(Kernel { rows, cols })
    }
}

impl TryFrom<String> for Kernel {
    type Error = Error;
    fn try_from(s: String) -> Result<Self, Error> { s.parse() }
}

impl From<Kernel> for String {
    fn from(k: Kernel) -> String { k.to_string() }
}
