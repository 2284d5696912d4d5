//! graspgrid-io: point-cloud loading (`.csv`, `.npy`, `.ply`), cutout
//! persistence and the batch `.npy` preprocessing pass.

mod csv;
mod npy;
mod ply;

pub use csv::{read_csv, write_csv};
pub use npy::{read_npy, write_npy};
pub use ply::read_ply;

use graspgrid_core::{Cloud, Error, Result};
use graspgrid_filters::strip_floor;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase())
}

/// Load a cloud, dispatching on the file extension.
pub fn load(path: impl AsRef<Path>) -> Result<Cloud> {
    let path = path.as_ref();
    let c = match extension(path).as_deref() {
        Some("csv") => read_csv(path)?,
        Some("npy") => read_npy(path)?,
        Some("ply") => read_ply(path)?,
        _ => return Err(Error::UnsupportedFormat(path.to_path_buf())),
    };
    debug!("load {}: {} points", path.display(), c.len());
    Ok(c)
}

/// Load and drop everything at or below `floor` on Z. Every cloud shown for
/// labeling or turned into features goes through here.
pub fn open_for_labeling(path: impl AsRef<Path>, floor: f32) -> Result<Cloud> {
    Ok(strip_floor(&load(path)?, floor))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrepareReport {
    pub processed: usize,
    pub deleted: Vec<PathBuf>,
}

/// Rewrite every `.npy` in `dir` in place: floor removal, then coordinates
/// scaled by `scale`. Corrupt files are deleted and the batch continues;
/// any other failure aborts it.
pub fn prepare_clouds(dir: impl AsRef<Path>, floor: f32, scale: f32) -> Result<PrepareReport> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir.as_ref())?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && extension(p).as_deref() == Some("npy"))
        .collect();
    files.sort();

    let mut report = PrepareReport::default();
    for file in files {
        match read_npy(&file) {
            Ok(c) => {
                let out = strip_floor(&c, floor).scaled(scale);
                write_npy(&file, &out)?;
                debug!("prepare {}: {} -> {} points", file.display(), c.len(), out.len());
                report.processed += 1;
            }
            Err(Error::CorruptArtifact { reason, .. }) => {
                warn!("prepare: deleting corrupt {} ({reason})", file.display());
                fs::remove_file(&file)?;
                report.deleted.push(file);
            }
            Err(e) => return Err(e),
        }
    }
    info!(
        "prepare {}: {} rewritten, {} deleted",
        dir.as_ref().display(), report.processed, report.deleted.len()
    );
    Ok(report)
}
