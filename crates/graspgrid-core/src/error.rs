use std::path::PathBuf;

/// Failure kinds surfaced by the pipeline crates.
///
/// Degenerate geometry (empty clouds, zero-extent boxes) is not an error:
/// those inputs produce empty or zero-valued results instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported point-cloud format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("no label record for '{0}'")]
    RecordNotFound(String),
    #[error("corrupt artifact {}: {reason}", .path.display())]
    CorruptArtifact { path: PathBuf, reason: String },
    #[error("'{0}' cannot be stored as a label record name")]
    InvalidRecordName(String),
    #[error("invalid kernel shape '{0}' (expected RxC, e.g. 3x3)")]
    InvalidKernel(String),
    #[error("{}:{line}: {reason}", .path.display())]
    Parse { path: PathBuf, line: usize, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
