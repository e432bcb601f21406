use std::io;
use std::path::PathBuf;

use marlin_core::ResolveError;
use thiserror::Error;

pub type FrontendResult<T> = Result<T, FrontendError>;

/// Failures that stop a frontend run before it can report diagnostics.
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("standard library not found at {}", path.display())]
    MissingStandardLibrary { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("resolver failure: {0}")]
    Resolve(#[from] ResolveError),
}

impl FrontendError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FrontendError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for a run that ended in this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            FrontendError::MissingStandardLibrary { .. } => 3,
            FrontendError::Io { .. } | FrontendError::Resolve(_) => 2,
        }
    }
}
