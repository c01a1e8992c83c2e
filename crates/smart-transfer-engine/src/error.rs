use std::io;
use std::path::{Path, PathBuf};

use smart_transfer::BackendError;

/// Errors from the local archive engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Archive already exists: {}", .0.display())]
    ArchiveExists(PathBuf),

    #[error("{} destination file(s) already exist", .0.len())]
    FilesExist(Vec<PathBuf>),

    #[error("plugin not found: {0}")]
    UnknownPlugin(String),

    #[error("unsupported archive format: {}", .0.display())]
    Unsupported(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read archive {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to write archive {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    #[error("background task failed: {0}")]
    Task(String),
}

impl EngineError {
    /// Adapter for `map_err` that attaches the path being touched.
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn read(path: &Path) -> impl FnOnce(String) -> Self + '_ {
        move |reason| Self::Read {
            path: path.to_path_buf(),
            reason,
        }
    }

    pub(crate) fn write(path: &Path) -> impl FnOnce(String) -> Self + '_ {
        move |reason| Self::Write {
            path: path.to_path_buf(),
            reason,
        }
    }
}

impl From<EngineError> for BackendError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::ArchiveExists(path) => Self::ArchiveExists(path.display().to_string()),
            EngineError::FilesExist(paths) => Self::FilesExist(paths),
            EngineError::UnknownPlugin(name) => Self::UnknownPlugin(name),
            EngineError::Unsupported(path) => Self::Unsupported(path.display().to_string()),
            e @ EngineError::Io { .. } => Self::Io(e.to_string()),
            other => Self::Other(other.to_string()),
        }
    }
}
