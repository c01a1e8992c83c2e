use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::plugin::{PluginDescriptor, WireOptions};

/// Marker the legacy transport puts in front of the colliding path list.
pub const FILE_EXISTS_MARKER: &str = "FileExists:";

/// Substring the legacy transport uses when a compress target already exists.
pub const ARCHIVE_EXISTS_MARKER: &str = "Archive already exists";

/// Errors reported by an execution backend.
///
/// The `Display` form of each variant is the legacy wire text, so
/// [`BackendError::from_message`] recovers the same variant from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Archive already exists: {0}")]
    ArchiveExists(String),

    #[error("FileExists:{}", encode_paths(.0))]
    FilesExist(Vec<PathBuf>),

    #[error("plugin not found: {0}")]
    UnknownPlugin(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Classify a plain error string from a string-typed transport.
    ///
    /// `FileExists:` followed by a JSON array of paths becomes
    /// [`BackendError::FilesExist`]; a message mentioning
    /// `Archive already exists` becomes [`BackendError::ArchiveExists`].
    /// Everything else, including a `FileExists:` marker whose payload does
    /// not parse, is kept verbatim as [`BackendError::Other`].
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();

        if let Some((_, rest)) = message.split_once(FILE_EXISTS_MARKER) {
            return match serde_json::from_str::<Vec<PathBuf>>(rest.trim()) {
                Ok(paths) => Self::FilesExist(paths),
                Err(_) => Self::Other(message),
            };
        }

        if let Some(idx) = message.find(ARCHIVE_EXISTS_MARKER) {
            let detail = message[idx + ARCHIVE_EXISTS_MARKER.len()..]
                .trim_start_matches(':')
                .trim()
                .to_owned();
            return Self::ArchiveExists(detail);
        }

        Self::Other(message)
    }
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

fn encode_paths(paths: &[PathBuf]) -> String {
    serde_json::to_string(paths).unwrap_or_else(|_| "[]".to_owned())
}

/// The execution layer that knows the available formats and runs jobs.
///
/// Implementations do the actual work; all classification of their errors
/// into job outcomes happens in [`crate::dispatch::Dispatcher`].
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable label identifying this backend.
    fn label(&self) -> &str;

    /// Enumerate the available compression formats.
    async fn list_plugins(&self) -> Result<Vec<PluginDescriptor>, BackendError>;

    /// Compress `files` into the single archive at `output_path`.
    async fn compress_files(
        &self,
        files: &[PathBuf],
        plugin: &str,
        output_path: &Path,
        options: &WireOptions,
    ) -> Result<(), BackendError>;

    /// Extract every archive in `files` into `output_dir`.
    ///
    /// Without `overwrite`, a backend that would replace existing files must
    /// fail with [`BackendError::FilesExist`] listing them, before writing.
    async fn decompress_files(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        overwrite: bool,
    ) -> Result<(), BackendError>;
}

#[async_trait::async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    async fn list_plugins(&self) -> Result<Vec<PluginDescriptor>, BackendError> {
        (**self).list_plugins().await
    }

    async fn compress_files(
        &self,
        files: &[PathBuf],
        plugin: &str,
        output_path: &Path,
        options: &WireOptions,
    ) -> Result<(), BackendError> {
        (**self)
            .compress_files(files, plugin, output_path, options)
            .await
    }

    async fn decompress_files(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        (**self).decompress_files(files, output_dir, overwrite).await
    }
}

#[async_trait::async_trait]
impl<T: Backend + ?Sized> Backend for &T {
    fn label(&self) -> &str {
        (**self).label()
    }

    async fn list_plugins(&self) -> Result<Vec<PluginDescriptor>, BackendError> {
        (**self).list_plugins().await
    }

    async fn compress_files(
        &self,
        files: &[PathBuf],
        plugin: &str,
        output_path: &Path,
        options: &WireOptions,
    ) -> Result<(), BackendError> {
        (**self)
            .compress_files(files, plugin, output_path, options)
            .await
    }

    async fn decompress_files(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        (**self).decompress_files(files, output_dir, overwrite).await
    }
}
