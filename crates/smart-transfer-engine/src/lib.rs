pub mod compress;
pub mod error;
pub mod extract;
pub mod format;
pub mod split;

use std::path::{Path, PathBuf};

use smart_transfer::{Backend, BackendError, PluginDescriptor, WireOptions};

pub use error::EngineError;
pub use format::ArchiveFormat;

/// Backend that runs jobs in-process with the built-in archive codecs.
///
/// Codec work is blocking file I/O, so every job runs on
/// `tokio::task::spawn_blocking`.
#[derive(Debug, Clone, Default)]
pub struct LocalBackend {
    _private: (),
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Create one archive from `files`, then split it when asked.
pub fn compress_blocking(
    files: &[PathBuf],
    plugin: &str,
    output_path: &Path,
    options: &WireOptions,
) -> Result<(), EngineError> {
    let format = ArchiveFormat::from_plugin(plugin)?;
    if output_path.exists() || split::volume_path(output_path, 1).exists() {
        return Err(EngineError::ArchiveExists(output_path.to_path_buf()));
    }

    compress::write_archive(format, files, output_path, options.mode)?;
    if options.split_size > 0 {
        split::split_archive(output_path, options.split_size)?;
    }
    tracing::info!(plugin, path = %output_path.display(), "archive written");
    Ok(())
}

/// Extract every archive in `files` into `output_dir`.
///
/// Without `overwrite`, all archives are scanned first and nothing is
/// written if any destination already exists.
pub fn decompress_blocking(
    files: &[PathBuf],
    output_dir: &Path,
    overwrite: bool,
) -> Result<(), EngineError> {
    let mut plans = Vec::new();
    for file in files {
        plans.extend(extract::plan(file, output_dir)?);
    }

    if !overwrite {
        let existing = extract::collisions(&plans);
        if !existing.is_empty() {
            tracing::debug!(count = existing.len(), "extraction would overwrite files");
            return Err(EngineError::FilesExist(existing));
        }
    }

    for file in files {
        let count = extract::extract(file, output_dir)?;
        tracing::info!(archive = %file.display(), entries = count, "archive extracted");
    }
    Ok(())
}

async fn run_blocking<F>(job: F) -> Result<(), BackendError>
where
    F: FnOnce() -> Result<(), EngineError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| EngineError::Task(e.to_string()))?
        .map_err(BackendError::from)
}

#[async_trait::async_trait]
impl Backend for LocalBackend {
    fn label(&self) -> &str {
        "local"
    }

    async fn list_plugins(&self) -> Result<Vec<PluginDescriptor>, BackendError> {
        Ok(ArchiveFormat::ALL
            .into_iter()
            .map(ArchiveFormat::descriptor)
            .collect())
    }

    async fn compress_files(
        &self,
        files: &[PathBuf],
        plugin: &str,
        output_path: &Path,
        options: &WireOptions,
    ) -> Result<(), BackendError> {
        let files = files.to_vec();
        let plugin = plugin.to_owned();
        let output_path = output_path.to_path_buf();
        let options = *options;
        run_blocking(move || compress_blocking(&files, &plugin, &output_path, &options)).await
    }

    async fn decompress_files(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        let files = files.to_vec();
        let output_dir = output_dir.to_path_buf();
        run_blocking(move || decompress_blocking(&files, &output_dir, overwrite)).await
    }
}
