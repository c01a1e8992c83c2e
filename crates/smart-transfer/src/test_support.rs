use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::backend::{Backend, BackendError};
use crate::plugin::{PluginDescriptor, WireOptions};

/// A job call received by [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Compress {
        files: Vec<PathBuf>,
        plugin: String,
        output_path: PathBuf,
        options: WireOptions,
    },
    Decompress {
        files: Vec<PathBuf>,
        output_dir: PathBuf,
        overwrite: bool,
    },
}

/// In-memory backend for tests. Replies to job calls from a queue of
/// scripted results (an empty queue means success) and records each call.
pub struct ScriptedBackend {
    label: String,
    plugins: Vec<PluginDescriptor>,
    list_error: Mutex<Option<BackendError>>,
    compress_results: Mutex<VecDeque<Result<(), BackendError>>>,
    decompress_results: Mutex<VecDeque<Result<(), BackendError>>>,
    calls: Mutex<Vec<BackendCall>>,
    delay: Mutex<Option<Duration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl ScriptedBackend {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            plugins: Vec::new(),
            list_error: Mutex::new(None),
            compress_results: Mutex::new(VecDeque::new()),
            decompress_results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        }
    }

    /// A backend offering `names`, each at version `1.0.0`.
    pub fn with_plugins(names: &[&str]) -> Self {
        let mut backend = Self::new("scripted");
        backend.plugins = names
            .iter()
            .map(|name| PluginDescriptor::new(*name, "1.0.0"))
            .collect();
        backend
    }

    /// Make `list_plugins` fail with `error`.
    pub fn fail_list_plugins(&self, error: BackendError) {
        *lock(&self.list_error) = Some(error);
    }

    pub fn push_compress(&self, result: Result<(), BackendError>) {
        lock(&self.compress_results).push_back(result);
    }

    pub fn push_decompress(&self, result: Result<(), BackendError>) {
        lock(&self.decompress_results).push_back(result);
    }

    /// Sleep this long inside every job call.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    async fn pause(&self) {
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait::async_trait]
impl Backend for ScriptedBackend {
    fn label(&self) -> &str {
        &self.label
    }

    async fn list_plugins(&self) -> Result<Vec<PluginDescriptor>, BackendError> {
        match lock(&self.list_error).clone() {
            Some(error) => Err(error),
            None => Ok(self.plugins.clone()),
        }
    }

    async fn compress_files(
        &self,
        files: &[PathBuf],
        plugin: &str,
        output_path: &Path,
        options: &WireOptions,
    ) -> Result<(), BackendError> {
        lock(&self.calls).push(BackendCall::Compress {
            files: files.to_vec(),
            plugin: plugin.to_owned(),
            output_path: output_path.to_owned(),
            options: *options,
        });
        self.pause().await;
        let next = lock(&self.compress_results).pop_front();
        next.unwrap_or(Ok(()))
    }

    async fn decompress_files(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        overwrite: bool,
    ) -> Result<(), BackendError> {
        lock(&self.calls).push(BackendCall::Decompress {
            files: files.to_vec(),
            output_dir: output_dir.to_owned(),
            overwrite,
        });
        self.pause().await;
        let next = lock(&self.decompress_results).pop_front();
        next.unwrap_or(Ok(()))
    }
}
