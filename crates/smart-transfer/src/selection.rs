use std::path::PathBuf;

use crate::catalog::PluginCatalog;
use crate::plugin::{CompressionMode, CompressionOptions};

/// The user's current choices, owned by whichever front-end drives the
/// workflow and passed by reference into each action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub files: Vec<PathBuf>,
    pub plugin: Option<String>,
    pub options: CompressionOptions,
    pub output_dir: Option<PathBuf>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selected files (a picker returning nothing keeps the old set).
    pub fn set_files(&mut self, files: Vec<PathBuf>) {
        if !files.is_empty() {
            self.files = files;
        }
    }

    /// Add `path` if absent, remove it if present.
    pub fn toggle_file(&mut self, path: PathBuf) {
        if let Some(idx) = self.files.iter().position(|p| *p == path) {
            self.files.remove(idx);
        } else {
            self.files.push(path);
        }
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    pub fn set_plugin(&mut self, plugin: impl Into<String>) {
        self.plugin = Some(plugin.into());
    }

    pub fn set_mode(&mut self, mode: CompressionMode) {
        self.options.mode = mode;
    }

    /// Set the split size in bytes. Zero disables splitting.
    pub fn set_split_size(&mut self, bytes: u64) {
        self.options = self.options.with_split_size(bytes);
    }

    pub fn disable_split(&mut self) {
        self.options.split_size = None;
    }

    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = Some(dir.into());
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// True when a compress build would pass its pre-flight checks.
    pub fn can_compress(&self, catalog: &PluginCatalog) -> bool {
        self.has_files()
            && self.output_dir.is_some()
            && self.plugin.as_deref().is_some_and(|p| catalog.contains(p))
    }

    /// True when a decompress build has everything except the archive check.
    pub fn can_decompress(&self) -> bool {
        self.has_files() && self.output_dir.is_some()
    }
}
