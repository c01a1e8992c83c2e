use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smart_transfer::CompressionMode;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where archives and extracted files go when no `--output-dir` is given.
    pub output_dir: Option<PathBuf>,
    /// Default plugin for `compress`.
    pub format: Option<String>,
    /// `binary` or `text`.
    pub mode: String,
    /// Volume size in MiB. Zero disables splitting.
    pub split_mb: u64,
    /// Zero disables the dispatch timeout.
    pub dispatch_timeout_secs: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            format: None,
            mode: "binary".into(),
            split_mb: 0,
            dispatch_timeout_secs: 0,
            log_level: "warn".into(),
        }
    }
}

impl AppConfig {
    /// Configured mode, or binary when the value is not recognized.
    pub fn compression_mode(&self) -> CompressionMode {
        CompressionMode::parse(&self.mode).unwrap_or_else(|| {
            eprintln!(
                "warning: unknown compression mode {:?} in config, using binary",
                self.mode
            );
            CompressionMode::Binary
        })
    }

    pub fn split_bytes(&self) -> u64 {
        mb_to_bytes(self.split_mb)
    }

    pub fn dispatch_timeout(&self) -> Option<Duration> {
        (self.dispatch_timeout_secs > 0).then(|| Duration::from_secs(self.dispatch_timeout_secs))
    }
}

pub fn mb_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(BYTES_PER_MB)
}

/// Config file path: `~/.config/smart-transfer/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("smart-transfer").join("config.toml"))
}

/// Load config from `path` (or the default location), falling back to
/// defaults if it is missing or unparsable.
pub fn load_config(path: Option<&Path>) -> AppConfig {
    let path = path.map(Path::to_path_buf).or_else(config_path);
    if let Some(path) = path
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => return config,
            Err(e) => eprintln!(
                "warning: failed to parse config at {}, using defaults: {e}",
                path.display()
            ),
        }
    }

    AppConfig::default()
}
