pub mod compress;
pub mod decompress;
pub mod plugins;
pub mod report;

use std::path::PathBuf;

use crate::config::AppConfig;

/// Output directory from the flag, then the config, then the working
/// directory.
pub fn output_dir(flag: Option<&PathBuf>, config: &AppConfig) -> Option<PathBuf> {
    flag.cloned()
        .or_else(|| config.output_dir.clone())
        .or_else(|| std::env::current_dir().ok())
}
