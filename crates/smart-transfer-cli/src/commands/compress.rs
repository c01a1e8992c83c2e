use std::path::PathBuf;

use clap::{Args, ValueEnum};
use smart_transfer::{Backend, CompressionMode, Selection, Step, Workflow};

use crate::config::{AppConfig, mb_to_bytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Binary,
    Text,
}

impl From<ModeArg> for CompressionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Binary => CompressionMode::Binary,
            ModeArg::Text => CompressionMode::Text,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CompressArgs {
    /// Files or directories to put into the archive
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Compression format (see `smart-transfer plugins`)
    #[arg(long, short)]
    pub format: Option<String>,
    /// Directory the archive is written to
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,
    /// Compression mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// Split the archive into volumes of this many MiB (0 disables)
    #[arg(long)]
    pub split_mb: Option<u64>,
}

/// Merge the flags over the configured defaults.
pub fn selection(args: &CompressArgs, config: &AppConfig) -> Selection {
    let mut selection = Selection::new();
    selection.set_files(args.files.clone());
    if let Some(format) = args.format.as_ref().or(config.format.as_ref()) {
        selection.set_plugin(format.clone());
    }
    if let Some(dir) = super::output_dir(args.output_dir.as_ref(), config) {
        selection.set_output_dir(dir);
    }
    selection.set_mode(
        args.mode
            .map(CompressionMode::from)
            .unwrap_or_else(|| config.compression_mode()),
    );
    let split = args
        .split_mb
        .map(mb_to_bytes)
        .unwrap_or_else(|| config.split_bytes());
    selection.set_split_size(split);
    selection
}

pub async fn run<B: Backend>(
    workflow: &mut Workflow<B>,
    args: &CompressArgs,
    config: &AppConfig,
) -> Step {
    workflow.compress(&selection(args, config)).await
}
