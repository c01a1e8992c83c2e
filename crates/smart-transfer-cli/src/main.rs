mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smart_transfer::{Backend, Dispatcher, PluginCatalog, Selection, Step, Workflow};
use smart_transfer_engine::LocalBackend;

use crate::commands::compress::CompressArgs;
use crate::commands::decompress::{DecompressArgs, OverwritePolicy};
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "smart-transfer")]
#[command(about = "Compress and extract files through pluggable archive formats")]
struct Cli {
    /// Log filter, e.g. `info` or `smart_transfer=debug` (overrides config)
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available compression formats
    Plugins,
    /// Pack files into a new archive
    Compress(CompressArgs),
    /// Extract archives
    Decompress(DecompressArgs),
    /// Launch the interactive TUI
    Tui {
        /// Directory archives and extracted files go to
        #[arg(long, short)]
        output_dir: Option<PathBuf>,
    },
}

fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("could not determine cache directory")?;
    Ok(base.join("smart-transfer"))
}

fn tui_log_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join("tui.log"))
}

fn build_dispatcher(config: &AppConfig) -> Dispatcher<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = Arc::new(LocalBackend::new());
    Dispatcher::new(backend).with_timeout(config.dispatch_timeout())
}

/// Selection seeded from the configured defaults, for the TUI.
fn default_selection(output_dir: Option<&PathBuf>, config: &AppConfig) -> Selection {
    let mut selection = Selection::new();
    if let Some(format) = &config.format {
        selection.set_plugin(format.clone());
    }
    if let Some(dir) = commands::output_dir(output_dir, config) {
        selection.set_output_dir(dir);
    }
    selection.set_mode(config.compression_mode());
    selection.set_split_size(config.split_bytes());
    selection
}

async fn run_tui(level: &str, config: &AppConfig, output_dir: Option<PathBuf>) -> Result<ExitCode> {
    logging::init_file(level, &tui_log_path()?)?;
    tracing::debug!(?config, "starting tui");
    let dispatcher = build_dispatcher(config);
    let (catalog, warning) = PluginCatalog::load(dispatcher.backend()).await;
    let selection = default_selection(output_dir.as_ref(), config);
    smart_transfer_tui::run(dispatcher, catalog, warning, selection).await?;
    Ok(ExitCode::SUCCESS)
}

async fn start_workflow(config: &AppConfig) -> Workflow<Arc<dyn Backend>> {
    tracing::debug!(?config, "starting workflow");
    let (workflow, warning) = Workflow::start(build_dispatcher(config)).await;
    if let Some(warning) = warning {
        eprintln!("{warning}");
    }
    workflow
}

fn report(step: &Step) -> ExitCode {
    commands::report::emit(step, &mut std::io::stdout(), &mut std::io::stderr())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref());
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);

    match cli.command {
        Command::Tui { output_dir } => run_tui(level, &config, output_dir).await,
        Command::Plugins => {
            logging::init_stderr(level);
            let workflow = start_workflow(&config).await;
            commands::plugins::run(workflow.catalog(), &mut std::io::stdout())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Compress(args) => {
            logging::init_stderr(level);
            let mut workflow = start_workflow(&config).await;
            let step = commands::compress::run(&mut workflow, &args, &config).await;
            Ok(report(&step))
        }
        Command::Decompress(args) => {
            logging::init_stderr(level);
            let mut workflow = start_workflow(&config).await;
            let selection = commands::decompress::selection(&args, &config);
            let policy = OverwritePolicy::detect(args.yes);
            let step = commands::decompress::run(
                &mut workflow,
                &selection,
                policy,
                &mut std::io::stdin().lock(),
                &mut std::io::stderr(),
            )
            .await?;
            Ok(report(&step))
        }
    }
}
