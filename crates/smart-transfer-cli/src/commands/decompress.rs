use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use smart_transfer::{Backend, Selection, Step, Workflow};

use crate::config::AppConfig;

#[derive(Debug, Clone, Args)]
pub struct DecompressArgs {
    /// Archives to extract
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Directory to extract into
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,
    /// Overwrite existing files without asking
    #[arg(long, short)]
    pub yes: bool,
}

/// How an overwrite conflict gets answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// `--yes` was given.
    Assume,
    /// Ask on stdin.
    Ask,
    /// No terminal to ask on; cancel.
    Refuse,
}

impl OverwritePolicy {
    pub fn detect(yes: bool) -> Self {
        if yes {
            Self::Assume
        } else if std::io::stdin().is_terminal() {
            Self::Ask
        } else {
            Self::Refuse
        }
    }
}

pub fn selection(args: &DecompressArgs, config: &AppConfig) -> Selection {
    let mut selection = Selection::new();
    selection.set_files(args.files.clone());
    if let Some(dir) = super::output_dir(args.output_dir.as_ref(), config) {
        selection.set_output_dir(dir);
    }
    selection
}

pub async fn run<B: Backend>(
    workflow: &mut Workflow<B>,
    selection: &Selection,
    policy: OverwritePolicy,
    input: &mut impl BufRead,
    prompt: &mut impl Write,
) -> Result<Step> {
    let step = workflow.decompress(selection).await;
    let Step::Prompt(session) = &step else {
        return Ok(step);
    };

    let confirmed = match policy {
        OverwritePolicy::Assume => true,
        OverwritePolicy::Ask => ask(session.existing_paths(), input, prompt)?,
        OverwritePolicy::Refuse => {
            list_paths(session.existing_paths(), prompt)?;
            writeln!(prompt, "Not overwriting without a terminal; pass --yes to overwrite.")?;
            false
        }
    };

    if confirmed {
        Ok(workflow.confirm_overwrite().await?)
    } else {
        Ok(workflow.cancel_overwrite()?)
    }
}

fn list_paths(paths: &[PathBuf], out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "These files already exist:")?;
    for path in paths {
        writeln!(out, "  {}", path.display())?;
    }
    Ok(())
}

/// Show the colliding files and read a y/N answer. Anything but `y` or
/// `yes` is a no.
fn ask(paths: &[PathBuf], input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    list_paths(paths, out)?;
    write!(out, "Overwrite these files? [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use smart_transfer::test_support::{BackendCall, ScriptedBackend};
    use smart_transfer::{BackendError, Dispatcher, Feedback};

    use super::*;

    fn archive_selection() -> Selection {
        let mut selection = Selection::new();
        selection.set_files(vec![PathBuf::from("/x/archive.zip")]);
        selection.set_output_dir("/out");
        selection
    }

    async fn conflicted(backend: &ScriptedBackend) -> Workflow<&ScriptedBackend> {
        backend.push_decompress(Err(BackendError::FilesExist(vec![
            PathBuf::from("/out/a.txt"),
            PathBuf::from("/out/b.txt"),
        ])));
        Workflow::start(Dispatcher::new(backend)).await.0
    }

    fn overwrite_flags(backend: &ScriptedBackend) -> Vec<bool> {
        backend
            .calls()
            .iter()
            .filter_map(|call| match call {
                BackendCall::Decompress { overwrite, .. } => Some(*overwrite),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn yes_answer_overwrites() {
        let backend = ScriptedBackend::with_plugins(&["zip"]);
        let mut workflow = conflicted(&backend).await;
        let mut prompt = Vec::new();

        let step = run(
            &mut workflow,
            &archive_selection(),
            OverwritePolicy::Ask,
            &mut Cursor::new("y\n"),
            &mut prompt,
        )
        .await
        .unwrap();

        assert_eq!(
            step,
            Step::Notified(Feedback::success("Files decompressed successfully"))
        );
        assert_eq!(overwrite_flags(&backend), vec![false, true]);
        let prompt = String::from_utf8(prompt).unwrap();
        assert!(prompt.contains("/out/a.txt"));
        assert!(prompt.contains("/out/b.txt"));
        assert!(prompt.ends_with("Overwrite these files? [y/N] "));
    }

    #[tokio::test]
    async fn empty_answer_cancels() {
        let backend = ScriptedBackend::with_plugins(&["zip"]);
        let mut workflow = conflicted(&backend).await;

        let step = run(
            &mut workflow,
            &archive_selection(),
            OverwritePolicy::Ask,
            &mut Cursor::new("\n"),
            &mut Vec::new(),
        )
        .await
        .unwrap();

        assert_eq!(step, Step::Dismissed);
        assert_eq!(overwrite_flags(&backend), vec![false]);
    }

    #[tokio::test]
    async fn assume_yes_skips_prompt() {
        let backend = ScriptedBackend::with_plugins(&["zip"]);
        let mut workflow = conflicted(&backend).await;
        let mut prompt = Vec::new();

        run(
            &mut workflow,
            &archive_selection(),
            OverwritePolicy::Assume,
            &mut Cursor::new(""),
            &mut prompt,
        )
        .await
        .unwrap();

        assert!(prompt.is_empty());
        assert_eq!(overwrite_flags(&backend), vec![false, true]);
    }

    #[tokio::test]
    async fn no_terminal_refuses() {
        let backend = ScriptedBackend::with_plugins(&["zip"]);
        let mut workflow = conflicted(&backend).await;
        let mut prompt = Vec::new();

        let step = run(
            &mut workflow,
            &archive_selection(),
            OverwritePolicy::Refuse,
            &mut Cursor::new("y\n"),
            &mut prompt,
        )
        .await
        .unwrap();

        assert_eq!(step, Step::Dismissed);
        assert_eq!(overwrite_flags(&backend), vec![false]);
        assert!(String::from_utf8(prompt).unwrap().contains("--yes"));
    }

    #[tokio::test]
    async fn no_conflict_needs_no_answer() {
        let backend = ScriptedBackend::with_plugins(&["zip"]);
        let (mut workflow, _) = Workflow::start(Dispatcher::new(&backend)).await;

        let step = run(
            &mut workflow,
            &archive_selection(),
            OverwritePolicy::Refuse,
            &mut Cursor::new(""),
            &mut Vec::new(),
        )
        .await
        .unwrap();
        assert!(step.feedback().unwrap().is_success());
    }
}
