//! Mapping from outcomes and pre-flight errors to user-visible feedback.
//!
//! Every completed action produces exactly one [`Feedback`] through these
//! functions. A conflict is not completed; it opens a prompt instead.

use crate::builder::BuildError;
use crate::catalog::CatalogError;
use crate::feedback::Feedback;
use crate::job::{FailureKind, JobOutcome, JobRequest};

pub const ARCHIVE_EXISTS_MESSAGE: &str = "An archive with this name already exists. \
     Please remove it first or choose a different output location.";

pub const PENDING_PROMPT_MESSAGE: &str = "Resolve the pending overwrite prompt first.";

/// Feedback for a finished dispatch, or `None` for a conflict.
pub fn outcome_feedback(request: &JobRequest, outcome: &JobOutcome) -> Option<Feedback> {
    let feedback = match (request, outcome) {
        (_, JobOutcome::Conflict { .. }) => return None,
        (JobRequest::Compress(req), JobOutcome::Success) => Feedback::success(format!(
            "Files compressed successfully to {}",
            req.output_path().display()
        )),
        (JobRequest::Decompress(_), JobOutcome::Success) => {
            Feedback::success("Files decompressed successfully")
        }
        (
            JobRequest::Compress(_),
            JobOutcome::Failure {
                kind: FailureKind::ArchiveExists,
                ..
            },
        ) => Feedback::warning(ARCHIVE_EXISTS_MESSAGE),
        (JobRequest::Compress(_), JobOutcome::Failure { reason, .. }) => {
            Feedback::error(format!("Compression failed: {reason}"))
        }
        (JobRequest::Decompress(_), JobOutcome::Failure { reason, .. }) => {
            Feedback::error(format!("Decompression failed: {reason}"))
        }
    };
    Some(feedback)
}

/// Feedback for a build rejected before dispatch.
pub fn build_error_feedback(error: &BuildError) -> Feedback {
    match error {
        BuildError::MissingInput => Feedback::warning("Select at least one file first."),
        BuildError::MissingPlugin => Feedback::warning("Choose a compression format first."),
        BuildError::UnknownPlugin { name } => {
            Feedback::error(format!("Unknown compression format \"{name}\"."))
        }
        BuildError::MissingOutputDir => Feedback::warning("Choose an output directory first."),
        BuildError::NotAnArchive { path } => Feedback::error(format!(
            "The selected file \"{}\" is not a compressed archive. \
             Please select a compressed file to decompress.",
            path.display()
        )),
    }
}

pub fn catalog_feedback(error: &CatalogError) -> Feedback {
    Feedback::warning(format!("Failed to load plugins: {error}"))
}

/// Feedback for a compress or decompress attempted while a prompt is open.
pub fn pending_prompt_feedback() -> Feedback {
    Feedback::warning(PENDING_PROMPT_MESSAGE)
}
