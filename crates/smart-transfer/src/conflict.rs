use std::path::PathBuf;

use crate::job::{DecompressRequest, JobOutcome};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("no overwrite decision is pending")]
    NoPendingDecision,
}

/// A decompress request waiting for the user to allow overwriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSession {
    request: DecompressRequest,
    existing_paths: Vec<PathBuf>,
}

impl ConflictSession {
    /// The request that hit the conflict, still with `overwrite = false`.
    pub fn request(&self) -> &DecompressRequest {
        &self.request
    }

    pub fn existing_paths(&self) -> &[PathBuf] {
        &self.existing_paths
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConflictPhase {
    #[default]
    Idle,
    AwaitingDecision(ConflictSession),
    /// Confirmed; the overwrite request is in flight.
    Resolved(DecompressRequest),
}

/// What [`ConflictController::observe`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    /// A session was opened; the user must decide.
    Prompt,
    /// A conflict arrived while another session was open and was dropped.
    Ignored,
    /// The outcome is final and should be notified.
    Finished,
}

/// Holds at most one pending overwrite decision.
///
/// The only way to obtain a decompress request with `overwrite = true` from
/// a conflict is [`ConflictController::confirm`].
#[derive(Debug, Default)]
pub struct ConflictController {
    phase: ConflictPhase,
}

impl ConflictController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &ConflictPhase {
        &self.phase
    }

    pub fn session(&self) -> Option<&ConflictSession> {
        match &self.phase {
            ConflictPhase::AwaitingDecision(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_awaiting_decision(&self) -> bool {
        self.session().is_some()
    }

    /// Feed the outcome of dispatching `request`.
    pub fn observe(&mut self, request: &DecompressRequest, outcome: &JobOutcome) -> Observed {
        match (outcome, &self.phase) {
            (JobOutcome::Conflict { .. }, ConflictPhase::AwaitingDecision(session)) => {
                tracing::warn!(
                    pending = session.existing_paths.len(),
                    "conflict ignored: a decision is already pending"
                );
                Observed::Ignored
            }
            (JobOutcome::Conflict { existing_paths }, _) => {
                tracing::debug!(count = existing_paths.len(), "awaiting overwrite decision");
                self.phase = ConflictPhase::AwaitingDecision(ConflictSession {
                    request: request.clone(),
                    existing_paths: existing_paths.clone(),
                });
                Observed::Prompt
            }
            (_, ConflictPhase::Resolved(_)) => {
                tracing::debug!("overwrite dispatch finished");
                self.phase = ConflictPhase::Idle;
                Observed::Finished
            }
            _ => Observed::Finished,
        }
    }

    /// Accept the pending session and return the request to re-dispatch.
    pub fn confirm(&mut self) -> Result<DecompressRequest, ConflictError> {
        let session = match std::mem::take(&mut self.phase) {
            ConflictPhase::AwaitingDecision(session) => session,
            other => {
                self.phase = other;
                return Err(ConflictError::NoPendingDecision);
            }
        };
        let request = session.request.with_overwrite();
        tracing::debug!("overwrite confirmed");
        self.phase = ConflictPhase::Resolved(request.clone());
        Ok(request)
    }

    /// Discard the pending session without dispatching.
    pub fn cancel(&mut self) -> Result<ConflictSession, ConflictError> {
        match std::mem::take(&mut self.phase) {
            ConflictPhase::AwaitingDecision(session) => {
                tracing::debug!("overwrite cancelled");
                Ok(session)
            }
            other => {
                self.phase = other;
                Err(ConflictError::NoPendingDecision)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::build_decompress;
    use crate::job::FailureKind;
    use crate::selection::Selection;

    use super::*;

    fn request() -> DecompressRequest {
        let mut selection = Selection::new();
        selection.set_files(vec![PathBuf::from("/x/archive.zip")]);
        selection.set_output_dir("/out");
        build_decompress(&selection).unwrap()
    }

    fn conflict(paths: &[&str]) -> JobOutcome {
        JobOutcome::Conflict {
            existing_paths: paths.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn conflict_opens_session() {
        let mut controller = ConflictController::new();
        let observed = controller.observe(&request(), &conflict(&["/out/a.txt", "/out/b.txt"]));
        assert_eq!(observed, Observed::Prompt);

        let session = controller.session().unwrap();
        assert_eq!(session.existing_paths().len(), 2);
        assert!(!session.request().overwrite());
    }

    #[test]
    fn confirm_yields_overwrite_request() {
        let mut controller = ConflictController::new();
        controller.observe(&request(), &conflict(&["/out/a.txt"]));

        let retry = controller.confirm().unwrap();
        assert!(retry.overwrite());
        assert_eq!(retry.inputs(), request().inputs());
        assert_eq!(retry.output_dir(), request().output_dir());
        assert!(matches!(controller.phase(), ConflictPhase::Resolved(_)));

        assert_eq!(controller.observe(&retry, &JobOutcome::Success), Observed::Finished);
        assert_eq!(controller.phase(), &ConflictPhase::Idle);
    }

    #[test]
    fn failed_retry_also_returns_to_idle() {
        let mut controller = ConflictController::new();
        controller.observe(&request(), &conflict(&["/out/a.txt"]));
        let retry = controller.confirm().unwrap();

        let outcome = JobOutcome::failure(FailureKind::Backend, "disk full");
        assert_eq!(controller.observe(&retry, &outcome), Observed::Finished);
        assert_eq!(controller.phase(), &ConflictPhase::Idle);
    }

    #[test]
    fn cancel_discards_session() {
        let mut controller = ConflictController::new();
        controller.observe(&request(), &conflict(&["/out/a.txt"]));

        let session = controller.cancel().unwrap();
        assert_eq!(session.existing_paths(), &[PathBuf::from("/out/a.txt")]);
        assert_eq!(controller.phase(), &ConflictPhase::Idle);
    }

    #[test]
    fn decisions_without_session_are_rejected() {
        let mut controller = ConflictController::new();
        assert_eq!(controller.confirm(), Err(ConflictError::NoPendingDecision));
        assert_eq!(controller.cancel(), Err(ConflictError::NoPendingDecision));
        assert_eq!(controller.phase(), &ConflictPhase::Idle);
    }

    #[test]
    fn second_conflict_keeps_open_session() {
        let mut controller = ConflictController::new();
        controller.observe(&request(), &conflict(&["/out/a.txt"]));
        let before = controller.session().cloned();

        let observed = controller.observe(&request(), &conflict(&["/out/other.txt"]));
        assert_eq!(observed, Observed::Ignored);
        assert_eq!(controller.session().cloned(), before);
    }

    #[test]
    fn cancel_while_resolved_keeps_phase() {
        let mut controller = ConflictController::new();
        controller.observe(&request(), &conflict(&["/out/a.txt"]));
        controller.confirm().unwrap();

        assert_eq!(controller.cancel(), Err(ConflictError::NoPendingDecision));
        assert!(matches!(controller.phase(), ConflictPhase::Resolved(_)));
    }
}
