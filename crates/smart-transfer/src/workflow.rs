use crate::backend::Backend;
use crate::builder::{build_compress, build_decompress};
use crate::catalog::PluginCatalog;
use crate::conflict::{ConflictController, ConflictError, ConflictSession, Observed};
use crate::dispatch::Dispatcher;
use crate::feedback::Feedback;
use crate::job::{JobOutcome, JobRequest};
use crate::notify;
use crate::selection::Selection;

/// What the front-end should show after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Notified(Feedback),
    /// Decompression would overwrite files; ask the user.
    Prompt(ConflictSession),
    /// The prompt was closed without dispatching.
    Dismissed,
}

impl Step {
    pub fn feedback(&self) -> Option<&Feedback> {
        match self {
            Self::Notified(feedback) => Some(feedback),
            _ => None,
        }
    }
}

/// One user session: the catalog, the dispatcher and the pending conflict.
///
/// Every action takes `&mut self`, so actions run one at a time and each
/// completes before the next is accepted.
pub struct Workflow<B> {
    dispatcher: Dispatcher<B>,
    catalog: PluginCatalog,
    conflicts: ConflictController,
}

impl<B: Backend> Workflow<B> {
    pub fn new(dispatcher: Dispatcher<B>, catalog: PluginCatalog) -> Self {
        Self {
            dispatcher,
            catalog,
            conflicts: ConflictController::new(),
        }
    }

    /// Load the catalog from the dispatcher's backend. A load failure gives
    /// an empty catalog plus a warning for the caller to show.
    pub async fn start(dispatcher: Dispatcher<B>) -> (Self, Option<Feedback>) {
        let (catalog, warning) = PluginCatalog::load(dispatcher.backend()).await;
        (Self::new(dispatcher, catalog), warning)
    }

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    pub fn pending(&self) -> Option<&ConflictSession> {
        self.conflicts.session()
    }

    pub async fn compress(&mut self, selection: &Selection) -> Step {
        if self.conflicts.is_awaiting_decision() {
            return Step::Notified(notify::pending_prompt_feedback());
        }
        match build_compress(selection, &self.catalog) {
            Ok(request) => self.run(request.into()).await,
            Err(e) => {
                tracing::debug!(error = %e, "compress rejected before dispatch");
                Step::Notified(notify::build_error_feedback(&e))
            }
        }
    }

    pub async fn decompress(&mut self, selection: &Selection) -> Step {
        if self.conflicts.is_awaiting_decision() {
            return Step::Notified(notify::pending_prompt_feedback());
        }
        match build_decompress(selection) {
            Ok(request) => self.run(request.into()).await,
            Err(e) => {
                tracing::debug!(error = %e, "decompress rejected before dispatch");
                Step::Notified(notify::build_error_feedback(&e))
            }
        }
    }

    /// Re-dispatch the pending request with overwriting allowed.
    pub async fn confirm_overwrite(&mut self) -> Result<Step, ConflictError> {
        let request = self.conflicts.confirm()?;
        Ok(self.run(request.into()).await)
    }

    pub fn cancel_overwrite(&mut self) -> Result<Step, ConflictError> {
        self.conflicts.cancel()?;
        Ok(Step::Dismissed)
    }

    async fn run(&mut self, request: JobRequest) -> Step {
        let outcome = self.dispatcher.dispatch(&request).await;
        settle(&mut self.conflicts, &request, outcome)
    }
}

/// Route a dispatch outcome through the conflict controller and the notifier.
///
/// Front-ends that dispatch on their own tasks call this when the result
/// comes back.
pub fn settle(conflicts: &mut ConflictController, request: &JobRequest, outcome: JobOutcome) -> Step {
    if let JobRequest::Decompress(req) = request {
        match conflicts.observe(req, &outcome) {
            Observed::Prompt => {
                if let Some(session) = conflicts.session() {
                    return Step::Prompt(session.clone());
                }
            }
            Observed::Ignored => {
                return Step::Notified(notify::pending_prompt_feedback());
            }
            Observed::Finished => {}
        }
    }

    match notify::outcome_feedback(request, &outcome) {
        Some(feedback) => Step::Notified(feedback),
        None => Step::Dismissed,
    }
}
