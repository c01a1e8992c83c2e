use std::time::Duration;

use crate::backend::{Backend, BackendError};
use crate::job::{FailureKind, JobOutcome, JobRequest};

/// Sends job requests to a backend and classifies what comes back.
///
/// This is the only place backend errors are inspected. One dispatch is one
/// backend call; nothing is retried here.
pub struct Dispatcher<B> {
    backend: B,
    timeout: Option<Duration>,
}

impl<B: Backend> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            timeout: None,
        }
    }

    /// Fail a dispatch that takes longer than `timeout`. The backend call is
    /// dropped, not cancelled at the backend.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn dispatch(&self, request: &JobRequest) -> JobOutcome {
        tracing::info!(
            backend = self.backend.label(),
            kind = %request.kind(),
            inputs = request.inputs().len(),
            "dispatching job"
        );

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.call(request)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(kind = %request.kind(), ?limit, "dispatch timed out");
                    return JobOutcome::failure(
                        FailureKind::TimedOut,
                        format!("timed out after {}s", limit.as_secs()),
                    );
                }
            },
            None => self.call(request).await,
        };

        let outcome = classify(request, result);
        match &outcome {
            JobOutcome::Success => tracing::info!(kind = %request.kind(), "job succeeded"),
            JobOutcome::Conflict { existing_paths } => tracing::info!(
                kind = %request.kind(),
                count = existing_paths.len(),
                "job would overwrite existing files"
            ),
            JobOutcome::Failure { kind, reason } => {
                tracing::warn!(kind = %request.kind(), failure = ?kind, %reason, "job failed")
            }
        }
        outcome
    }

    async fn call(&self, request: &JobRequest) -> Result<(), BackendError> {
        match request {
            JobRequest::Compress(req) => {
                self.backend
                    .compress_files(
                        req.inputs(),
                        req.plugin(),
                        req.output_path(),
                        &req.options().to_wire(),
                    )
                    .await
            }
            JobRequest::Decompress(req) => {
                self.backend
                    .decompress_files(req.inputs(), req.output_dir(), req.overwrite())
                    .await
            }
        }
    }
}

fn classify(request: &JobRequest, result: Result<(), BackendError>) -> JobOutcome {
    let Err(error) = result else {
        return JobOutcome::Success;
    };

    match (request, error) {
        (JobRequest::Compress(_), e @ BackendError::ArchiveExists(_)) => {
            JobOutcome::failure(FailureKind::ArchiveExists, e.to_string())
        }
        (JobRequest::Decompress(req), BackendError::FilesExist(existing_paths))
            if !req.overwrite() =>
        {
            JobOutcome::Conflict { existing_paths }
        }
        (JobRequest::Decompress(_), BackendError::FilesExist(paths)) => JobOutcome::failure(
            FailureKind::Backend,
            format!(
                "backend still reported {} existing file(s) with overwrite enabled",
                paths.len()
            ),
        ),
        (_, e) => JobOutcome::failure(FailureKind::Backend, e.to_string()),
    }
}
