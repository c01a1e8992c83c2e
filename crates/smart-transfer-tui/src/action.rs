use smart_transfer::{JobOutcome, JobRequest};

/// Commands returned by the app to the event loop for side-effect execution.
#[derive(Debug, PartialEq, Eq)]
pub enum AppCommand {
    /// No side effect needed.
    None,
    /// Quit the application.
    Quit,
    /// Submit a job to the dispatcher.
    Dispatch(JobRequest),
}

/// Actions dispatched back into the app from async tasks.
#[derive(Debug)]
pub enum Action {
    /// A dispatched job finished.
    Dispatched {
        request: JobRequest,
        outcome: JobOutcome,
    },
}
