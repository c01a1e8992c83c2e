/// The user-visible result of one completed action.
///
/// Front-ends decide how to present it: the CLI prints the `Display` form
/// to stdout or stderr, the TUI shows it in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// The job finished.
    Success(String),
    /// Nothing was done, but the user can fix it.
    Warning(String),
    /// The job or its pre-flight failed.
    Error(String),
}

impl Feedback {
    pub fn success(msg: impl Into<String>) -> Self {
        Self::Success(msg.into())
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::Warning(msg.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Short heading for toast-style presentation.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Success(_) => "Success",
            Self::Warning(_) => "Warning",
            Self::Error(_) => "Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(msg) | Self::Warning(msg) | Self::Error(msg) => msg,
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(msg) => write!(f, "{msg}"),
            Self::Warning(msg) => write!(f, "warning: {msg}"),
            Self::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_and_predicates() {
        let ok = Feedback::success("done");
        assert!(ok.is_success());
        assert_eq!(ok.title(), "Success");
        assert_eq!(ok.message(), "done");

        let warn = Feedback::warning("careful");
        assert!(warn.is_warning());
        assert_eq!(warn.title(), "Warning");

        let err = Feedback::error("oops");
        assert!(err.is_error());
        assert_eq!(err.title(), "Error");
        assert_eq!(err.message(), "oops");
    }

    #[test]
    fn display_prefixes_severity() {
        assert_eq!(Feedback::success("msg").to_string(), "msg");
        assert_eq!(Feedback::warning("msg").to_string(), "warning: msg");
        assert_eq!(Feedback::error("msg").to_string(), "error: msg");
    }
}
