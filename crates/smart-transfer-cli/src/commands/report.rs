use std::io::Write;
use std::process::ExitCode;

use smart_transfer::Step;

/// Print the result of an action: successes to `out`, everything else to
/// `err`. Only an error notification fails the process.
pub fn emit(step: &Step, out: &mut impl Write, err: &mut impl Write) -> ExitCode {
    let written = match step {
        Step::Notified(feedback) if feedback.is_success() => writeln!(out, "{feedback}"),
        Step::Notified(feedback) => writeln!(err, "{feedback}"),
        Step::Dismissed => writeln!(err, "Overwrite cancelled; nothing was extracted."),
        Step::Prompt(session) => writeln!(
            err,
            "{} file(s) would be overwritten; no decision was made.",
            session.existing_paths().len()
        ),
    };
    if written.is_err() {
        return ExitCode::FAILURE;
    }

    match step.feedback() {
        Some(feedback) if feedback.is_error() => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
