//! Bounded error summaries.
//!
//! A streaming payload can violate its schema once per array element. The
//! summary keeps the first [`MAX_REPORTED_ERRORS`] messages and states the
//! total so operators still see how bad a frame was.

/// Number of individual messages kept in a summary.
pub const MAX_REPORTED_ERRORS: usize = 5;

/// Join error messages into a summary of at most [`MAX_REPORTED_ERRORS`] lines.
///
/// Longer lists are truncated and prefixed with `"{total} errors. First 5:"`.
pub fn summarize<S: AsRef<str>>(errors: &[S]) -> String {
    let shown = errors
        .iter()
        .take(MAX_REPORTED_ERRORS)
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("\n");

    if errors.len() <= MAX_REPORTED_ERRORS {
        shown
    } else {
        format!(
            "{} errors. First {MAX_REPORTED_ERRORS}:\n{shown}",
            errors.len()
        )
    }
}
