use super::record::SerializedError;
use std::fmt;

const DEFAULT_ERROR_NAME: &str = "Error";

/// Error value rebuilt from a log record for exception capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedError {
    name: String,
    message: String,
    stack: Option<String>,
}

impl ReconstructedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_ERROR_NAME.to_string(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    /// Cut the message to `max_chars` characters, marking the cut with `...`.
    pub fn truncate_message(&mut self, max_chars: usize) {
        if let Some(truncated) = truncate_chars(&self.message, max_chars) {
            self.message = truncated;
        }
    }
}

impl fmt::Display for ReconstructedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for ReconstructedError {}

/// Build the error reported for an exception-level record.
///
/// With a serialized error the message becomes `"{msg}: {err.message}"` and the
/// name and stack are taken from it; otherwise the message is `msg` alone.
pub fn create_error_with_message(err: Option<&SerializedError>, msg: &str) -> ReconstructedError {
    match err {
        Some(err) => ReconstructedError {
            name: err
                .error_type
                .clone()
                .unwrap_or_else(|| DEFAULT_ERROR_NAME.to_string()),
            message: format!("{msg}: {}", err.message.as_deref().unwrap_or_default()),
            stack: err.stack.clone(),
        },
        None => ReconstructedError::new(msg),
    }
}

/// Returns the truncated copy, or `None` when `text` already fits.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> Option<String> {
    let (cut, _) = text.char_indices().nth(max_chars)?;
    Some(format!("{}...", &text[..cut]))
}
