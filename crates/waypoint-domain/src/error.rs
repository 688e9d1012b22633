//! Error classification and cause-chain helpers
//!
//! Each layer wraps the error below it and exposes it through
//! `std::error::Error::source`, so the upstream message is always the
//! tail of the chain.

use std::error::Error;

/// Retry eligibility of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Timeout or connection-class failure, worth another attempt
    Transient,
    /// Not-found-class failure, never retried
    Permanent,
}

impl ErrorClass {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorClass::Transient)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Transient => "transient",
            ErrorClass::Permanent => "permanent",
        }
    }
}

impl core::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messages from `err` down to the root cause, outermost first
pub fn cause_chain(err: &(dyn Error + 'static)) -> Vec<String> {
    let mut messages = vec![err.to_string()];
    let mut current = err.source();
    while let Some(cause) = current {
        messages.push(cause.to_string());
        current = cause.source();
    }
    messages
}

/// The whole chain on one line: `outer: middle: root`
pub fn render_chain(err: &(dyn Error + 'static)) -> String {
    cause_chain(err).join(": ")
}
