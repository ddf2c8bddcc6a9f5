//! Transport failure classification.
//!
//! # Responsibilities
//! - Sort transport errors into the classes retry budgets are kept for
//! - Keep timeouts distinct from refused connections
//!
//! # Design Decisions
//! - A timeout while connecting counts as a connect error
//! - Any other timeout counts as a read error
//! - Everything else (TLS, redirects, body) is "other"

use std::fmt;

/// Transport error classes, each with its own retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connect,
    Read,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connect => "connect",
            ErrorKind::Read => "read",
            ErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a failed request.
pub fn classify_error(error: &reqwest::Error) -> ErrorKind {
    if error.is_connect() {
        ErrorKind::Connect
    } else if error.is_timeout() {
        ErrorKind::Read
    } else {
        ErrorKind::Other
    }
}
