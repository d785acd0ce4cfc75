use std::fmt;

/// Machine-checkable failure category for an API call.
///
/// Callers branch on the kind, never on message substrings. The message is
/// display-only payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The pre-flight reachability check failed; no transport attempted.
    Offline,
    /// No response within the per-attempt budget.
    Timeout,
    /// Connection, DNS, IO, or an unparseable/non-2xx reply.
    Transport,
    /// The server answered and explicitly reported failure.
    Server,
}

impl ErrorKind {
    fn label(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Server => "server",
        }
    }
}

/// A failed API call: what went wrong, and a human-readable message.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn offline() -> Self {
        Self {
            kind: ErrorKind::Offline,
            message: "no network connection".to_string(),
        }
    }

    pub fn timeout() -> Self {
        Self {
            kind: ErrorKind::Timeout,
            message: "no response from the server within the time budget".to_string(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Server,
            message: message.into(),
        }
    }

    /// Whether this failure is a connectivity problem rather than a
    /// server-reported one. Controllers show the generic "check your
    /// connection" prompt for these.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Offline | ErrorKind::Timeout | ErrorKind::Transport
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_kinds() {
        assert!(ApiError::offline().is_connectivity());
        assert!(ApiError::timeout().is_connectivity());
        assert!(ApiError::transport("refused").is_connectivity());
        assert!(!ApiError::server("bad sheet").is_connectivity());
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = ApiError::server("sheet not found");
        assert_eq!(err.to_string(), "server: sheet not found");
    }
}
