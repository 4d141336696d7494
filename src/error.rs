//! Typed failures returned by the scheduler's collaborators.
//!
//! Application plumbing (config, CLI) uses `anyhow`. The collaborators the
//! scheduler retries return these enums instead so that the retry policy can
//! match on the failure kind rather than inspect error strings.

use thiserror::Error;

/// How the scheduler should treat a failed lookup.
///
/// Both kinds are retried after the check interval; the distinction is kept for
/// logging so an operator can tell an outage from bad upstream data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Host unreachable, connection reset, timeout.
    TransientNetwork,
    /// The service answered, but with nothing usable.
    DataError,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::TransientNetwork => write!(f, "network"),
            FailureKind::DataError => write!(f, "data"),
        }
    }
}

/// Failure of a geocoding or sunrise/sunset lookup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("no results for '{0}'")]
    NoResults(String),

    #[error("service returned status {0}")]
    BadStatus(String),

    #[error("unparseable time '{0}'")]
    Unparseable(String),

    #[error("sunrise {sunrise} is not before sunset {sunset}")]
    InvalidWindow { sunrise: String, sunset: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl LookupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LookupError::Network(_) | LookupError::Timeout(_) => FailureKind::TransientNetwork,
            LookupError::NoResults(_)
            | LookupError::BadStatus(_)
            | LookupError::Unparseable(_)
            | LookupError::InvalidWindow { .. }
            | LookupError::InvalidInput(_) => FailureKind::DataError,
        }
    }

    /// Classify a transport error from the HTTP client.
    pub fn from_http(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            LookupError::Timeout(timeout_secs)
        } else if err.is_decode() {
            LookupError::Unparseable(err.to_string())
        } else {
            LookupError::Network(err.to_string())
        }
    }
}

/// Failure to change the desktop theme.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThemeError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("settings store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("no theme backend available: {0}")]
    Unsupported(String),
}

impl ThemeError {
    /// Map a failed settings command to the matching variant from its stderr.
    pub fn from_command_failure(program: &str, stderr: &str) -> Self {
        let lowered = stderr.to_lowercase();
        if lowered.contains("permission") || lowered.contains("denied") {
            ThemeError::PermissionDenied(format!("{program}: {}", stderr.trim()))
        } else {
            ThemeError::StoreUnavailable(format!("{program}: {}", stderr.trim()))
        }
    }
}
