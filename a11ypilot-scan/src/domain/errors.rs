//! Scan error types
//!
//! Navigation and rule-evaluation failures are fatal to a single page but
//! never to a crawl. Heuristic failures are caught per check and only logged.

use serde::{Deserialize, Serialize};

/// Category of a navigation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationErrorKind {
    Timeout,
    Unreachable,
    CertificateError,
}

/// Page navigation failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("Navigation to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("{url} is unreachable: {message}")]
    Unreachable { url: String, message: String },

    #[error("Certificate error for {url}: {message}")]
    CertificateError { url: String, message: String },
}

impl NavigationError {
    pub fn kind(&self) -> NavigationErrorKind {
        match self {
            NavigationError::Timeout { .. } => NavigationErrorKind::Timeout,
            NavigationError::Unreachable { .. } => NavigationErrorKind::Unreachable,
            NavigationError::CertificateError { .. } => NavigationErrorKind::CertificateError,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            NavigationError::Timeout { url, .. }
            | NavigationError::Unreachable { url, .. }
            | NavigationError::CertificateError { url, .. } => url,
        }
    }

    pub fn timeout(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            url: url.into(),
            timeout_secs,
        }
    }

    pub fn unreachable(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreachable {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn certificate(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CertificateError {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Classify a transport error raised while fetching `url`
    ///
    /// rustls reports handshake and certificate failures as `InvalidData`
    /// I/O errors in the cause chain.
    pub fn from_reqwest(url: &str, err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            return Self::timeout(url, timeout_secs);
        }

        let err = err.without_url();
        let mut message = err.to_string();
        let mut kind = NavigationErrorKind::Unreachable;

        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            if let Some(io) = cause.downcast_ref::<std::io::Error>() {
                match io.kind() {
                    std::io::ErrorKind::InvalidData => kind = NavigationErrorKind::CertificateError,
                    std::io::ErrorKind::TimedOut => return Self::timeout(url, timeout_secs),
                    _ => {}
                }
            }
            source = cause.source();
        }

        match kind {
            NavigationErrorKind::CertificateError => Self::certificate(url, message),
            _ => Self::unreachable(url, message),
        }
    }
}

/// The external rule evaluator failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleEvaluationError {
    #[error("Rule evaluator request failed: {0}")]
    Transport(String),

    #[error("Rule evaluator returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Rule evaluator returned an unreadable result: {0}")]
    InvalidResponse(String),
}

/// A single heuristic check failed; the suite skips it and continues
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeuristicCheckError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Heuristic '{check}' failed: {message}")]
    Evaluation { check: String, message: String },
}

/// Performance sampling failed; the page result carries no metrics
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Performance sampling failed: {0}")]
pub struct SamplingError(pub String);

/// Failure of a page scan or crawl that reaches the caller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    RuleEvaluation(#[from] RuleEvaluationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Scan cancelled before the seed page completed")]
    Cancelled,
}

impl ScanError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Categorized, user-facing explanation of the failure
    pub fn user_message(&self) -> String {
        match self {
            ScanError::Navigation(NavigationError::Timeout { url, timeout_secs }) => format!(
                "The page at {} did not finish loading within {} seconds.",
                url, timeout_secs
            ),
            ScanError::Navigation(NavigationError::Unreachable { url, .. }) => format!(
                "The site at {} could not be reached. Check the address and that the site is online.",
                url
            ),
            ScanError::Navigation(NavigationError::CertificateError { url, .. }) => format!(
                "The site at {} presented an invalid or untrusted TLS certificate.",
                url
            ),
            ScanError::RuleEvaluation(_) => {
                "The accessibility rule engine failed to evaluate the page.".to_string()
            }
            ScanError::InvalidInput(message) => format!("Invalid scan request: {}", message),
            ScanError::Cancelled => "The scan was cancelled.".to_string(),
        }
    }
}
