//! Error kinds for careerkit operations

use std::fmt;

/// The kind of error that occurred.
///
/// Users can match on ErrorKind to decide how to handle specific error cases,
/// or collapse it with [`ErrorKind::category`] when only the coarse class matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid configuration, missing credential or bad template
    ConfigInvalid,

    // =========================================================================
    // Input errors
    // =========================================================================
    /// A required profile field is missing or out of range
    ValidationFailed,

    /// Failed to parse input (config file, secret store)
    ParseFailed,

    // =========================================================================
    // Inference/LLM errors
    // =========================================================================
    /// A pipeline stage failed while talking to the model
    ExecutionFailed,

    /// Provider not available (5xx, overloaded)
    ProviderUnavailable,

    /// Rate limit exceeded
    RateLimited,

    // =========================================================================
    // IO errors
    // =========================================================================
    /// IO operation failed
    IoFailed,

    /// Network error
    NetworkFailed,
}

/// The three failure classes surfaced to callers of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing or invalid credential/config - fatal, no retry
    Configuration,
    /// Bad user input - fatal, reported before any remote call
    Validation,
    /// Anything that went wrong while running a stage
    Execution,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::ConfigInvalid => "ConfigInvalid",

            ErrorKind::ValidationFailed => "ValidationFailed",
            ErrorKind::ParseFailed => "ParseFailed",

            ErrorKind::ExecutionFailed => "ExecutionFailed",
            ErrorKind::ProviderUnavailable => "ProviderUnavailable",
            ErrorKind::RateLimited => "RateLimited",

            ErrorKind::IoFailed => "IoFailed",
            ErrorKind::NetworkFailed => "NetworkFailed",
        }
    }

    /// Check if this error kind is retryable by default
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::NetworkFailed | ErrorKind::RateLimited | ErrorKind::ProviderUnavailable
        )
    }

    /// Map the kind onto the caller-facing taxonomy
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::ConfigInvalid | ErrorKind::ParseFailed => ErrorCategory::Configuration,
            ErrorKind::ValidationFailed => ErrorCategory::Validation,
            ErrorKind::Unexpected
            | ErrorKind::ExecutionFailed
            | ErrorKind::ProviderUnavailable
            | ErrorKind::RateLimited
            | ErrorKind::IoFailed
            | ErrorKind::NetworkFailed => ErrorCategory::Execution,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "ConfigurationError",
            ErrorCategory::Validation => "ValidationError",
            ErrorCategory::Execution => "ExecutionError",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
