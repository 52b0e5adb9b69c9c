//! The main Error type for careerkit

use crate::{ErrorCategory, ErrorKind, ErrorStatus};
use std::fmt;

/// The unified error type for all careerkit operations.
///
/// This error type provides:
/// - `kind`: What type of error occurred
/// - `message`: Human-readable description
/// - `status`: Whether the error is retryable
/// - `operation`: What operation caused the error
/// - `context`: Key-value pairs for debugging
/// - `source`: The underlying error (if any)
///
/// # Example
///
/// ```rust
/// use careerkit_error::{Error, ErrorCategory, ErrorKind, ErrorStatus};
///
/// let err = Error::new(ErrorKind::ExecutionFailed, "model returned empty response")
///     .with_operation("crew::run_stage")
///     .with_status(ErrorStatus::Temporary)
///     .with_context("stage", "learning_path")
///     .with_context("model", "llama-3.1-8b-instant");
///
/// assert_eq!(err.kind(), ErrorKind::ExecutionFailed);
/// assert_eq!(err.category(), ErrorCategory::Execution);
/// assert!(err.status().is_retryable());
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: ErrorStatus,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let status = if kind.is_retryable() {
            ErrorStatus::Temporary
        } else {
            ErrorStatus::Permanent
        };

        Self {
            kind,
            message: message.into(),
            status,
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the caller-facing category (configuration, validation, execution)
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the error status
    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Get the operation that caused this error
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Get the context key-value pairs
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Look up the first context value recorded under `key`
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the source error (if any)
    pub fn source_ref(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    // =========================================================================
    // Builders (chainable)
    // =========================================================================

    /// Set the error status
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the operation that caused this error.
    ///
    /// If an operation was already set, the previous one is moved to context
    /// as "called" to preserve the call chain.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Set the source error.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if source was already set.
    pub fn set_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(source.into());
        self
    }

    // =========================================================================
    // Status mutations
    // =========================================================================

    /// Mark as persistent after failed retries
    pub fn persist(mut self) -> Self {
        self.status = self.status.persist();
        self
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.status.is_retryable()
    }
}

// =============================================================================
// Display - compact, single-line format for logs
// =============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at {}", self.kind, self.status, self.operation)?;

        if !self.context.is_empty() {
            write!(f, ", context {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        if let Some(source) = &self.source {
            write!(f, ", source: {}", source)?;
        }

        Ok(())
    }
}

// =============================================================================
// Debug - verbose, multi-line format for debugging
// =============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} [{}] ({}) at {}",
            self.kind,
            self.category(),
            self.status,
            self.operation
        )?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "        {}: {}", key, value)?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "    Source: {:?}", source)?;
        }

        Ok(())
    }
}

// =============================================================================
// std::error::Error implementation
// =============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::IoFailed, err.to_string())
            .with_operation("io")
            .set_source(err)
    }
}

// =============================================================================
// Convenience constructors
// =============================================================================

impl Error {
    /// Create an Unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create a ConfigInvalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a ConfigInvalid error for a credential that could not be resolved
    pub fn missing_credential(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorKind::ConfigInvalid,
            format!("{} not found in secret store or environment", name),
        )
        .with_context("credential", name)
    }

    /// Create a ValidationFailed error for a single profile field
    pub fn validation_failed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(ErrorKind::ValidationFailed, reason).with_context("field", field)
    }

    /// Create an ExecutionFailed error attributed to a pipeline stage
    pub fn execution_failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExecutionFailed, message).with_context("stage", stage)
    }

    /// Create a ParseFailed error
    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::new(ErrorKind::ValidationFailed, "career_goal must not be empty");
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert_eq!(err.message(), "career_goal must not be empty");
        assert_eq!(err.status(), ErrorStatus::Permanent);
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::new(ErrorKind::ExecutionFailed, "timeout")
            .with_operation("crew::run_stage")
            .with_context("stage", "skill_gap")
            .with_context("attempt", "1");

        assert_eq!(err.operation(), "crew::run_stage");
        assert_eq!(err.context().len(), 2);
        assert_eq!(err.context()[0], ("stage", "skill_gap".to_string()));
        assert_eq!(err.context_value("attempt"), Some("1"));
        assert_eq!(err.context_value("model"), None);
    }

    #[test]
    fn test_operation_chaining() {
        let err = Error::new(ErrorKind::IoFailed, "write failed")
            .with_operation("export::write")
            .with_operation("cli::run");

        assert_eq!(err.operation(), "cli::run");
        assert_eq!(err.context().len(), 1);
        assert_eq!(err.context()[0], ("called", "export::write".to_string()));
    }

    #[test]
    fn test_default_status_follows_kind() {
        let err = Error::new(ErrorKind::RateLimited, "slow down");
        assert!(err.is_retryable());

        let err = Error::new(ErrorKind::ConfigInvalid, "no key");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_persist() {
        let err = Error::new(ErrorKind::NetworkFailed, "connection refused");
        assert!(err.is_retryable());

        let err = err.persist();
        assert!(!err.is_retryable());
        assert_eq!(err.status(), ErrorStatus::Persistent);

        let err = Error::execution_failed("skill_gap", "bad request").persist();
        assert_eq!(err.status(), ErrorStatus::Permanent);
    }

    #[test]
    fn test_display() {
        let err = Error::execution_failed("action_plan", "model unavailable")
            .with_operation("crew::run_stage")
            .with_context("model", "llama-3.1-8b-instant");

        let display = format!("{}", err);
        assert!(display.contains("ExecutionFailed"));
        assert!(display.contains("permanent"));
        assert!(display.contains("crew::run_stage"));
        assert!(display.contains("stage: action_plan"));
        assert!(display.contains("model unavailable"));
    }

    #[test]
    fn test_convenience_constructors() {
        let err = Error::missing_credential("GROQ_API_KEY");
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.message().contains("GROQ_API_KEY"));

        let err = Error::validation_failed("industry", "industry must not be empty");
        assert_eq!(err.context_value("field"), Some("industry"));

        let err = Error::parse_failed("bad toml");
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_set_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::parse_failed("invalid response body").set_source(json_err);

        assert!(err.source_ref().is_some());
        assert!(std::error::Error::source(&err).is_some());
        assert!(format!("{:?}", err).contains("Source:"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "secrets.toml");
        let err: Error = io_err.into();
        assert_eq!(err.kind(), ErrorKind::IoFailed);
        assert_eq!(err.operation(), "io");
    }
}
