//! # careerkit-error
//!
//! Unified error handling for careerkit, following OpenDAL's error handling practices.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., ConfigInvalid, ExecutionFailed)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary, Persistent)
//! - **ErrorCategory**: The three failure classes a caller reports on
//!   (configuration, validation, execution)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use careerkit_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::ValidationFailed, "career_goal must not be empty")
//!         .with_operation("crew::run")
//!         .with_context("field", "career_goal"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All functions return `Result<T, careerkit_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Don't abuse `From<OtherError>` to prevent raw error leakage

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::{ErrorCategory, ErrorKind};
pub use status::ErrorStatus;

/// Result type alias using careerkit Error
pub type Result<T> = std::result::Result<T, Error>;
