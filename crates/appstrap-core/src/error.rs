//! Unified error handling for Appstrap Core.
//!
//! Wraps domain and application errors behind one type with suggestions
//! and a display category the CLI maps to exit codes.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Appstrap Core operations.
#[derive(Debug, Error, Clone)]
pub enum AppstrapError {
    /// A gate, plan, or transformation rule was violated.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A port (filesystem, process, prompt, source) failed.
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl AppstrapError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Compatibility => ErrorCategory::Compatibility,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}

/// Convenient result type alias.
pub type AppstrapResult<T> = Result<T, AppstrapError>;
