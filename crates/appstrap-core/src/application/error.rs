//! Application layer errors.
//!
//! These errors represent failures at the ports (processes, filesystem,
//! prompts, template sources), not rule violations. Rule violations are
//! `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while driving the outside world.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A command could not be started, or exited non-zero under a fatal policy.
    #[error("Command `{command}` failed: {reason}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        reason: String,
    },

    /// The template origin could not be cloned or found.
    #[error("Could not resolve template source '{origin}': {reason}")]
    SourceResolution { origin: String, reason: String },

    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    #[error("Prompt {question:?} failed: {reason}")]
    PromptFailed { question: String, reason: String },

    /// The plan manifest exists but is unreadable or malformed.
    #[error("Failed to load plan {path}: {reason}")]
    PlanLoad { path: PathBuf, reason: String },

    #[error("Template rendering failed for {path}: {reason}")]
    RenderingFailed { path: PathBuf, reason: String },

    /// The user declined to continue, or the run was interrupted.
    #[error("Cancelled: {reason}")]
    Cancelled { reason: String },
}

impl ApplicationError {
    /// Shorthand for a command that exited with `code`.
    pub fn exited(command: impl Into<String>, code: Option<i32>) -> Self {
        let reason = match code {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        };
        Self::CommandFailed {
            command: command.into(),
            code,
            reason,
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CommandFailed { command, code, .. } => {
                let program = command.split_whitespace().next().unwrap_or(command);
                match code {
                    None => vec![
                        format!("Check that '{program}' is installed and on your PATH"),
                    ],
                    Some(_) => vec![
                        format!("Run `{command}` by hand in the project to see the full error"),
                        "Steps before this one have already been applied".into(),
                    ],
                }
            }
            Self::SourceResolution { .. } => vec![
                "Check the --template path or URL".into(),
                "Remote templates need 'git' on your PATH and network access".into(),
                "Append #<branch> to the URL to pick a branch".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::PlanLoad { path, .. } => vec![
                format!("Fix or remove {}", path.display()),
                "Run `appstrap plan --template <dir>` to validate a manifest".into(),
            ],
            Self::Cancelled { .. } => vec!["Steps finished before the cancellation were kept".into()],
            Self::PromptFailed { .. } => {
                vec!["Re-run with --non-interactive to accept all defaults".into()]
            }
            Self::RenderingFailed { .. } => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceResolution { .. } => ErrorCategory::NotFound,
            Self::PlanLoad { .. } | Self::Cancelled { .. } => ErrorCategory::Validation,
            Self::CommandFailed { .. }
            | Self::FilesystemError { .. }
            | Self::PromptFailed { .. }
            | Self::RenderingFailed { .. } => ErrorCategory::Internal,
        }
    }
}
