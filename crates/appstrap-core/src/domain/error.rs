// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (carried into reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Gate Errors
    // ========================================================================
    #[error("This template requires {tool} {requirement}. You are using {detected}.")]
    VersionIncompatible {
        tool: String,
        requirement: String,
        detected: String,
    },

    #[error("Invalid version requirement '{requirement}': {reason}")]
    InvalidVersionRequirement { requirement: String, reason: String },

    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Unsupported option: {name}={actual} (this template requires {name}={expected})")]
    UnsupportedOption {
        name: &'static str,
        expected: bool,
        actual: bool,
    },

    #[error("Unknown generator option '{0}'")]
    UnknownOption(String),

    // ========================================================================
    // Transformation Errors
    // ========================================================================
    #[error("Anchor {anchor:?} not found in {file}")]
    AnchorNotFound { file: String, anchor: String },

    #[error("Invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ========================================================================
    // Plan Errors
    // ========================================================================
    #[error("Invalid step '{step}': {reason}")]
    InvalidStep { step: String, reason: String },

    #[error("Duplicate step name: {0}")]
    DuplicateStep(String),

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::VersionIncompatible {
                tool, requirement, ..
            } => vec![
                format!("Install a {tool} version matching {requirement}"),
                "Or re-run interactively and confirm to continue anyway".into(),
                "Or pass --toolchain-version if detection picked the wrong binary".into(),
            ],
            Self::UnsupportedOption { name, expected, .. } => vec![
                format!(
                    "Re-run the generator with --{}={}",
                    name.replace('_', "-"),
                    expected
                ),
                "Nothing was modified; it is safe to re-run".into(),
            ],
            Self::AnchorNotFound { file, anchor } => vec![
                format!("{file} no longer contains the line {anchor:?}"),
                "The upstream generator output probably changed shape".into(),
                "Restore the file or update the step's anchor, then re-run".into(),
                "Steps that already ran may inject duplicate content on re-run".into(),
            ],
            Self::InvalidVersionRequirement { .. } | Self::InvalidVersion { .. } => vec![
                "Use a requirement such as '~> 6.0.0' or '>= 7.1, < 8'".into(),
            ],
            Self::InvalidPattern { .. } => {
                vec!["Check the regular expression syntax in the plan".into()]
            }
            Self::InvalidStep { .. } | Self::DuplicateStep(_) => {
                vec!["Fix the plan manifest (appstrap.toml) and re-run".into()]
            }
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::VersionIncompatible { .. } => ErrorCategory::Compatibility,
            Self::UnsupportedOption { .. } | Self::UnknownOption(_) => ErrorCategory::Validation,
            Self::InvalidVersionRequirement { .. }
            | Self::InvalidVersion { .. }
            | Self::InvalidPattern { .. }
            | Self::InvalidStep { .. }
            | Self::DuplicateStep(_)
            | Self::AbsolutePathNotAllowed { .. }
            | Self::AnchorNotFound { .. } => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Internal,
}
