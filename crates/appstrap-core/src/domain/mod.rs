//! Core domain layer for Appstrap.
//!
//! This module contains pure bootstrap logic. It never touches the
//! filesystem or spawns processes; all of that is reached through the ports
//! defined in the application layer.
//!
//! ## What lives here
//!
//! - **Versions**: requirement parsing and the gate decision
//! - **Options**: the enumerated generator options and their validation
//! - **Steps**: the ordered units of work and their actions
//! - **Anchors**: text injection and substitution over plain strings
//! - **Repository state**: the git bootstrap state machine
//! - **Context**: the run-scoped answers and render variables

pub mod anchor;
pub mod context;
pub mod error;
pub mod gemfile;
pub mod options;
pub mod plan;
pub mod repo;
pub mod step;
pub mod version;

pub use anchor::{AnchorLocator, AnchorMatch, LiteralAnchor, inject, substitute};
pub use context::{RenderContext, RunContext};
pub use error::{DomainError, ErrorCategory};
pub use gemfile::{gem_requirement, requirement_variable};
pub use options::{GeneratorOptions, OptionName, validate_options};
pub use plan::{BootstrapPlan, ToolRequirement};
pub use repo::{RemoteUrl, RepoState, needs_remote, plan_git};
pub use step::{
    Action, CommandPolicy, GitOpKind, Pattern, Position, Precondition, Scope, Step,
};
pub use version::{GateOutcome, VersionRequirement, check_version, parse_detected_version};
