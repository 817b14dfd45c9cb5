//! Application layer for Appstrap.
//!
//! This layer contains:
//! - **Services**: the bootstrap use case and the pieces it sequences
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! rules of its own. Gates, plan validation and text transformation live
//! in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use services::{
    ActionOutcome, ActionRecord, BootstrapPolicy, BootstrapReport, BootstrapRequest,
    ContentTransformer, GitBootstrapper, GitReport, Orchestrator, StepReport, TransformOutcome,
    VersionGate,
};

pub use ports::{
    CommandOutput, CommandRunner, CommandSpec, CommandStatus, Filesystem, PlanSource, Prompter,
    ResolvedSource, SourceResolver, TemplateRenderer,
};

pub use error::ApplicationError;
