//! Application services - orchestrate use cases.
//!
//! The [`Orchestrator`] is the only entry point callers need; the other
//! services are the pieces it sequences, exposed for reuse and testing.

pub mod git_bootstrapper;
pub mod orchestrator;
pub mod transformer;
pub mod version_gate;

pub use git_bootstrapper::{GitBootstrapper, GitReport};
pub use orchestrator::{
    ActionOutcome, ActionRecord, BootstrapPolicy, BootstrapReport, BootstrapRequest, Orchestrator,
    StepReport,
};
pub use transformer::{ContentTransformer, TransformOutcome};
pub use version_gate::VersionGate;
