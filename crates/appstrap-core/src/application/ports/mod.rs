//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `appstrap-adapters` implement
//! these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by the orchestrator, implemented by
//!   infrastructure
//!   - `Filesystem`: file operations on the template source and target
//!   - `CommandRunner`: external processes (`bundle`, `rails`, `git`)
//!   - `Prompter`: yes/no and text questions
//!   - `SourceResolver`: local path or git clone of the template
//!   - `PlanSource`: the plan a template ships with
//!   - `TemplateRenderer`: `{{VARIABLE}}` rendering

pub mod output;

pub use output::{
    CommandOutput, CommandRunner, CommandSpec, CommandStatus, Filesystem, PlanSource, Prompter,
    ResolvedSource, SourceResolver, TemplateRenderer,
};

#[cfg(test)]
pub use output::{MockCommandRunner, MockPlanSource, MockPrompter, MockSourceResolver};
