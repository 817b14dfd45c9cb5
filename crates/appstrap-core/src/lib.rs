//! Appstrap Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Appstrap
//! bootstrapper, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          appstrap-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (Orchestrator, VersionGate, Git, ...)  │
//! │         Sequences the bootstrap         │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, CommandRunner, Prompter)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    appstrap-adapters (Infrastructure)   │
//! │ (LocalFilesystem, SystemCommandRunner)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (Step, Action, VersionRequirement,     │
//! │   GeneratorOptions, RepoState)          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use appstrap_core::application::{BootstrapRequest, Orchestrator};
//!
//! // Adapters come from `appstrap-adapters`.
//! let orchestrator = Orchestrator::new(fs, runner, prompter, resolver, plans, renderer);
//! let report = orchestrator
//!     .bootstrap(BootstrapRequest::new("blog", "./blog", "./template"))
//!     .unwrap();
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        BootstrapPolicy, BootstrapReport, BootstrapRequest, Orchestrator,
        ports::{
            CommandRunner, CommandSpec, CommandStatus, Filesystem, PlanSource, Prompter,
            ResolvedSource, SourceResolver, TemplateRenderer,
        },
    };
    pub use crate::domain::{
        Action, BootstrapPlan, CommandPolicy, GeneratorOptions, GitOpKind, Pattern, Position,
        Precondition, RenderContext, RunContext, Scope, Step, VersionRequirement,
    };
    pub use crate::error::{AppstrapError, AppstrapResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
