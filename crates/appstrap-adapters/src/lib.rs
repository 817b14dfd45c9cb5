//! Infrastructure adapters for Appstrap.
//!
//! This crate implements the ports defined in
//! `appstrap-core::application::ports`. It contains all external
//! dependencies and I/O operations.

pub mod builtin_plan;
pub mod filesystem;
pub mod plan_loader;
pub mod process;
pub mod prompt;
pub mod renderer;
pub mod source;

// Re-export commonly used adapters
pub use filesystem::LocalFilesystem;
pub use plan_loader::{MANIFEST_FILE, ManifestPlanLoader};
pub use process::{RecordingRunner, SystemCommandRunner};
pub use prompt::{ScriptedAnswer, ScriptedPrompter, TerminalPrompter};
pub use renderer::SimpleRenderer;
pub use source::{GitSourceResolver, TemplateOrigin};
