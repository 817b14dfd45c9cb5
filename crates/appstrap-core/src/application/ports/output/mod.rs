//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the orchestrator needs from external systems.
//! The `appstrap-adapters` crate provides implementations.

use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::{BootstrapPlan, RenderContext};
use crate::error::AppstrapResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `appstrap_adapters::filesystem::LocalFilesystem` (production)
/// - `crate::application::testing::MemoryFilesystem` (tests, `testing` feature)
///
/// Paths are used as given; the orchestrator joins them onto the source
/// or target root before calling in.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> AppstrapResult<()>;

    fn read_to_string(&self, path: &Path) -> AppstrapResult<String>;

    /// Write content to a file, creating parent directories.
    fn write_file(&self, path: &Path, content: &str) -> AppstrapResult<()>;

    /// Copy one file byte for byte, creating parent directories.
    fn copy_file(&self, from: &Path, to: &Path) -> AppstrapResult<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Every regular file below `dir`, recursively, sorted.
    ///
    /// An absent directory yields an empty list.
    fn list_files(&self, dir: &Path) -> AppstrapResult<Vec<PathBuf>>;
}

/// An external command and the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub argv: Vec<String>,
    pub workdir: PathBuf,
}

impl CommandSpec {
    pub fn new<I, S>(argv: I, workdir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            workdir: workdir.into(),
        }
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}

/// How a command finished. `code` is `None` when killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    pub code: Option<i32>,
}

impl CommandStatus {
    pub const SUCCESS: Self = Self { code: Some(0) };

    pub const fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Captured result of a silent probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: CommandStatus,
    pub stdout: String,
}

/// Port for spawning external processes.
///
/// `run` inherits the terminal so the user sees `bundle install` progress;
/// `probe` captures output for detection (`git log -1`, `rails --version`).
/// Both return `Err(CommandFailed)` only when the program could not be
/// started; a non-zero exit is reported through the status.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    fn run(&self, spec: &CommandSpec) -> AppstrapResult<CommandStatus>;

    fn probe(&self, spec: &CommandSpec) -> AppstrapResult<CommandOutput>;
}

/// Port for asking the user questions.
///
/// Implementations return the default without blocking when they are not
/// interactive.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    fn is_interactive(&self) -> bool;

    fn ask_yes_no(&self, question: &str, default: bool) -> AppstrapResult<bool>;

    fn ask_text(&self, question: &str, default: &str) -> AppstrapResult<String>;
}

/// A template source directory ready to read from.
///
/// Remote sources own their temporary clone through `guard`; dropping the
/// `ResolvedSource` removes the clone.
pub struct ResolvedSource {
    root: PathBuf,
    origin: String,
    guard: Option<Box<dyn Any + Send>>,
}

impl ResolvedSource {
    pub fn local(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            origin: root.display().to_string(),
            root,
            guard: None,
        }
    }

    /// A checkout that lives only as long as `guard`.
    pub fn temporary(
        origin: impl Into<String>,
        root: impl Into<PathBuf>,
        guard: impl Any + Send,
    ) -> Self {
        Self {
            root: root.into(),
            origin: origin.into(),
            guard: Some(Box::new(guard)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn is_temporary(&self) -> bool {
        self.guard.is_some()
    }
}

impl fmt::Debug for ResolvedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSource")
            .field("root", &self.root)
            .field("origin", &self.origin)
            .field("temporary", &self.is_temporary())
            .finish()
    }
}

/// Port for locating the template source.
#[cfg_attr(test, mockall::automock)]
pub trait SourceResolver: Send + Sync {
    fn resolve(&self, origin: &str) -> AppstrapResult<ResolvedSource>;
}

/// Port for obtaining the plan a template source ships with.
#[cfg_attr(test, mockall::automock)]
pub trait PlanSource: Send + Sync {
    fn load(&self, source_root: &Path) -> AppstrapResult<BootstrapPlan>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `appstrap_adapters::renderer::SimpleRenderer` (variable substitution)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, context: &RenderContext) -> AppstrapResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_spec_splits_program_and_args() {
        let spec = CommandSpec::new(["bundle", "exec", "rspec"], "/tmp/blog");
        assert_eq!(spec.program(), Some("bundle"));
        assert_eq!(spec.args(), ["exec", "rspec"]);
        assert_eq!(spec.to_string(), "bundle exec rspec");
    }

    #[test]
    fn empty_command_has_no_program() {
        let spec = CommandSpec::new(Vec::<String>::new(), ".");
        assert_eq!(spec.program(), None);
        assert!(spec.args().is_empty());
    }

    #[test]
    fn temporary_source_drops_its_guard() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        struct Flag(Arc<AtomicBool>);
        impl Drop for Flag {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let source = ResolvedSource::temporary("git@x:y.git", "/tmp/clone", Flag(dropped.clone()));
        assert!(source.is_temporary());
        drop(source);
        assert!(dropped.load(Ordering::SeqCst));
    }
}
