//! Steps and the actions they are composed of.
//!
//! A [`Step`] is a named, ordered list of [`Action`]s with an optional
//! [`Precondition`]. There is no dependency graph: a plan runs its steps in
//! declaration order and each step runs its actions in declaration order.
//!
//! Paths inside actions are relative. Template sources (`src`) resolve
//! against the template source directory, everything else against the
//! target application root.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::domain::{error::DomainError, options::OptionName};

/// Where injected content goes relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Before,
    After,
}

/// What a substitution looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Pattern {
    Literal(String),
    /// A regular expression; the replacement may use `$1`-style groups.
    Regex(String),
}

impl Pattern {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(s) | Self::Regex(s) => s,
        }
    }
}

/// How many matches a substitution replaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    First,
    All,
}

/// Whether a failing command aborts the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandPolicy {
    #[default]
    Fatal,
    /// Failure is logged and the run continues (e.g. lint auto-correct).
    Advisory,
}

/// A single git invocation in the target repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum GitOpKind {
    Init,
    AddAll,
    Commit { message: String },
    AddRemote { url: String },
    PushAll,
}

impl GitOpKind {
    /// Full argv, including the `git` program.
    pub fn argv(&self) -> Vec<String> {
        let args: Vec<&str> = match self {
            Self::Init => vec!["init"],
            Self::AddAll => vec!["add", "-A", "."],
            Self::Commit { message } => vec!["commit", "-m", message],
            Self::AddRemote { url } => vec!["remote", "add", "origin", url],
            Self::PushAll => vec!["push", "-u", "origin", "--all"],
        };
        std::iter::once("git")
            .chain(args)
            .map(str::to_string)
            .collect()
    }
}

/// A primitive unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Action {
    RenderTemplate {
        src: PathBuf,
        dst: PathBuf,
        overwrite: bool,
    },
    CopyFile {
        src: PathBuf,
        dst: PathBuf,
        overwrite: bool,
    },
    CopyTree {
        src: PathBuf,
        dst: PathBuf,
        overwrite: bool,
    },
    InjectAnchor {
        file: PathBuf,
        anchor: String,
        position: Position,
        content: String,
    },
    SubstitutePattern {
        file: PathBuf,
        pattern: Pattern,
        replacement: String,
        scope: Scope,
    },
    CreateEmptyFile {
        path: PathBuf,
    },
    RunShellCommand {
        argv: Vec<String>,
        /// Relative to the target root; `None` runs in the root itself.
        workdir: Option<PathBuf>,
        policy: CommandPolicy,
    },
    PromptYesNo {
        question: String,
        default: bool,
        key: String,
    },
    PromptText {
        question: String,
        default: String,
        key: String,
    },
    GitOp {
        kind: GitOpKind,
    },
}

impl Action {
    /// Convenience for the most common command shape.
    pub fn command<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RunShellCommand {
            argv: argv.into_iter().map(Into::into).collect(),
            workdir: None,
            policy: CommandPolicy::Fatal,
        }
    }

    /// Like [`Action::command`], but failure does not abort the run.
    pub fn advisory_command<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match Self::command(argv) {
            Self::RunShellCommand { argv, workdir, .. } => Self::RunShellCommand {
                argv,
                workdir,
                policy: CommandPolicy::Advisory,
            },
            other => other,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RenderTemplate { .. } => "render",
            Self::CopyFile { .. } => "copy",
            Self::CopyTree { .. } => "copy-tree",
            Self::InjectAnchor { .. } => "inject",
            Self::SubstitutePattern { .. } => "substitute",
            Self::CreateEmptyFile { .. } => "create",
            Self::RunShellCommand { .. } => "run",
            Self::PromptYesNo { .. } => "ask",
            Self::PromptText { .. } => "ask",
            Self::GitOp { .. } => "git",
        }
    }

    fn paths(&self) -> Vec<&Path> {
        match self {
            Self::RenderTemplate { src, dst, .. }
            | Self::CopyFile { src, dst, .. }
            | Self::CopyTree { src, dst, .. } => vec![src.as_path(), dst.as_path()],
            Self::InjectAnchor { file, .. } | Self::SubstitutePattern { file, .. } => {
                vec![file.as_path()]
            }
            Self::CreateEmptyFile { path } => vec![path.as_path()],
            Self::RunShellCommand { workdir, .. } => workdir.iter().map(PathBuf::as_path).collect(),
            Self::PromptYesNo { .. } | Self::PromptText { .. } | Self::GitOp { .. } => vec![],
        }
    }

    fn validate(&self, step: &str) -> Result<(), DomainError> {
        let invalid = |reason: String| DomainError::InvalidStep {
            step: step.to_string(),
            reason,
        };

        for path in self.paths() {
            if path.is_absolute() {
                return Err(DomainError::AbsolutePathNotAllowed {
                    path: path.display().to_string(),
                });
            }
        }

        match self {
            Self::RunShellCommand { argv, .. } if argv.is_empty() => {
                Err(invalid("command has no program".into()))
            }
            Self::InjectAnchor { anchor, .. } if anchor.is_empty() => {
                Err(invalid("anchor text is empty".into()))
            }
            Self::SubstitutePattern { pattern, .. } if pattern.as_str().is_empty() => {
                Err(invalid("substitution pattern is empty".into()))
            }
            Self::SubstitutePattern {
                pattern: Pattern::Regex(re),
                ..
            } => Regex::new(re)
                .map(|_| ())
                .map_err(|e| DomainError::InvalidPattern {
                    pattern: re.clone(),
                    reason: e.to_string(),
                }),
            Self::PromptYesNo { key, .. } | Self::PromptText { key, .. } if key.is_empty() => {
                Err(invalid("prompt has no answer key".into()))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RenderTemplate { src, dst, .. } => {
                write!(f, "render {} -> {}", src.display(), dst.display())
            }
            Self::CopyFile { src, dst, .. } | Self::CopyTree { src, dst, .. } => {
                write!(f, "{} {} -> {}", self.kind(), src.display(), dst.display())
            }
            Self::InjectAnchor {
                file,
                anchor,
                position,
                ..
            } => {
                let where_ = match position {
                    Position::Before => "before",
                    Position::After => "after",
                };
                write!(f, "inject into {} {where_} {anchor:?}", file.display())
            }
            Self::SubstitutePattern { file, pattern, .. } => {
                write!(f, "substitute {:?} in {}", pattern.as_str(), file.display())
            }
            Self::CreateEmptyFile { path } => write!(f, "create {}", path.display()),
            Self::RunShellCommand { argv, policy, .. } => {
                write!(f, "run `{}`", argv.join(" "))?;
                if *policy == CommandPolicy::Advisory {
                    f.write_str(" (advisory)")?;
                }
                Ok(())
            }
            Self::PromptYesNo { question, .. } | Self::PromptText { question, .. } => {
                write!(f, "ask {question:?}")
            }
            Self::GitOp { kind } => write!(f, "run `{}`", kind.argv().join(" ")),
        }
    }
}

/// Gate on whether a step runs at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "when")]
pub enum Precondition {
    PathAbsent { path: PathBuf },
    PathPresent { path: PathBuf },
    /// No file under `dir` (recursively) ends in `.extension`.
    NoFilesWithExtension { dir: PathBuf, extension: String },
    /// An earlier yes/no prompt stored `true` under `key`.
    Confirmed { key: String },
    /// The named generator option was not set to `true`.
    OptionDisabled { option: OptionName },
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathAbsent { path } => write!(f, "only if {} is absent", path.display()),
            Self::PathPresent { path } => write!(f, "only if {} exists", path.display()),
            Self::NoFilesWithExtension { dir, extension } => {
                write!(f, "only if {} has no .{extension} files", dir.display())
            }
            Self::Confirmed { key } => write!(f, "only if '{key}' was confirmed"),
            Self::OptionDisabled { option } => {
                write!(f, "only without --{}", option.as_str().replace('_', "-"))
            }
        }
    }
}

/// An ordered, named unit of bootstrap work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub name: String,
    pub precondition: Option<Precondition>,
    pub actions: Vec<Action>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            precondition: None,
            actions: Vec::new(),
        }
    }

    pub fn when(mut self, precondition: Precondition) -> Self {
        self.precondition = Some(precondition);
        self
    }

    pub fn then(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidStep {
                step: self.name.clone(),
                reason: "step name is empty".into(),
            });
        }
        if self.actions.is_empty() {
            return Err(DomainError::InvalidStep {
                step: self.name.clone(),
                reason: "step has no actions".into(),
            });
        }
        self.actions
            .iter()
            .try_for_each(|action| action.validate(&self.name))
    }
}
