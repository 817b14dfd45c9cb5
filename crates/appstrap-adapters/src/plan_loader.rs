//! Manifest-based plan loader.
//!
//! A template directory may ship an `appstrap.toml` describing its own
//! steps. Without one, the built-in Rails plan is used.
//!
//! # `appstrap.toml` format
//!
//! ```toml
//! [plan]
//! name = "rails-default"
//! capture_gems = ["rails", "puma"]
//!
//! [[steps]]
//! name = "Database"
//! when = { no_files_with_extension = { dir = "db/migrate", extension = "rb" } }
//!
//! [[steps.actions]]
//! run = ["bin/rails", "db:create"]
//!
//! [[steps]]
//! name = "Localization"
//!
//! [[steps.actions]]
//! inject = "config/application.rb"
//! anchor = "class Application < Rails::Application\n"
//! position = "after"                 # before | after (default)
//! content = "    config.i18n.default_locale = :{{LOCALE}}\n"
//! ```
//!
//! Each action names exactly one verb: `render`, `copy`, `copy_tree`,
//! `inject`, `substitute`, `create`, `run`, `ask`, `ask_text` or `git`.
//! `when` accepts `path_absent`, `path_present`,
//! `no_files_with_extension`, `confirmed` or `option_disabled`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, instrument};

use appstrap_core::{
    application::{
        ApplicationError,
        ports::{Filesystem, PlanSource},
    },
    domain::{
        Action, BootstrapPlan, CommandPolicy, GitOpKind, OptionName, Pattern, Position,
        Precondition, Scope, Step,
    },
    error::AppstrapResult,
};

use crate::{builtin_plan, filesystem::LocalFilesystem};

/// File name looked up at the template root.
pub const MANIFEST_FILE: &str = "appstrap.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    plan: PlanSection,
    #[serde(default)]
    steps: Vec<StepEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanSection {
    name: Option<String>,
    #[serde(default)]
    capture_gems: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepEntry {
    name: String,
    when: Option<WhenEntry>,
    #[serde(default)]
    actions: Vec<ActionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
enum WhenEntry {
    PathAbsent(PathBuf),
    PathPresent(PathBuf),
    NoFilesWithExtension { dir: PathBuf, extension: String },
    Confirmed(String),
    OptionDisabled(String),
}

/// One `[[steps.actions]]` table. Exactly one verb key must be present;
/// the remaining keys qualify it.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ActionEntry {
    render: Option<PathBuf>,
    copy: Option<PathBuf>,
    copy_tree: Option<PathBuf>,
    inject: Option<PathBuf>,
    substitute: Option<PathBuf>,
    create: Option<PathBuf>,
    run: Option<Vec<String>>,
    ask: Option<String>,
    ask_text: Option<String>,
    git: Option<String>,

    to: Option<PathBuf>,
    overwrite: bool,
    anchor: Option<String>,
    position: Option<String>,
    content: Option<String>,
    pattern: Option<String>,
    replacement: Option<String>,
    regex: bool,
    all: bool,
    workdir: Option<PathBuf>,
    advisory: bool,
    key: Option<String>,
    default: Option<toml::Value>,
    message: Option<String>,
    url: Option<String>,
}

// ── Conversion ────────────────────────────────────────────────────────────────

impl ActionEntry {
    fn verbs(&self) -> Vec<&'static str> {
        [
            ("render", self.render.is_some()),
            ("copy", self.copy.is_some()),
            ("copy_tree", self.copy_tree.is_some()),
            ("inject", self.inject.is_some()),
            ("substitute", self.substitute.is_some()),
            ("create", self.create.is_some()),
            ("run", self.run.is_some()),
            ("ask", self.ask.is_some()),
            ("ask_text", self.ask_text.is_some()),
            ("git", self.git.is_some()),
        ]
        .into_iter()
        .filter_map(|(verb, present)| present.then_some(verb))
        .collect()
    }

    fn into_action(self) -> Result<Action, String> {
        let verbs = self.verbs();
        match verbs.as_slice() {
            [_] => {}
            [] => return Err("action names no verb".into()),
            many => return Err(format!("action names several verbs: {}", many.join(", "))),
        }

        if let Some(src) = self.render {
            let dst = self.to.unwrap_or_else(|| strip_template_suffix(&src));
            return Ok(Action::RenderTemplate {
                src,
                dst,
                overwrite: self.overwrite,
            });
        }
        if let Some(src) = self.copy {
            let dst = self.to.unwrap_or_else(|| src.clone());
            return Ok(Action::CopyFile {
                src,
                dst,
                overwrite: self.overwrite,
            });
        }
        if let Some(src) = self.copy_tree {
            let dst = self.to.unwrap_or_else(|| src.clone());
            return Ok(Action::CopyTree {
                src,
                dst,
                overwrite: self.overwrite,
            });
        }
        if let Some(file) = self.inject {
            let position = match self.position.as_deref() {
                None | Some("after") => Position::After,
                Some("before") => Position::Before,
                Some(other) => return Err(format!("unknown position '{other}'")),
            };
            return Ok(Action::InjectAnchor {
                file,
                anchor: required(self.anchor, "anchor")?,
                position,
                content: required(self.content, "content")?,
            });
        }
        if let Some(file) = self.substitute {
            let pattern = required(self.pattern, "pattern")?;
            return Ok(Action::SubstitutePattern {
                file,
                pattern: if self.regex {
                    Pattern::Regex(pattern)
                } else {
                    Pattern::Literal(pattern)
                },
                replacement: required(self.replacement, "replacement")?,
                scope: if self.all { Scope::All } else { Scope::First },
            });
        }
        if let Some(path) = self.create {
            return Ok(Action::CreateEmptyFile { path });
        }
        if let Some(argv) = self.run {
            return Ok(Action::RunShellCommand {
                argv,
                workdir: self.workdir,
                policy: if self.advisory {
                    CommandPolicy::Advisory
                } else {
                    CommandPolicy::Fatal
                },
            });
        }
        if let Some(question) = self.ask {
            let default = match self.default {
                None => false,
                Some(toml::Value::Boolean(b)) => b,
                Some(other) => return Err(format!("'ask' default must be a boolean, got {other}")),
            };
            return Ok(Action::PromptYesNo {
                question,
                default,
                key: required(self.key, "key")?,
            });
        }
        if let Some(question) = self.ask_text {
            let default = match self.default {
                None => String::new(),
                Some(toml::Value::String(s)) => s,
                Some(other) => {
                    return Err(format!("'ask_text' default must be a string, got {other}"));
                }
            };
            return Ok(Action::PromptText {
                question,
                default,
                key: required(self.key, "key")?,
            });
        }
        if let Some(op) = self.git {
            let kind = match op.as_str() {
                "init" => GitOpKind::Init,
                "add_all" => GitOpKind::AddAll,
                "commit" => GitOpKind::Commit {
                    message: required(self.message, "message")?,
                },
                "add_remote" => GitOpKind::AddRemote {
                    url: required(self.url, "url")?,
                },
                "push_all" => GitOpKind::PushAll,
                other => return Err(format!("unknown git operation '{other}'")),
            };
            return Ok(Action::GitOp { kind });
        }
        Err("action names no verb".into())
    }
}

impl WhenEntry {
    fn into_precondition(self) -> Result<Precondition, String> {
        Ok(match self {
            Self::PathAbsent(path) => Precondition::PathAbsent { path },
            Self::PathPresent(path) => Precondition::PathPresent { path },
            Self::NoFilesWithExtension { dir, extension } => {
                Precondition::NoFilesWithExtension { dir, extension }
            }
            Self::Confirmed(key) => Precondition::Confirmed { key },
            Self::OptionDisabled(name) => Precondition::OptionDisabled {
                option: name.parse::<OptionName>().map_err(|e| e.to_string())?,
            },
        })
    }
}

fn required(value: Option<String>, key: &str) -> Result<String, String> {
    value.ok_or_else(|| format!("missing '{key}'"))
}

/// `Gemfile.tt` renders to `Gemfile`.
fn strip_template_suffix(src: &Path) -> PathBuf {
    match src.to_str().and_then(|s| s.strip_suffix(".tt")) {
        Some(stripped) => PathBuf::from(stripped),
        None => src.to_path_buf(),
    }
}

impl Manifest {
    fn into_plan(self, fallback_name: &str) -> Result<BootstrapPlan, String> {
        let mut plan = BootstrapPlan::new(self.plan.name.unwrap_or_else(|| fallback_name.into()));
        plan.capture_gems = self.plan.capture_gems;

        for entry in self.steps {
            let mut step = Step::new(entry.name.clone());
            if let Some(when) = entry.when {
                step = step.when(
                    when.into_precondition()
                        .map_err(|e| format!("step '{}': {e}", entry.name))?,
                );
            }
            for (i, action) in entry.actions.into_iter().enumerate() {
                let action = action
                    .into_action()
                    .map_err(|e| format!("step '{}', action {}: {e}", entry.name, i + 1))?;
                step = step.then(action);
            }
            plan = plan.step(step);
        }
        Ok(plan)
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Reads `appstrap.toml` from a template root, falling back to the
/// built-in Rails plan when the template has none.
#[derive(Debug, Clone, Default)]
pub struct ManifestPlanLoader<F = LocalFilesystem> {
    fs: F,
}

impl<F: Filesystem> ManifestPlanLoader<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Parse manifest text. `path` is only used for naming and errors.
    pub fn parse(path: &Path, text: &str) -> AppstrapResult<BootstrapPlan> {
        let plan_load = |reason: String| ApplicationError::PlanLoad {
            path: path.to_path_buf(),
            reason,
        };
        let manifest: Manifest = toml::from_str(text).map_err(|e| plan_load(e.to_string()))?;
        let fallback = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template".into());
        Ok(manifest.into_plan(&fallback).map_err(plan_load)?)
    }
}

impl<F: Filesystem> PlanSource for ManifestPlanLoader<F> {
    #[instrument(skip(self), fields(root = %source_root.display()))]
    fn load(&self, source_root: &Path) -> AppstrapResult<BootstrapPlan> {
        let path = source_root.join(MANIFEST_FILE);
        if !self.fs.exists(&path) {
            debug!("No {MANIFEST_FILE}, using the built-in plan");
            return Ok(builtin_plan::rails_plan());
        }
        let text = self.fs.read_to_string(&path)?;
        let plan = Self::parse(&path, &text)?;
        info!(plan = %plan.name, steps = plan.steps.len(), "Loaded plan manifest");
        Ok(plan)
    }
}
