//! Orchestrator - the bootstrap use case.
//!
//! Owns the fixed order of a run:
//! 1. Validate generator options
//! 2. Enforce the toolchain version gate
//! 3. Resolve the template source
//! 4. Load and validate the plan
//! 5. Capture upstream gem requirements
//! 6. Run every step in order
//! 7. Bootstrap the git repository
//!
//! Nothing in the target is touched before step 6, so gate failures are
//! always safe to re-run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, info_span, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{
            CommandRunner, CommandSpec, Filesystem, PlanSource, Prompter, SourceResolver,
            TemplateRenderer,
        },
        services::{
            git_bootstrapper::{GitBootstrapper, GitReport},
            transformer::{ContentTransformer, TransformOutcome},
            version_gate::VersionGate,
        },
    },
    domain::{
        Action, AnchorLocator, BootstrapPlan, CommandPolicy, GeneratorOptions, LiteralAnchor,
        OptionName, Precondition, RemoteUrl, RunContext, Step, ToolRequirement,
        VersionRequirement, gem_requirement, parse_detected_version, requirement_variable,
        validate_options,
    },
    error::{AppstrapError, AppstrapResult},
};

/// Gate inputs and run-wide settings that come from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPolicy {
    pub tool: ToolRequirement,
    pub expected_options: GeneratorOptions,
    pub commit_message: String,
}

impl Default for BootstrapPolicy {
    fn default() -> Self {
        Self {
            tool: ToolRequirement::new(
                "Rails",
                vec!["rails".into(), "--version".into()],
                VersionRequirement::pessimistic(6, 0, 0),
            ),
            expected_options: GeneratorOptions::supported(),
            commit_message: "Project setup".into(),
        }
    }
}

/// One invocation of `appstrap new`.
#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    pub app_name: String,
    pub target_root: PathBuf,
    pub template_origin: String,
    pub options: GeneratorOptions,
    pub locale: String,
    /// Pre-answered remote; `None` means ask.
    pub remote: Option<String>,
    /// Overrides version detection.
    pub toolchain_version: Option<String>,
    pub dry_run: bool,
}

impl BootstrapRequest {
    pub fn new(
        app_name: impl Into<String>,
        target_root: impl Into<PathBuf>,
        template_origin: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            target_root: target_root.into(),
            template_origin: template_origin.into(),
            options: GeneratorOptions::default(),
            locale: "en".into(),
            remote: None,
            toolchain_version: None,
            dry_run: false,
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    pub fn with_toolchain_version(mut self, version: impl Into<String>) -> Self {
        self.toolchain_version = Some(version.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Result of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum ActionOutcome {
    Transformed(TransformOutcome),
    Ran,
    /// An advisory command failed; the run continued.
    Failed(String),
    Answered(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub action: String,
    #[serde(flatten)]
    pub outcome: ActionOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub name: String,
    /// The precondition that did not hold, when the step was skipped.
    pub skipped: Option<String>,
    pub actions: Vec<ActionRecord>,
}

impl StepReport {
    pub fn was_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub run_id: Uuid,
    pub app_name: String,
    pub target_root: PathBuf,
    pub source: String,
    pub dry_run: bool,
    pub plan: BootstrapPlan,
    pub steps: Vec<StepReport>,
    pub git: Option<GitReport>,
}

impl BootstrapReport {
    pub fn success_message(&self) -> String {
        format!("Your app {} has been successfully created!", self.app_name)
    }

    pub fn applied_steps(&self) -> usize {
        self.steps.iter().filter(|s| !s.was_skipped()).count()
    }

    pub fn advisory_failures(&self) -> impl Iterator<Item = &ActionRecord> {
        self.steps
            .iter()
            .flat_map(|s| &s.actions)
            .filter(|a| matches!(a.outcome, ActionOutcome::Failed(_)))
    }
}

/// The bootstrap use case.
pub struct Orchestrator {
    fs: Box<dyn Filesystem>,
    runner: Box<dyn CommandRunner>,
    prompter: Box<dyn Prompter>,
    resolver: Box<dyn SourceResolver>,
    plans: Box<dyn PlanSource>,
    renderer: Box<dyn TemplateRenderer>,
    locator: Box<dyn AnchorLocator>,
    policy: BootstrapPolicy,
}

impl Orchestrator {
    pub fn new(
        fs: Box<dyn Filesystem>,
        runner: Box<dyn CommandRunner>,
        prompter: Box<dyn Prompter>,
        resolver: Box<dyn SourceResolver>,
        plans: Box<dyn PlanSource>,
        renderer: Box<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            fs,
            runner,
            prompter,
            resolver,
            plans,
            renderer,
            locator: Box::new(LiteralAnchor),
            policy: BootstrapPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BootstrapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_locator(mut self, locator: Box<dyn AnchorLocator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn policy(&self) -> &BootstrapPolicy {
        &self.policy
    }

    /// Resolve a template source and load its plan without running it.
    pub fn preview(&self, origin: &str) -> AppstrapResult<BootstrapPlan> {
        let source = self.resolver.resolve(origin)?;
        let plan = self.plans.load(source.root())?;
        plan.validate()?;
        Ok(plan)
    }

    #[instrument(
        skip_all,
        fields(
            app = %request.app_name,
            target = %request.target_root.display(),
            template = %request.template_origin
        )
    )]
    pub fn bootstrap(&self, request: BootstrapRequest) -> AppstrapResult<BootstrapReport> {
        validate_options(&self.policy.expected_options, &request.options)?;

        self.enforce_version(&request)?;

        let source = self.resolver.resolve(&request.template_origin)?;
        info!(root = %source.root().display(), temporary = source.is_temporary(), "Template source resolved");

        let plan = self.plans.load(source.root())?;
        plan.validate()?;
        info!(plan = %plan.name, steps = plan.steps.len(), "Plan loaded");

        let mut run = RunContext::new(&request.app_name, &request.target_root, request.options)
            .with_locale(&request.locale)
            .with_interactive(self.prompter.is_interactive());
        if let Some(remote) = &request.remote {
            run.set_remote(RemoteUrl::parse(remote));
        }

        let mut report = BootstrapReport {
            run_id: run.run_id,
            app_name: request.app_name.clone(),
            target_root: request.target_root.clone(),
            source: source.origin().to_string(),
            dry_run: request.dry_run,
            plan,
            steps: Vec::new(),
            git: None,
        };

        if request.dry_run {
            info!("Dry run, nothing applied");
            return Ok(report);
        }

        self.fs.create_dir_all(&run.target_root)?;
        self.capture_gems(&report.plan.capture_gems, &mut run)?;

        let transformer = ContentTransformer::new(
            self.fs.as_ref(),
            self.renderer.as_ref(),
            self.locator.as_ref(),
            source.root(),
            &request.target_root,
        );

        for step in &report.plan.steps {
            let step_report = self.run_step(step, &mut run, &transformer)?;
            report.steps.push(step_report);
        }

        if run.options.is_enabled(OptionName::SkipGit) {
            info!("Skipping git bootstrap");
        } else {
            let git = GitBootstrapper::new(self.fs.as_ref(), self.runner.as_ref(), self.prompter.as_ref());
            report.git = Some(git.bootstrap(&mut run, &self.policy.commit_message)?);
        }

        info!(run_id = %run.run_id, "Bootstrap complete");
        Ok(report)
    }

    fn enforce_version(&self, request: &BootstrapRequest) -> AppstrapResult<()> {
        let gate = VersionGate::new(self.runner.as_ref(), self.prompter.as_ref());
        let detected = match &request.toolchain_version {
            Some(explicit) => Some(parse_detected_version(explicit)?),
            None => {
                let workdir = if self.fs.is_dir(&request.target_root) {
                    request.target_root.as_path()
                } else {
                    Path::new(".")
                };
                gate.detect(&self.policy.tool, workdir)
            }
        };
        debug!(detected = ?detected, requirement = %self.policy.tool.requirement, "Checking toolchain version");
        gate.enforce(&self.policy.tool, detected.as_ref())
    }

    /// Read the upstream Gemfile once, before any step rewrites it.
    fn capture_gems(&self, gems: &[String], run: &mut RunContext) -> AppstrapResult<()> {
        if gems.is_empty() {
            return Ok(());
        }
        let gemfile = run.target_path(Path::new("Gemfile"));
        let content = if self.fs.exists(&gemfile) {
            self.fs.read_to_string(&gemfile)?
        } else {
            String::new()
        };
        for gem in gems {
            let requirement = gem_requirement(&content, gem).unwrap_or_default();
            debug!(gem = %gem, requirement = %requirement, "Captured gem requirement");
            run.set_variable(requirement_variable(gem), requirement);
        }
        Ok(())
    }

    fn run_step(
        &self,
        step: &Step,
        run: &mut RunContext,
        transformer: &ContentTransformer<'_>,
    ) -> AppstrapResult<StepReport> {
        let span = info_span!("step", step = %step.name);
        let _enter = span.enter();

        if let Some(precondition) = &step.precondition {
            if !self.precondition_holds(precondition, run)? {
                info!(reason = %precondition, "Skipping step");
                return Ok(StepReport {
                    name: step.name.clone(),
                    skipped: Some(precondition.to_string()),
                    actions: Vec::new(),
                });
            }
        }

        info!("Applying step");
        let mut actions = Vec::with_capacity(step.actions.len());
        for action in &step.actions {
            debug!(%action, "Applying action");
            let outcome = self.apply(action, run, transformer)?;
            actions.push(ActionRecord {
                action: action.to_string(),
                outcome,
            });
        }

        Ok(StepReport {
            name: step.name.clone(),
            skipped: None,
            actions,
        })
    }

    fn precondition_holds(&self, precondition: &Precondition, run: &RunContext) -> AppstrapResult<bool> {
        Ok(match precondition {
            Precondition::PathAbsent { path } => !self.fs.exists(&run.target_path(path)),
            Precondition::PathPresent { path } => self.fs.exists(&run.target_path(path)),
            Precondition::NoFilesWithExtension { dir, extension } => self
                .fs
                .list_files(&run.target_path(dir))?
                .iter()
                .all(|file| file.extension().and_then(|e| e.to_str()) != Some(extension.as_str())),
            Precondition::Confirmed { key } => run.is_confirmed(key),
            Precondition::OptionDisabled { option } => !run.options.is_enabled(*option),
        })
    }

    fn apply(
        &self,
        action: &Action,
        run: &mut RunContext,
        transformer: &ContentTransformer<'_>,
    ) -> AppstrapResult<ActionOutcome> {
        let ctx = run.render_context();
        let outcome = match action {
            Action::RenderTemplate {
                src,
                dst,
                overwrite,
            } => transformer.render_template(src, dst, *overwrite, &ctx)?,
            Action::CopyFile {
                src,
                dst,
                overwrite,
            } => transformer.copy_file(src, dst, *overwrite)?,
            Action::CopyTree {
                src,
                dst,
                overwrite,
            } => transformer.copy_tree(src, dst, *overwrite)?,
            Action::InjectAnchor {
                file,
                anchor,
                position,
                content,
            } => transformer.inject_anchor(file, anchor, *position, &ctx.render(content))?,
            Action::SubstitutePattern {
                file,
                pattern,
                replacement,
                scope,
            } => transformer.substitute_pattern(file, pattern, &ctx.render(replacement), *scope)?,
            Action::CreateEmptyFile { path } => transformer.create_empty_file(path)?,
            Action::RunShellCommand {
                argv,
                workdir,
                policy,
            } => {
                let argv = argv.iter().map(|arg| ctx.render(arg));
                let dir = match workdir {
                    Some(dir) => run.target_path(dir),
                    None => run.target_root.clone(),
                };
                return self.run_command(&CommandSpec::new(argv, dir), *policy);
            }
            Action::PromptYesNo {
                question,
                default,
                key,
            } => {
                let answer = self.prompter.ask_yes_no(question, *default)?;
                run.record_confirmation(key, answer);
                return Ok(ActionOutcome::Answered(if answer { "yes" } else { "no" }.into()));
            }
            Action::PromptText {
                question,
                default,
                key,
            } => {
                let answer = self.prompter.ask_text(question, default)?;
                run.record_answer(key, &answer);
                return Ok(ActionOutcome::Answered(answer));
            }
            Action::GitOp { kind } => {
                let git = GitBootstrapper::new(self.fs.as_ref(), self.runner.as_ref(), self.prompter.as_ref());
                git.run_op(kind, &run.target_root)?;
                return Ok(ActionOutcome::Ran);
            }
        };
        Ok(ActionOutcome::Transformed(outcome))
    }

    fn run_command(&self, spec: &CommandSpec, policy: CommandPolicy) -> AppstrapResult<ActionOutcome> {
        info!(command = %spec, "Running command");
        let failure = match self.runner.run(spec) {
            Ok(status) if status.success() => return Ok(ActionOutcome::Ran),
            Ok(status) => ApplicationError::exited(spec.to_string(), status.code),
            Err(cancelled @ AppstrapError::Application(ApplicationError::Cancelled { .. })) => {
                return Err(cancelled);
            }
            Err(AppstrapError::Application(e)) => e,
            Err(other) => return Err(other),
        };

        match policy {
            CommandPolicy::Fatal => Err(failure.into()),
            CommandPolicy::Advisory => {
                warn!(command = %spec, error = %failure, "Advisory command failed, continuing");
                Ok(ActionOutcome::Failed(failure.to_string()))
            }
        }
    }
}
