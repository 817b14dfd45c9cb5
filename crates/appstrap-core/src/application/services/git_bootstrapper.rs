//! Git repository bootstrap.
//!
//! Runs once after all steps: initialize if needed, make the first commit
//! if there is none, and optionally wire up and push to `origin`.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandRunner, CommandSpec, Filesystem, Prompter},
    },
    domain::{GitOpKind, RemoteUrl, RepoState, RunContext, needs_remote, plan_git},
    error::AppstrapResult,
};

pub const REMOTE_QUESTION: &str = "What is the git remote URL for this project?";

/// What the bootstrapper found and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitReport {
    #[serde(serialize_with = "serialize_display")]
    pub initial_state: RepoState,
    pub operations: Vec<GitOpKind>,
    pub remote: Option<String>,
}

fn serialize_display<S: serde::Serializer>(state: &RepoState, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(state)
}

pub struct GitBootstrapper<'a> {
    fs: &'a dyn Filesystem,
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
}

impl<'a> GitBootstrapper<'a> {
    pub fn new(
        fs: &'a dyn Filesystem,
        runner: &'a dyn CommandRunner,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            fs,
            runner,
            prompter,
        }
    }

    pub fn detect_state(&self, root: &Path) -> RepoState {
        let git_dir = self.fs.exists(&root.join(".git"));
        let has_commits = git_dir && self.has_commits(root);
        RepoState::detect(git_dir, has_commits)
    }

    /// `git log -1` printed something. Any failure counts as "no commits".
    fn has_commits(&self, root: &Path) -> bool {
        let spec = CommandSpec::new(["git", "log", "-1", "--oneline"], root);
        match self.runner.probe(&spec) {
            Ok(out) => out.status.success() && !out.stdout.trim().is_empty(),
            Err(e) => {
                debug!(error = %e, "git log probe failed");
                false
            }
        }
    }

    /// The remote for this run, asking at most once.
    pub fn remote(&self, run: &mut RunContext) -> AppstrapResult<RemoteUrl> {
        if let Some(remote) = run.remote() {
            return Ok(remote.clone());
        }
        let answer = self.prompter.ask_text(REMOTE_QUESTION, "skip")?;
        let remote = RemoteUrl::parse(&answer);
        run.set_remote(remote.clone());
        Ok(remote)
    }

    pub fn bootstrap(&self, run: &mut RunContext, commit_message: &str) -> AppstrapResult<GitReport> {
        let root = run.target_root.clone();
        let state = self.detect_state(&root);
        info!(state = %state, "Bootstrapping git repository");

        let remote = if needs_remote(state) {
            self.remote(run)?
        } else {
            RemoteUrl::Skip
        };

        let operations = plan_git(state, commit_message, &remote);
        for op in &operations {
            self.run_op(op, &root)?;
        }

        Ok(GitReport {
            initial_state: state,
            operations,
            remote: remote.as_url().map(str::to_string),
        })
    }

    pub fn run_op(&self, op: &GitOpKind, root: &Path) -> AppstrapResult<()> {
        let spec = CommandSpec::new(op.argv(), root);
        info!(command = %spec, "Running git");
        let status = self.runner.run(&spec)?;
        if status.success() {
            Ok(())
        } else {
            Err(ApplicationError::exited(spec.to_string(), status.code).into())
        }
    }
}
