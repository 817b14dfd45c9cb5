//! Scriptable command runner for tests and dry runs.

use std::sync::{Arc, Mutex};

use appstrap_core::{
    application::ports::{CommandOutput, CommandRunner, CommandSpec, CommandStatus},
    error::AppstrapResult,
};

/// Records every command instead of spawning it.
///
/// Probes answer from canned responses matched by argv prefix; unknown
/// probes exit with status 1. `run` succeeds unless the command line
/// starts with one of the configured failing prefixes. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    probes: Vec<(String, CommandOutput)>,
    failing: Vec<String>,
    log: Vec<CommandSpec>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer probes whose command line starts with `prefix`.
    pub fn with_probe(self, prefix: &str, stdout: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.probes.push((
                prefix.to_string(),
                CommandOutput {
                    status: CommandStatus::SUCCESS,
                    stdout: stdout.to_string(),
                },
            ));
        }
        self
    }

    /// Make `run` exit 1 for command lines starting with `prefix`.
    pub fn failing(self, prefix: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.failing.push(prefix.to_string());
        }
        self
    }

    /// Command lines passed to `run`, in order. Probes are not recorded.
    pub fn commands(&self) -> Vec<String> {
        self.specs().iter().map(ToString::to_string).collect()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.state
            .lock()
            .map(|state| state.log.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> AppstrapResult<CommandStatus> {
        let line = spec.to_string();
        let Ok(mut state) = self.state.lock() else {
            return Ok(CommandStatus::from_code(1));
        };
        state.log.push(spec.clone());
        if state.failing.iter().any(|prefix| line.starts_with(prefix.as_str())) {
            Ok(CommandStatus::from_code(1))
        } else {
            Ok(CommandStatus::SUCCESS)
        }
    }

    fn probe(&self, spec: &CommandSpec) -> AppstrapResult<CommandOutput> {
        let line = spec.to_string();
        let canned = self.state.lock().ok().and_then(|state| {
            state
                .probes
                .iter()
                .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                .map(|(_, out)| out.clone())
        });
        Ok(canned.unwrap_or(CommandOutput {
            status: CommandStatus::from_code(1),
            stdout: String::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_runs_and_fails_matching_prefixes() {
        let runner = RecordingRunner::new().failing("bundle exec rubocop");
        let ok = runner
            .run(&CommandSpec::new(["bundle", "install"], "/app"))
            .unwrap();
        let failed = runner
            .run(&CommandSpec::new(["bundle", "exec", "rubocop", "-a"], "/app"))
            .unwrap();

        assert!(ok.success());
        assert_eq!(failed.code, Some(1));
        assert_eq!(runner.commands(), ["bundle install", "bundle exec rubocop -a"]);
    }

    #[test]
    fn probes_answer_from_canned_output() {
        let runner = RecordingRunner::new().with_probe("rails --version", "Rails 6.0.3\n");
        let out = runner
            .probe(&CommandSpec::new(["rails", "--version"], "."))
            .unwrap();
        assert_eq!(out.stdout, "Rails 6.0.3\n");

        let unknown = runner.probe(&CommandSpec::new(["git", "log"], ".")).unwrap();
        assert!(!unknown.status.success());
        assert!(runner.commands().is_empty());
    }
}
