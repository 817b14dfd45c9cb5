//! Toolchain version gate.

use std::path::Path;

use semver::Version;
use tracing::{debug, warn};

use crate::{
    application::ports::{CommandRunner, CommandSpec, Prompter},
    domain::{DomainError, GateOutcome, ToolRequirement, check_version, parse_detected_version},
    error::AppstrapResult,
};

/// Detects the host toolchain version and enforces a requirement.
pub struct VersionGate<'a> {
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
}

impl<'a> VersionGate<'a> {
    pub fn new(runner: &'a dyn CommandRunner, prompter: &'a dyn Prompter) -> Self {
        Self { runner, prompter }
    }

    /// Ask the tool for its version. Any failure yields `None`.
    pub fn detect(&self, tool: &ToolRequirement, workdir: &Path) -> Option<Version> {
        let spec = CommandSpec::new(tool.command.iter().cloned(), workdir);
        match self.runner.probe(&spec) {
            Ok(output) if output.status.success() => match parse_detected_version(&output.stdout) {
                Ok(version) => Some(version),
                Err(e) => {
                    debug!(command = %spec, error = %e, "Unrecognized version output");
                    None
                }
            },
            Ok(output) => {
                debug!(command = %spec, code = ?output.status.code, "Version probe failed");
                None
            }
            Err(e) => {
                debug!(command = %spec, error = %e, "Version probe could not start");
                None
            }
        }
    }

    /// Proceed when satisfied; otherwise ask (interactive) or fail.
    ///
    /// The confirmation defaults to "no".
    pub fn enforce(&self, tool: &ToolRequirement, detected: Option<&Version>) -> AppstrapResult<()> {
        let detected = match check_version(&tool.requirement, detected) {
            GateOutcome::Proceed => return Ok(()),
            GateOutcome::Unsatisfied { detected } => detected,
        };

        let err = DomainError::VersionIncompatible {
            tool: tool.name.clone(),
            requirement: tool.requirement.to_string(),
            detected,
        };

        if !self.prompter.is_interactive() {
            return Err(err.into());
        }

        let question = format!("{err} Continue anyway?");
        if self.prompter.ask_yes_no(&question, false)? {
            warn!(%err, "Continuing with an unsupported toolchain version");
            Ok(())
        } else {
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{CommandOutput, CommandStatus, MockCommandRunner, MockPrompter};
    use crate::domain::VersionRequirement;
    use crate::error::AppstrapError;
    use mockall::predicate::*;

    fn rails() -> ToolRequirement {
        ToolRequirement::new(
            "Rails",
            vec!["rails".into(), "--version".into()],
            VersionRequirement::pessimistic(6, 0, 0),
        )
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn detect_parses_probe_output() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_probe()
            .withf(|spec| spec.argv == ["rails", "--version"])
            .returning(|_| {
                Ok(CommandOutput {
                    status: CommandStatus::SUCCESS,
                    stdout: "Rails 6.0.3.4\n".into(),
                })
            });
        let prompter = MockPrompter::new();
        let gate = VersionGate::new(&runner, &prompter);
        assert_eq!(gate.detect(&rails(), Path::new(".")), Some(v("6.0.3")));
    }

    #[test]
    fn detect_treats_failed_probe_as_unknown() {
        let mut runner = MockCommandRunner::new();
        runner.expect_probe().returning(|_| {
            Ok(CommandOutput {
                status: CommandStatus::from_code(127),
                stdout: String::new(),
            })
        });
        let prompter = MockPrompter::new();
        let gate = VersionGate::new(&runner, &prompter);
        assert_eq!(gate.detect(&rails(), Path::new(".")), None);
    }

    #[test]
    fn satisfied_requirement_never_prompts() {
        let runner = MockCommandRunner::new();
        let mut prompter = MockPrompter::new();
        prompter.expect_ask_yes_no().never();
        let gate = VersionGate::new(&runner, &prompter);
        assert!(gate.enforce(&rails(), Some(&v("6.0.3"))).is_ok());
    }

    #[test]
    fn non_interactive_mismatch_is_fatal() {
        let runner = MockCommandRunner::new();
        let mut prompter = MockPrompter::new();
        prompter.expect_is_interactive().return_const(false);
        prompter.expect_ask_yes_no().never();
        let gate = VersionGate::new(&runner, &prompter);

        let err = gate.enforce(&rails(), Some(&v("5.2.4"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "This template requires Rails ~> 6.0.0. You are using 5.2.4."
        );
    }

    #[test]
    fn interactive_confirmation_proceeds() {
        let runner = MockCommandRunner::new();
        let mut prompter = MockPrompter::new();
        prompter.expect_is_interactive().return_const(true);
        prompter
            .expect_ask_yes_no()
            .with(
                eq("This template requires Rails ~> 6.0.0. You are using 6.1.0. Continue anyway?"),
                eq(false),
            )
            .times(1)
            .returning(|_, _| Ok(true));
        let gate = VersionGate::new(&runner, &prompter);
        assert!(gate.enforce(&rails(), Some(&v("6.1.0"))).is_ok());
    }

    #[test]
    fn interactive_decline_is_fatal() {
        let runner = MockCommandRunner::new();
        let mut prompter = MockPrompter::new();
        prompter.expect_is_interactive().return_const(true);
        prompter.expect_ask_yes_no().returning(|_, default| Ok(default));
        let gate = VersionGate::new(&runner, &prompter);
        let err = gate.enforce(&rails(), None).unwrap_err();
        assert!(matches!(
            err,
            AppstrapError::Domain(DomainError::VersionIncompatible { ref detected, .. }) if detected == "unknown"
        ));
    }
}
