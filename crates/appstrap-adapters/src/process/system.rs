//! Command runner backed by `std::process::Command`.

use std::process::{Command, ExitStatus, Stdio};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use appstrap_core::{
    application::{
        ApplicationError,
        ports::{CommandOutput, CommandRunner, CommandSpec, CommandStatus},
    },
    error::{AppstrapError, AppstrapResult},
};
use tracing::{debug, instrument, warn};

/// Spawns real processes on the host.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner {
    interrupted: Option<Arc<AtomicBool>>,
}

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `flag`, set by a signal handler. Once it is up, no further
    /// command starts and the one in flight is reported as cancelled, so
    /// the run unwinds through the normal error path.
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(flag);
        self
    }

    fn ensure_not_interrupted(&self, spec: &CommandSpec) -> AppstrapResult<()> {
        match &self.interrupted {
            Some(flag) if flag.load(Ordering::SeqCst) => {
                warn!(command = %spec, "Interrupted");
                Err(ApplicationError::Cancelled {
                    reason: format!("interrupted while running `{spec}`"),
                }
                .into())
            }
            _ => Ok(()),
        }
    }

    fn command(spec: &CommandSpec) -> AppstrapResult<Command> {
        let program = spec.program().ok_or_else(|| ApplicationError::CommandFailed {
            command: String::new(),
            code: None,
            reason: "empty command".into(),
        })?;
        let mut cmd = Command::new(program);
        cmd.args(spec.args()).current_dir(&spec.workdir);
        Ok(cmd)
    }
}

impl CommandRunner for SystemCommandRunner {
    #[instrument(skip_all, fields(command = %spec, workdir = %spec.workdir.display()))]
    fn run(&self, spec: &CommandSpec) -> AppstrapResult<CommandStatus> {
        self.ensure_not_interrupted(spec)?;
        let status = Self::command(spec)?
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| spawn_error(spec, e))?;
        debug!(code = ?status.code(), "Command finished");
        self.ensure_not_interrupted(spec)?;
        Ok(to_status(status))
    }

    #[instrument(skip_all, fields(command = %spec))]
    fn probe(&self, spec: &CommandSpec) -> AppstrapResult<CommandOutput> {
        self.ensure_not_interrupted(spec)?;
        let output = Self::command(spec)?
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(spec, e))?;
        self.ensure_not_interrupted(spec)?;
        Ok(CommandOutput {
            status: to_status(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

fn to_status(status: ExitStatus) -> CommandStatus {
    CommandStatus {
        code: status.code(),
    }
}

fn spawn_error(spec: &CommandSpec, e: std::io::Error) -> AppstrapError {
    ApplicationError::CommandFailed {
        command: spec.to_string(),
        code: None,
        reason: format!("could not start: {e}"),
    }
    .into()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn probe_captures_stdout() {
        let tmp = TempDir::new().unwrap();
        let spec = CommandSpec::new(["echo", "Rails 6.0.3"], tmp.path());
        let out = SystemCommandRunner::new().probe(&spec).unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout.trim(), "Rails 6.0.3");
    }

    #[test]
    fn non_zero_exit_is_a_status_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let spec = CommandSpec::new(["sh", "-c", "exit 3"], tmp.path());
        let status = SystemCommandRunner::new().run(&spec).unwrap();
        assert_eq!(status, CommandStatus::from_code(3));
    }

    #[test]
    fn runs_in_the_given_directory() {
        let tmp = TempDir::new().unwrap();
        let spec = CommandSpec::new(["sh", "-c", "touch marker"], tmp.path());
        SystemCommandRunner::new().run(&spec).unwrap();
        assert!(tmp.path().join("marker").exists());
    }

    #[test]
    fn missing_program_is_a_command_failure() {
        let tmp = TempDir::new().unwrap();
        let spec = CommandSpec::new(["appstrap-definitely-not-installed"], tmp.path());
        let err = SystemCommandRunner::new().run(&spec).unwrap_err();
        assert!(matches!(
            err,
            AppstrapError::Application(ApplicationError::CommandFailed { code: None, .. })
        ));
    }

    #[test]
    fn raised_interrupt_flag_stops_new_commands() {
        let tmp = TempDir::new().unwrap();
        let flag = Arc::new(AtomicBool::new(false));
        let runner = SystemCommandRunner::new().with_interrupt_flag(Arc::clone(&flag));

        let touch = CommandSpec::new(["sh", "-c", "touch first"], tmp.path());
        assert!(runner.run(&touch).unwrap().success());

        flag.store(true, Ordering::SeqCst);
        let second = CommandSpec::new(["sh", "-c", "touch second"], tmp.path());
        let err = runner.run(&second).unwrap_err();
        assert!(matches!(
            err,
            AppstrapError::Application(ApplicationError::Cancelled { .. })
        ));
        assert!(!tmp.path().join("second").exists());
    }

    #[test]
    fn interrupt_during_a_command_cancels_it() {
        let tmp = TempDir::new().unwrap();
        let flag = Arc::new(AtomicBool::new(false));
        let runner = SystemCommandRunner::new().with_interrupt_flag(Arc::clone(&flag));
        let raiser = {
            let flag = Arc::clone(&flag);
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(100));
                flag.store(true, Ordering::SeqCst);
            })
        };

        let spec = CommandSpec::new(["sleep", "1"], tmp.path());
        let err = runner.run(&spec).unwrap_err();
        raiser.join().unwrap();
        assert!(err.to_string().contains("interrupted"));
    }

    #[test]
    fn empty_argv_is_rejected() {
        let spec = CommandSpec::new(Vec::<String>::new(), ".");
        assert!(SystemCommandRunner::new().probe(&spec).is_err());
    }
}
