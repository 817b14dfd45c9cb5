//! Terminal prompter built on dialoguer.

use std::io::IsTerminal;

use appstrap_core::{
    application::{ApplicationError, ports::Prompter},
    error::AppstrapResult,
};
use dialoguer::{Confirm, Input};
use tracing::debug;

/// Asks on the controlling terminal.
///
/// When stdin is not a terminal, or interaction is switched off, every
/// question returns its default immediately.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    interactive: bool,
}

impl TerminalPrompter {
    pub fn new(force_non_interactive: bool) -> Self {
        Self {
            interactive: !force_non_interactive && std::io::stdin().is_terminal(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Prompter for TerminalPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn ask_yes_no(&self, question: &str, default: bool) -> AppstrapResult<bool> {
        if !self.interactive {
            debug!(question, default, "Non-interactive, using default");
            return Ok(default);
        }
        Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(|e| prompt_failed(question, e))
    }

    fn ask_text(&self, question: &str, default: &str) -> AppstrapResult<String> {
        if !self.interactive {
            debug!(question, default, "Non-interactive, using default");
            return Ok(default.to_string());
        }
        let answer: String = Input::new()
            .with_prompt(format_question(question, default))
            .default(default.to_string())
            .show_default(false)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| prompt_failed(question, e))?;

        let answer = answer.trim();
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer.to_string())
        }
    }
}

fn prompt_failed(question: &str, e: dialoguer::Error) -> appstrap_core::error::AppstrapError {
    match e {
        dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
            ApplicationError::Cancelled {
                reason: format!("interrupted at '{question}'"),
            }
        }
        other => ApplicationError::PromptFailed {
            question: question.to_string(),
            reason: other.to_string(),
        },
    }
    .into()
}

/// Show the default in brackets ahead of a trailing question mark.
///
/// `"Remote URL?"` with default `skip` becomes `"Remote URL [skip]?"`.
pub fn format_question(question: &str, default: &str) -> String {
    if default.is_empty() {
        return question.to_string();
    }
    match question.strip_suffix('?') {
        Some(stem) => format!("{stem} [{default}]?"),
        None => format!("{question} [{default}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_goes_before_question_mark() {
        assert_eq!(
            format_question("What is the git remote URL for this project?", "skip"),
            "What is the git remote URL for this project [skip]?"
        );
    }

    #[test]
    fn default_is_appended_without_question_mark() {
        assert_eq!(format_question("Locale", "en"), "Locale [en]");
        assert_eq!(format_question("Locale?", ""), "Locale?");
    }

    #[test]
    fn interrupted_prompt_is_a_cancellation() {
        let err = prompt_failed(
            "Add authentication?",
            dialoguer::Error::IO(std::io::Error::from(std::io::ErrorKind::Interrupted)),
        );
        assert!(matches!(
            err,
            appstrap_core::error::AppstrapError::Application(ApplicationError::Cancelled { .. })
        ));
    }

    #[test]
    fn forced_non_interactive_returns_defaults() {
        let prompter = TerminalPrompter::new(true);
        assert!(!prompter.is_interactive());
        assert!(prompter.ask_yes_no("Add authentication?", true).unwrap());
        assert!(!prompter.ask_yes_no("Add Bootstrap?", false).unwrap());
        assert_eq!(prompter.ask_text("Remote?", "skip").unwrap(), "skip");
    }
}
