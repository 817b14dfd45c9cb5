//! Prompter that replays canned answers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use appstrap_core::{application::ports::Prompter, error::AppstrapResult};

/// One canned reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    Yes,
    No,
    Text(String),
    /// Take whatever default the question offers.
    Default,
}

/// Answers questions from a queue, in order. An exhausted queue answers
/// with defaults. Clones share the queue and the question log.
#[derive(Debug, Clone)]
pub struct ScriptedPrompter {
    interactive: bool,
    state: Arc<Mutex<ScriptState>>,
}

#[derive(Debug, Default)]
struct ScriptState {
    answers: VecDeque<ScriptedAnswer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I>(answers: I) -> Self
    where
        I: IntoIterator<Item = ScriptedAnswer>,
    {
        Self {
            interactive: true,
            state: Arc::new(Mutex::new(ScriptState {
                answers: answers.into_iter().collect(),
                asked: Vec::new(),
            })),
        }
    }

    /// A prompter that reports itself non-interactive and always
    /// answers with the default.
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            ..Self::new([])
        }
    }

    /// Questions asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.asked.clone())
            .unwrap_or_default()
    }

    fn next(&self, question: &str) -> ScriptedAnswer {
        let Ok(mut state) = self.state.lock() else {
            return ScriptedAnswer::Default;
        };
        state.asked.push(question.to_string());
        if !self.interactive {
            return ScriptedAnswer::Default;
        }
        state.answers.pop_front().unwrap_or(ScriptedAnswer::Default)
    }
}

impl Prompter for ScriptedPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn ask_yes_no(&self, question: &str, default: bool) -> AppstrapResult<bool> {
        Ok(match self.next(question) {
            ScriptedAnswer::Yes => true,
            ScriptedAnswer::No => false,
            ScriptedAnswer::Text(text) => matches!(text.trim(), "y" | "Y" | "yes" | "Yes"),
            ScriptedAnswer::Default => default,
        })
    }

    fn ask_text(&self, question: &str, default: &str) -> AppstrapResult<String> {
        Ok(match self.next(question) {
            ScriptedAnswer::Text(text) if !text.trim().is_empty() => text.trim().to_string(),
            ScriptedAnswer::Yes => "yes".to_string(),
            ScriptedAnswer::No => "no".to_string(),
            _ => default.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_answers_in_order_then_defaults() {
        let prompter = ScriptedPrompter::new([
            ScriptedAnswer::Yes,
            ScriptedAnswer::Text("git@github.com:acme/blog.git".into()),
        ]);
        assert!(prompter.ask_yes_no("Authentication?", false).unwrap());
        assert_eq!(
            prompter.ask_text("Remote?", "skip").unwrap(),
            "git@github.com:acme/blog.git"
        );
        assert!(!prompter.ask_yes_no("Bootstrap?", false).unwrap());
        assert_eq!(prompter.asked(), ["Authentication?", "Remote?", "Bootstrap?"]);
    }

    #[test]
    fn blank_text_falls_back_to_default() {
        let prompter = ScriptedPrompter::new([ScriptedAnswer::Text("  ".into())]);
        assert_eq!(prompter.ask_text("Remote?", "skip").unwrap(), "skip");
    }

    #[test]
    fn non_interactive_ignores_the_script() {
        let prompter = ScriptedPrompter::non_interactive();
        assert!(!prompter.is_interactive());
        assert!(prompter.ask_yes_no("Proceed?", true).unwrap());
        assert_eq!(prompter.asked(), ["Proceed?"]);
    }
}
