//! Prompt adapters.

mod scripted;
mod terminal;

pub use scripted::{ScriptedAnswer, ScriptedPrompter};
pub use terminal::{TerminalPrompter, format_question};
