//! Terminal output for command results.
//!
//! Everything here goes to stdout. Diagnostics go through `tracing` to
//! stderr, so `plan --format json` and `config show` stay pipeable.

use std::io;

use console::Term;
use owo_colors::OwoColorize;

use crate::cli::GlobalArgs;
use crate::config::AppConfig;

/// Kind of status line, each with its own glyph and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Success,
    Warning,
    Info,
}

impl Tone {
    fn glyph(self) -> &'static str {
        match self {
            Tone::Success => "\u{2713}",
            Tone::Warning => "\u{26a0}",
            Tone::Info => "\u{2139}",
        }
    }

    fn paint(self, glyph: &str, msg: &str) -> String {
        match self {
            Tone::Success => format!("{} {}", glyph.green().bold(), msg.green()),
            Tone::Warning => format!("{} {}", glyph.yellow().bold(), msg.yellow()),
            Tone::Info => format!("{} {}", glyph.blue().bold(), msg),
        }
    }
}

/// Writes report lines, honouring `--quiet` and the colour settings.
pub struct OutputManager {
    quiet: bool,
    color: bool,
    term: Term,
}

impl OutputManager {
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let term = Term::stdout();
        let color = !(args.no_color || config.output.no_color) && term.is_term();
        Self {
            quiet: args.quiet,
            color,
            term,
        }
    }

    /// Plain line; dropped in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        self.emit(msg.to_owned())
    }

    /// Payload meant for other programs. Written even when quiet.
    pub fn data(&self, text: &str) -> io::Result<()> {
        self.term.write_line(text)
    }

    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.status(Tone::Success, msg)
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.status(Tone::Warning, msg)
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.status(Tone::Info, msg)
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        let line = if self.color {
            text.cyan().bold().to_string()
        } else {
            text.to_owned()
        };
        self.emit(line)
    }

    /// Secondary line, e.g. a skipped step.
    pub fn dim(&self, text: &str) -> io::Result<()> {
        let line = if self.color {
            text.dimmed().to_string()
        } else {
            text.to_owned()
        };
        self.emit(line)
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn status(&self, tone: Tone, msg: &str) -> io::Result<()> {
        let line = if self.color {
            tone.paint(tone.glyph(), msg)
        } else {
            format!("{} {msg}", tone.glyph())
        };
        self.emit(line)
    }

    fn emit(&self, line: String) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(quiet: bool, no_color: bool) -> GlobalArgs {
        GlobalArgs {
            verbose: 0,
            quiet,
            no_color,
            config: None,
        }
    }

    #[test]
    fn quiet_manager_swallows_status_lines() {
        let out = OutputManager::new(&global(true, true), &AppConfig::default());
        assert!(out.is_quiet());
        assert!(out.print("hello").is_ok());
        assert!(out.success("done").is_ok());
    }

    #[test]
    fn colour_off_when_flag_or_config_says_so() {
        let out = OutputManager::new(&global(false, true), &AppConfig::default());
        assert!(!out.color);

        let mut config = AppConfig::default();
        config.output.no_color = true;
        let out = OutputManager::new(&global(false, false), &config);
        assert!(!out.color);
    }

    #[test]
    fn glyphs_differ_per_tone() {
        assert_ne!(Tone::Success.glyph(), Tone::Warning.glyph());
        assert_ne!(Tone::Warning.glyph(), Tone::Info.glyph());
    }
}
