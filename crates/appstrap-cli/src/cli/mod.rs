//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use appstrap_core::domain::GeneratorOptions;

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "appstrap",
    bin_name = "appstrap",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Turn a freshly generated app skeleton into a ready-to-run app",
    long_about = "Appstrap applies a template's bootstrap plan to a generated \
                  application: renders files, injects configuration, runs \
                  setup commands, and makes the first git commit.",
    after_help = "EXAMPLES:\n\
        \x20 appstrap new blog --template ./templates/rails\n\
        \x20 appstrap new blog --template https://github.com/acme/rails_template.git#main\n\
        \x20 appstrap plan --template ./templates/rails --format json\n\
        \x20 appstrap completions bash > /usr/share/bash-completion/completions/appstrap",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bootstrap a generated application.
    #[command(
        visible_alias = "n",
        about = "Bootstrap a generated application",
        after_help = "EXAMPLES:\n\
            \x20 appstrap new blog\n\
            \x20 appstrap new blog --path ~/code/blog --locale fr\n\
            \x20 appstrap new blog --remote git@github.com:acme/blog.git --non-interactive"
    )]
    New(NewArgs),

    /// Show the plan a template would apply.
    #[command(
        about = "Show a template's bootstrap plan",
        after_help = "EXAMPLES:\n\
            \x20 appstrap plan\n\
            \x20 appstrap plan --template ./templates/rails --format json"
    )]
    Plan(PlanArgs),

    /// Initialise an Appstrap configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 appstrap init\n\
            \x20 appstrap init --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 appstrap completions bash > ~/.local/share/bash-completion/completions/appstrap\n\
            \x20 appstrap completions zsh  > ~/.zfunc/_appstrap\n\
            \x20 appstrap completions fish > ~/.config/fish/completions/appstrap.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Appstrap configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 appstrap config show\n\
            \x20 appstrap config path"
    )]
    Config(ConfigCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `appstrap new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Application name, as passed to the upstream generator.
    #[arg(value_name = "APP_NAME", help = "Application name")]
    pub name: String,

    /// Directory of the generated application (default: `./<APP_NAME>`).
    #[arg(long = "path", value_name = "DIR", help = "Application directory")]
    pub path: Option<PathBuf>,

    /// Template directory or git URL.
    #[arg(
        short = 't',
        long = "template",
        value_name = "ORIGIN",
        help = "Template directory or git URL (append #ref for a branch)"
    )]
    pub template: Option<String>,

    /// Git remote for the first push; `skip` disables it.
    #[arg(long = "remote", value_name = "URL", help = "Git remote URL, or 'skip'")]
    pub remote: Option<String>,

    #[arg(long = "locale", value_name = "LOCALE", help = "Default locale")]
    pub locale: Option<String>,

    #[command(flatten)]
    pub options: GeneratorFlags,

    /// Use this toolchain version instead of detecting it.
    #[arg(
        long = "toolchain-version",
        value_name = "VER",
        help = "Toolchain version to check instead of detecting it"
    )]
    pub toolchain_version: Option<String>,

    /// Never prompt; take every default.
    #[arg(long = "non-interactive", help = "Never prompt; accept all defaults")]
    pub non_interactive: bool,

    /// Validate and print the plan without changing anything.
    #[arg(long = "dry-run", help = "Show the plan without applying it")]
    pub dry_run: bool,
}

/// Generator options forwarded from the upstream generator invocation.
///
/// Each flag takes an optional value: `--skip-bundle` means
/// `--skip-bundle=true`; omitting the flag means "not supplied".
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct GeneratorFlags {
    #[arg(
        long = "skip-gemfile",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Generator was run with --skip-gemfile"
    )]
    pub skip_gemfile: Option<bool>,

    #[arg(
        long = "skip-bundle",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Generator was run with --skip-bundle"
    )]
    pub skip_bundle: Option<bool>,

    #[arg(
        long = "skip-git",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Generator was run with --skip-git"
    )]
    pub skip_git: Option<bool>,

    #[arg(
        long = "edge",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Generator was run with --edge"
    )]
    pub edge: Option<bool>,
}

impl From<GeneratorFlags> for GeneratorOptions {
    fn from(flags: GeneratorFlags) -> Self {
        GeneratorOptions {
            skip_gemfile: flags.skip_gemfile,
            skip_bundle: flags.skip_bundle,
            skip_git: flags.skip_git,
            edge: flags.edge,
        }
    }
}

// ── plan ──────────────────────────────────────────────────────────────────────

/// Arguments for `appstrap plan`.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Template directory or git URL.
    #[arg(
        short = 't',
        long = "template",
        value_name = "ORIGIN",
        help = "Template directory or git URL"
    )]
    pub template: Option<String>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: PlanFormat,
}

/// Output format for the `plan` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    /// Human-readable step list.
    Table,
    /// JSON document.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `appstrap init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `appstrap completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `appstrap config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration.
    Show,
    /// Print the path to the configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
