//! Command handlers, one module per subcommand.

pub mod completions;
pub mod config;
pub mod init;
pub mod new;
pub mod plan;

use appstrap_adapters::{
    GitSourceResolver, LocalFilesystem, ManifestPlanLoader, SimpleRenderer, SystemCommandRunner,
    TerminalPrompter,
};
use appstrap_core::application::Orchestrator;

use crate::{config::AppConfig, error::CliResult, signals};

/// Template used when neither `--template` nor the config names one.
pub const DEFAULT_TEMPLATE: &str = ".";

/// Wire the production adapters into an orchestrator.
pub(crate) fn orchestrator(config: &AppConfig, non_interactive: bool) -> CliResult<Orchestrator> {
    Ok(Orchestrator::new(
        Box::new(LocalFilesystem::new()),
        Box::new(SystemCommandRunner::new().with_interrupt_flag(signals::flag())),
        Box::new(TerminalPrompter::new(non_interactive)),
        Box::new(GitSourceResolver::new()),
        Box::new(ManifestPlanLoader::new(LocalFilesystem::new())),
        Box::new(SimpleRenderer::new()),
    )
    .with_policy(config.policy()?))
}

/// `--template`, else the configured template, else the current directory.
pub(crate) fn template_origin(flag: Option<String>, config: &AppConfig) -> String {
    flag.or_else(|| config.bootstrap.template.clone())
        .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string())
}
