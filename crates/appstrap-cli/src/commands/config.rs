//! `appstrap config`: inspect the effective configuration.

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Show => output.data(&config.to_toml()?)?,
        ConfigCommands::Path => {
            let path = AppConfig::resolve_path(global.config.as_deref());
            output.data(&path.display().to_string())?;
        }
    }
    Ok(())
}
