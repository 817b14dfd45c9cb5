//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate only sees the [`BootstrapPolicy`]
//! built from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `APPSTRAP_<SECTION>__<KEY>`, e.g.
//!    `APPSTRAP_BOOTSTRAP__LOCALE=fr`
//! 3. Config file (`--config`, or `config.toml` in the platform config dir)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use appstrap_core::{
    application::BootstrapPolicy,
    domain::{GeneratorOptions, ToolRequirement, VersionRequirement},
};

use crate::error::{CliError, CliResult};

const ENV_PREFIX: &str = "APPSTRAP";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub bootstrap: BootstrapConfig,
    pub output: OutputConfig,
}

/// Defaults for `appstrap new` and the gates it enforces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Template used when `--template` is not given.
    pub template: Option<String>,
    pub locale: String,
    pub commit_message: String,
    /// Remote used when `--remote` is not given; `skip` disables the push.
    pub remote: Option<String>,
    /// Display name of the toolchain, e.g. `Rails`.
    pub tool_name: String,
    /// Command printing the installed toolchain version.
    pub toolchain_command: Vec<String>,
    pub required_version: String,
    /// Skips detection when set.
    pub toolchain_version: Option<String>,
    /// Generator options templates were written for. A supplied flag that
    /// disagrees with its entry here is rejected.
    pub expected_options: GeneratorOptions,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            template: None,
            locale: "en".into(),
            commit_message: "Project setup".into(),
            remote: None,
            tool_name: "Rails".into(),
            toolchain_command: vec!["rails".into(), "--version".into()],
            required_version: "~> 6.0.0".into(),
            toolchain_version: None,
            expected_options: GeneratorOptions::supported(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then the
    /// environment.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let defaults = toml::to_string(&Self::default())
            .map_err(|e| CliError::config(format!("cannot serialise defaults: {e}")))?;

        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        if required && !path.is_file() {
            return Err(CliError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), required, "Loading configuration");

        let config: Self = Config::builder()
            .add_source(File::from_str(&defaults, FileFormat::Toml))
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("bootstrap.toolchain_command"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.appstrap.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "appstrap", "appstrap")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".appstrap.toml"))
    }

    /// Resolve the config path the user asked for, or the default.
    pub fn resolve_path(config_file: Option<&Path>) -> PathBuf {
        config_file
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path)
    }

    fn validate(&self) -> CliResult<()> {
        if self.bootstrap.toolchain_command.is_empty() {
            return Err(CliError::config("bootstrap.toolchain_command is empty"));
        }
        if self.bootstrap.commit_message.trim().is_empty() {
            return Err(CliError::config("bootstrap.commit_message is empty"));
        }
        VersionRequirement::parse(&self.bootstrap.required_version).map_err(|e| {
            CliError::config(format!(
                "bootstrap.required_version '{}': {e}",
                self.bootstrap.required_version
            ))
        })?;
        Ok(())
    }

    /// The gates and commit message the orchestrator enforces.
    pub fn policy(&self) -> CliResult<BootstrapPolicy> {
        let requirement = VersionRequirement::parse(&self.bootstrap.required_version)
            .map_err(|e| CliError::config(format!("bootstrap.required_version: {e}")))?;
        Ok(BootstrapPolicy {
            tool: ToolRequirement::new(
                self.bootstrap.tool_name.clone(),
                self.bootstrap.toolchain_command.clone(),
                requirement,
            ),
            expected_options: self.bootstrap.expected_options,
            commit_message: self.bootstrap.commit_message.clone(),
        })
    }

    /// Render as TOML, as written by `appstrap init`.
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("cannot serialise configuration: {e}")))
    }
}
