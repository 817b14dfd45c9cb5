//! Generator options and their validation.
//!
//! The options the upstream application generator was invoked with are
//! modelled as a fixed structure rather than an open-ended map: every option
//! a template cares about has a named field, and validation walks all of
//! them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// The generator options a bootstrap run knows about.
///
/// `None` means "not supplied". The same type describes both what the user
/// supplied and what a template expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub skip_gemfile: Option<bool>,
    pub skip_bundle: Option<bool>,
    pub skip_git: Option<bool>,
    pub edge: Option<bool>,
}

/// Name of a single generator option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionName {
    SkipGemfile,
    SkipBundle,
    SkipGit,
    Edge,
}

impl OptionName {
    pub const ALL: [OptionName; 4] = [
        OptionName::SkipGemfile,
        OptionName::SkipBundle,
        OptionName::SkipGit,
        OptionName::Edge,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SkipGemfile => "skip_gemfile",
            Self::SkipBundle => "skip_bundle",
            Self::SkipGit => "skip_git",
            Self::Edge => "edge",
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "skip_gemfile" => Ok(Self::SkipGemfile),
            "skip_bundle" => Ok(Self::SkipBundle),
            "skip_git" => Ok(Self::SkipGit),
            "edge" => Ok(Self::Edge),
            other => Err(DomainError::UnknownOption(other.to_string())),
        }
    }
}

impl GeneratorOptions {
    /// What a typical template requires: nothing skipped, no edge toolchain.
    pub const fn supported() -> Self {
        Self {
            skip_gemfile: Some(false),
            skip_bundle: Some(false),
            skip_git: Some(false),
            edge: Some(false),
        }
    }

    pub const fn get(&self, name: OptionName) -> Option<bool> {
        match name {
            OptionName::SkipGemfile => self.skip_gemfile,
            OptionName::SkipBundle => self.skip_bundle,
            OptionName::SkipGit => self.skip_git,
            OptionName::Edge => self.edge,
        }
    }

    pub fn set(&mut self, name: OptionName, value: Option<bool>) {
        let slot = match name {
            OptionName::SkipGemfile => &mut self.skip_gemfile,
            OptionName::SkipBundle => &mut self.skip_bundle,
            OptionName::SkipGit => &mut self.skip_git,
            OptionName::Edge => &mut self.edge,
        };
        *slot = value;
    }

    /// `true` only when the option was supplied and set.
    pub fn is_enabled(&self, name: OptionName) -> bool {
        self.get(name) == Some(true)
    }
}

/// Check supplied options against a template's expectations.
///
/// Options the user did not supply are not checked. The first mismatch, in
/// [`OptionName::ALL`] order, is reported.
pub fn validate_options(
    expected: &GeneratorOptions,
    supplied: &GeneratorOptions,
) -> Result<(), DomainError> {
    for name in OptionName::ALL {
        match (expected.get(name), supplied.get(name)) {
            (Some(expected), Some(actual)) if expected != actual => {
                return Err(DomainError::UnsupportedOption {
                    name: name.as_str(),
                    expected,
                    actual,
                });
            }
            _ => {}
        }
    }
    Ok(())
}
