//! Toolchain version requirements and the gate decision.
//!
//! Requirements are written the way template authors are used to writing
//! them, which includes the pessimistic operator `~>`:
//!
//! | Requirement | Meaning                 |
//! |-------------|-------------------------|
//! | `~> 6.0.0`  | `>= 6.0.0, < 6.1.0`     |
//! | `~> 6.0`    | `>= 6.0.0, < 7.0.0`     |
//! | `~> 6`      | `>= 6.0.0, < 7.0.0`     |
//! | `6.0.3`     | `= 6.0.3`               |
//!
//! Every other comparator (`>=`, `>`, `<=`, `<`, `=`, `^`, `~`) is handed to
//! [`semver::VersionReq`] unchanged. Versions in a requirement have at most
//! three numeric segments, whatever the operator.

use std::fmt;
use std::str::FromStr;

use semver::{Comparator, Op, Prerelease, Version, VersionReq};
use serde::{Serialize, Serializer};

use crate::domain::error::DomainError;

/// A parsed version requirement, remembering what the author wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequirement {
    raw: String,
    req: VersionReq,
}

impl VersionRequirement {
    /// Parse a comma-separated list of comparators.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let translated = raw
            .split(',')
            .map(|part| translate_comparator(raw, part.trim()))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");

        let req = VersionReq::parse(&translated).map_err(|e| {
            DomainError::InvalidVersionRequirement {
                requirement: raw.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            raw: raw.trim().to_string(),
            req,
        })
    }

    /// `~> major.minor.patch`, built without parsing.
    pub fn pessimistic(major: u64, minor: u64, patch: u64) -> Self {
        let comparator = Comparator {
            op: Op::Tilde,
            major,
            minor: Some(minor),
            patch: Some(patch),
            pre: Prerelease::EMPTY,
        };
        Self {
            raw: format!("~> {major}.{minor}.{patch}"),
            req: VersionReq {
                comparators: vec![comparator],
            },
        }
    }

    /// The requirement as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.req.matches(version)
    }
}

impl FromStr for VersionRequirement {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for VersionRequirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

const MAX_SEGMENTS: usize = 3;
const TOO_MANY_SEGMENTS: &str = "versions take at most three segments (major.minor.patch)";

fn translate_comparator(raw: &str, part: &str) -> Result<String, DomainError> {
    let invalid = |reason: &str| DomainError::InvalidVersionRequirement {
        requirement: raw.to_string(),
        reason: reason.to_string(),
    };

    if part.is_empty() {
        return Err(invalid("empty comparator"));
    }
    if part.starts_with("!=") {
        return Err(invalid("'!=' is not supported"));
    }

    if let Some(rest) = part.strip_prefix("~>") {
        let segments = numeric_segments(rest.trim()).ok_or_else(|| {
            invalid("'~>' must be followed by a numeric version such as 6.0.0")
        })?;
        if segments.len() > MAX_SEGMENTS {
            return Err(invalid(TOO_MANY_SEGMENTS));
        }
        let bump = |n: u64| n.checked_add(1).ok_or_else(|| invalid("version segment overflows"));
        return Ok(match segments.as_slice() {
            [major] => format!(">={major}.0.0, <{}.0.0", bump(*major)?),
            [major, minor] => format!(">={major}.{minor}.0, <{}.0.0", bump(*major)?),
            [major, minor, patch] => {
                format!(">={major}.{minor}.{patch}, <{major}.{}.0", bump(*minor)?)
            }
            _ => return Err(invalid("empty version after '~>'")),
        });
    }

    let compact: String = part.split_whitespace().collect();
    let version = compact.trim_start_matches(['>', '<', '=', '^', '~']);
    let release = version.split(['-', '+']).next().unwrap_or_default();
    if release.split('.').count() > MAX_SEGMENTS {
        return Err(invalid(TOO_MANY_SEGMENTS));
    }

    // A bare version pins exactly, unlike semver's implicit caret.
    if compact.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(format!("={compact}"));
    }

    Ok(compact)
}

fn numeric_segments(version: &str) -> Option<Vec<u64>> {
    if version.is_empty() {
        return None;
    }
    version
        .split('.')
        .map(|s| s.parse::<u64>().ok())
        .collect()
}

/// Parse a version reported by a tool, e.g. `Rails 6.0.3.4` or `v7.1.0`.
///
/// The first token starting with a digit is used. Missing components are
/// zero-filled and numeric components past the patch level are ignored. A
/// trailing tag such as `7.1.0.beta1` or `7.1.0rc2` becomes a prerelease,
/// so it sorts below the final release.
pub fn parse_detected_version(output: &str) -> Result<Version, DomainError> {
    let invalid = || DomainError::InvalidVersion {
        version: output.trim().to_string(),
        reason: "no numeric version found".into(),
    };

    let token = output
        .split_whitespace()
        .map(|t| t.strip_prefix('v').unwrap_or(t))
        .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))
        .ok_or_else(invalid)?;

    let mut numbers: Vec<u64> = Vec::with_capacity(3);
    let mut tag = None;
    for component in token.split('.') {
        let digits = component.len()
            - component
                .trim_start_matches(|c: char| c.is_ascii_digit())
                .len();
        if digits == 0 {
            tag = prerelease_tag(component);
            break;
        }
        if numbers.len() < 3 {
            numbers.push(component[..digits].parse().map_err(|_| invalid())?);
        }
        if digits != component.len() {
            tag = prerelease_tag(&component[digits..]);
            break;
        }
    }

    let part = |i: usize| numbers.get(i).copied().unwrap_or(0);
    let mut version = Version::new(part(0), part(1), part(2));
    if let Some(tag) = tag {
        version.pre = tag;
    }
    Ok(version)
}

fn prerelease_tag(raw: &str) -> Option<Prerelease> {
    let tag: String = raw
        .trim_start_matches(['-', '_'])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '.')
        .collect();
    let tag = tag.trim_end_matches(['-', '.']);
    if tag.is_empty() {
        return None;
    }
    Prerelease::new(tag).ok()
}

/// Result of comparing the host toolchain against a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Proceed,
    Unsatisfied { detected: String },
}

/// Compare a detected version against a requirement.
///
/// An undetectable version never satisfies the requirement.
pub fn check_version(requirement: &VersionRequirement, detected: Option<&Version>) -> GateOutcome {
    match detected {
        Some(version) if requirement.matches(version) => GateOutcome::Proceed,
        Some(version) => GateOutcome::Unsatisfied {
            detected: version.to_string(),
        },
        None => GateOutcome::Unsatisfied {
            detected: "unknown".into(),
        },
    }
}
