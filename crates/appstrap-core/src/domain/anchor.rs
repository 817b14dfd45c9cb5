//! Text injection and substitution over plain strings.
//!
//! Nothing here touches disk; the content transformer reads a file, calls
//! into this module, and writes the result back.

use regex::Regex;

use crate::domain::{
    error::DomainError,
    step::{Pattern, Position, Scope},
};

/// Byte range of an anchor inside some content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch {
    pub start: usize,
    pub end: usize,
}

/// Finds the anchor an injection attaches to.
///
/// Literal first-occurrence matching is the default; a language-aware
/// locator can be swapped in without touching the transformer.
pub trait AnchorLocator: Send + Sync {
    fn find_anchor(&self, content: &str, marker: &str) -> Option<AnchorMatch>;
}

/// Matches the first literal occurrence of the marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralAnchor;

impl AnchorLocator for LiteralAnchor {
    fn find_anchor(&self, content: &str, marker: &str) -> Option<AnchorMatch> {
        content.find(marker).map(|start| AnchorMatch {
            start,
            end: start + marker.len(),
        })
    }
}

/// Insert `insertion` immediately before or after the anchor.
///
/// The content of the file is otherwise preserved byte for byte. A missing
/// anchor is an error; nothing is inserted.
pub fn inject(
    content: &str,
    file: &str,
    marker: &str,
    position: Position,
    insertion: &str,
    locator: &dyn AnchorLocator,
) -> Result<String, DomainError> {
    let found = locator
        .find_anchor(content, marker)
        .ok_or_else(|| DomainError::AnchorNotFound {
            file: file.to_string(),
            anchor: marker.to_string(),
        })?;

    let at = match position {
        Position::Before => found.start,
        Position::After => found.end,
    };

    let mut out = String::with_capacity(content.len() + insertion.len());
    out.push_str(&content[..at]);
    out.push_str(insertion);
    out.push_str(&content[at..]);
    Ok(out)
}

/// Replace the first or every match of `pattern`.
///
/// Returns `Ok(None)` when nothing matched or the replacement reproduces
/// the original text, so callers can tell an unchanged file from a
/// rewritten one.
pub fn substitute(
    content: &str,
    pattern: &Pattern,
    replacement: &str,
    scope: Scope,
) -> Result<Option<String>, DomainError> {
    let out = match pattern {
        Pattern::Literal(needle) => {
            if needle.is_empty() || !content.contains(needle.as_str()) {
                return Ok(None);
            }
            match scope {
                Scope::First => content.replacen(needle.as_str(), replacement, 1),
                Scope::All => content.replace(needle.as_str(), replacement),
            }
        }
        Pattern::Regex(expr) => {
            let re = Regex::new(expr).map_err(|e| DomainError::InvalidPattern {
                pattern: expr.clone(),
                reason: e.to_string(),
            })?;
            if !re.is_match(content) {
                return Ok(None);
            }
            let limit = match scope {
                Scope::First => 1,
                Scope::All => 0,
            };
            re.replacen(content, limit, replacement).into_owned()
        }
    };
    Ok((out != content).then_some(out))
}
