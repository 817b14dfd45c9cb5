//! Reading version requirements out of a generated `Gemfile`.
//!
//! Templates that replace the upstream Gemfile still want to keep whatever
//! version constraints the generator picked, so plans can capture them into
//! render variables before the file is overwritten.

use regex::Regex;

/// The requirement suffix for `name`, normalized to double quotes.
///
/// For `gem 'puma', '~> 4.1'` this yields `, "~> 4.1"`, ready to be pasted
/// after the gem name in a template. `None` when the gem is not declared or
/// declared without a version.
pub fn gem_requirement(gemfile: &str, name: &str) -> Option<String> {
    let pattern = format!(
        r#"(?m)gem\s+['"]{}['"]\s*(,[><~= \t\d\.\w'"]*)?.*$"#,
        regex::escape(name)
    );
    let re = Regex::new(&pattern).ok()?;
    let raw = re.captures(gemfile)?.get(1)?.as_str();

    let normalized = raw.replace('\'', "\"");
    let trimmed = normalized.trim();
    let body = trimmed.strip_prefix(',')?.trim_start();
    if body.is_empty() {
        return None;
    }
    Some(format!(", {body}"))
}

/// Render-variable name a captured requirement is stored under.
pub fn requirement_variable(name: &str) -> String {
    let upper: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("GEM_{upper}_REQUIREMENT")
}
