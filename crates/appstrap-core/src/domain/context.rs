//! Run-scoped state: render variables, prompt answers, the target root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use uuid::Uuid;

use crate::domain::{options::GeneratorOptions, repo::RemoteUrl};

/// Variables available to `{{VARIABLE}}` placeholders in rendered templates.
///
/// ## Built-in Variables
///
/// | Variable | Example |
/// |----------|---------|
/// | `APP_NAME` | "blog_engine" |
/// | `APP_NAME_SNAKE` | "blog_engine" |
/// | `APP_NAME_KEBAB` | "blog-engine" |
/// | `APP_NAME_PASCAL` | "BlogEngine" |
/// | `LOCALE` | "en" |
/// | `YEAR` | "2026" |
///
/// Unknown placeholders are left in the output untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    app_name: String,
    variables: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new(app_name: impl Into<String>) -> Self {
        let name = app_name.into();
        let mut vars = BTreeMap::new();

        vars.insert("APP_NAME".to_string(), name.clone());
        vars.insert("APP_NAME_SNAKE".to_string(), to_snake_case(&name));
        vars.insert("APP_NAME_KEBAB".to_string(), to_kebab_case(&name));
        vars.insert("APP_NAME_PASCAL".to_string(), to_pascal_case(&name));
        vars.insert("YEAR".to_string(), chrono::Local::now().year().to_string());

        Self {
            app_name: name,
            variables: vars,
        }
    }

    /// Add or override a variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace `{{VARIABLE}}` placeholders in a single left-to-right pass.
    ///
    /// Substituted values are never rescanned, so a value containing
    /// `{{...}}` comes out literally.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            match after.find("}}") {
                Some(close) => {
                    let key = &after[..close];
                    match self.variables.get(key.trim()) {
                        Some(value) if is_identifier(key.trim()) => out.push_str(value),
                        _ => {
                            out.push_str("{{");
                            out.push_str(key);
                            out.push_str("}}");
                        }
                    }
                    rest = &after[close + 2..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn is_identifier(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Everything a bootstrap run accumulates while it executes.
///
/// One value per run; the orchestrator threads it through every step so
/// prompt answers given early can gate steps later.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub app_name: String,
    pub target_root: PathBuf,
    pub locale: String,
    pub interactive: bool,
    pub options: GeneratorOptions,
    confirmations: BTreeMap<String, bool>,
    answers: BTreeMap<String, String>,
    variables: BTreeMap<String, String>,
    remote: Option<RemoteUrl>,
}

impl RunContext {
    pub fn new(
        app_name: impl Into<String>,
        target_root: impl Into<PathBuf>,
        options: GeneratorOptions,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            app_name: app_name.into(),
            target_root: target_root.into(),
            locale: "en".into(),
            interactive: false,
            options,
            confirmations: BTreeMap::new(),
            answers: BTreeMap::new(),
            variables: BTreeMap::new(),
            remote: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Resolve a plan-relative path against the target root.
    pub fn target_path(&self, relative: &Path) -> PathBuf {
        self.target_root.join(relative)
    }

    pub fn record_confirmation(&mut self, key: impl Into<String>, value: bool) {
        self.confirmations.insert(key.into(), value);
    }

    pub fn is_confirmed(&self, key: &str) -> bool {
        self.confirmations.get(key).copied().unwrap_or(false)
    }

    pub fn record_answer(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.answers.insert(key.into(), value.into());
    }

    /// Extra render variable, e.g. a captured gem requirement.
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// The remote chosen for this run, if it has been asked for yet.
    pub fn remote(&self) -> Option<&RemoteUrl> {
        self.remote.as_ref()
    }

    pub fn set_remote(&mut self, remote: RemoteUrl) {
        self.remote = Some(remote);
    }

    /// Build the render context for templates in this run.
    ///
    /// Text answers are exposed under their key and its upper-cased form,
    /// after the built-ins, so an answer can deliberately override one.
    pub fn render_context(&self) -> RenderContext {
        let mut ctx = RenderContext::new(&self.app_name).with_variable("LOCALE", &self.locale);
        for (key, value) in &self.variables {
            ctx = ctx.with_variable(key, value);
        }
        for (key, value) in &self.answers {
            let upper = key.to_ascii_uppercase();
            if upper != *key {
                ctx = ctx.with_variable(upper, value);
            }
            ctx = ctx.with_variable(key, value);
        }
        ctx
    }
}

fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Split on `_`, `-`, whitespace, camelCase and acronym boundaries.
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        current.push(c);

        if let Some(&next) = chars.peek() {
            let lower_to_upper = c.is_lowercase() && next.is_uppercase();
            // "HTTPServer" splits before the 'S'
            let acronym_end = c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(char::is_lowercase);
            if lower_to_upper || acronym_end {
                words.push(current.to_lowercase());
                current.clear();
            }
        }
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }
    words
}
