//! Template source resolution: a local directory or a git clone.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use appstrap_core::{
    application::{
        ApplicationError,
        ports::{ResolvedSource, SourceResolver},
    },
    error::{AppstrapError, AppstrapResult},
};
use tracing::{debug, info, instrument};
use url::Url;

const REMOTE_SCHEMES: &[&str] = &["http", "https", "git", "ssh", "file"];

/// Where a template lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    Local(PathBuf),
    /// A git repository, optionally pinned to a branch, tag or commit.
    Remote {
        url: String,
        reference: Option<String>,
    },
}

impl TemplateOrigin {
    /// Classify a `--template` argument.
    ///
    /// URLs with a known scheme and scp-style `user@host:path` are remote.
    /// A `#ref` fragment or a `/tree/<ref>` path suffix selects the
    /// reference to check out. Everything else is a filesystem path.
    pub fn classify(origin: &str) -> Self {
        let origin = origin.trim();
        if let Ok(url) = Url::parse(origin) {
            if REMOTE_SCHEMES.contains(&url.scheme()) {
                return Self::from_url(url);
            }
        }
        if is_scp_like(origin) {
            let (url, reference) = match origin.split_once('#') {
                Some((url, reference)) if !reference.is_empty() => {
                    (url.to_string(), Some(reference.to_string()))
                }
                Some((url, _)) => (url.to_string(), None),
                None => (origin.to_string(), None),
            };
            return Self::Remote { url, reference };
        }
        Self::Local(PathBuf::from(origin))
    }

    fn from_url(mut url: Url) -> Self {
        let mut reference = url.fragment().filter(|f| !f.is_empty()).map(str::to_string);
        url.set_fragment(None);

        if reference.is_none() {
            let path = url.path().to_string();
            if let Some((repo, tree_ref)) = path.split_once("/tree/") {
                let tree_ref = tree_ref.trim_end_matches('/');
                if !tree_ref.is_empty() {
                    reference = Some(tree_ref.to_string());
                    url.set_path(repo);
                }
            }
        }

        Self::Remote {
            url: url.to_string(),
            reference,
        }
    }
}

impl fmt::Display for TemplateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote {
                url,
                reference: Some(reference),
            } => write!(f, "{url}#{reference}"),
            Self::Remote { url, .. } => f.write_str(url),
        }
    }
}

/// `git@github.com:acme/template.git`: a user part, then a host, then a
/// colon before any slash.
fn is_scp_like(origin: &str) -> bool {
    let Some((before_colon, path)) = origin.split_once(':') else {
        return false;
    };
    match before_colon.split_once('@') {
        Some((user, host)) => {
            !user.is_empty() && !host.is_empty() && !host.contains('/') && !path.is_empty()
        }
        None => false,
    }
}

/// Resolves local template directories and clones remote ones.
///
/// Clones land in a temporary directory owned by the returned
/// [`ResolvedSource`] and are removed when it drops.
#[derive(Debug, Clone)]
pub struct GitSourceResolver {
    git: String,
}

impl GitSourceResolver {
    pub fn new() -> Self {
        Self { git: "git".into() }
    }

    /// Use a specific git executable.
    pub fn with_git(git: impl Into<String>) -> Self {
        Self { git: git.into() }
    }

    fn resolve_local(&self, origin: &str, path: &Path) -> AppstrapResult<ResolvedSource> {
        if !path.is_dir() {
            return Err(resolution_error(origin, "not a directory"));
        }
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        debug!(root = %root.display(), "Using local template directory");
        Ok(ResolvedSource::local(root))
    }

    #[instrument(skip(self), fields(origin = %origin))]
    fn clone_remote(
        &self,
        origin: &str,
        url: &str,
        reference: Option<&str>,
    ) -> AppstrapResult<ResolvedSource> {
        let tmp = tempfile::Builder::new()
            .prefix("appstrap-template-")
            .tempdir()
            .map_err(|e| resolution_error(origin, format!("cannot create temp dir: {e}")))?;
        let checkout = tmp.path().join("template");

        info!(url, "Cloning template repository");
        let mut clone = Command::new(&self.git);
        clone.arg("clone").arg("--quiet").arg(url).arg(&checkout);
        self.git_output(origin, clone)?;

        if let Some(reference) = reference {
            debug!(reference, "Checking out template reference");
            let mut checkout_cmd = Command::new(&self.git);
            checkout_cmd
                .arg("-C")
                .arg(&checkout)
                .arg("checkout")
                .arg("--quiet")
                .arg(reference);
            self.git_output(origin, checkout_cmd)?;
        }

        Ok(ResolvedSource::temporary(origin, checkout, tmp))
    }

    fn git_output(&self, origin: &str, mut cmd: Command) -> AppstrapResult<()> {
        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| resolution_error(origin, format!("could not run {}: {e}", self.git)))?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(resolution_error(origin, stderr.trim()))
        }
    }
}

impl Default for GitSourceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceResolver for GitSourceResolver {
    fn resolve(&self, origin: &str) -> AppstrapResult<ResolvedSource> {
        match TemplateOrigin::classify(origin) {
            TemplateOrigin::Local(path) => self.resolve_local(origin, &path),
            TemplateOrigin::Remote { url, reference } => {
                self.clone_remote(origin, &url, reference.as_deref())
            }
        }
    }
}

fn resolution_error(origin: &str, reason: impl fmt::Display) -> AppstrapError {
    ApplicationError::SourceResolution {
        origin: origin.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn remote(url: &str, reference: Option<&str>) -> TemplateOrigin {
        TemplateOrigin::Remote {
            url: url.into(),
            reference: reference.map(Into::into),
        }
    }

    #[test]
    fn classifies_paths_as_local() {
        assert_eq!(
            TemplateOrigin::classify("./templates/rails"),
            TemplateOrigin::Local(PathBuf::from("./templates/rails"))
        );
        assert_eq!(
            TemplateOrigin::classify("/opt/templates/rails"),
            TemplateOrigin::Local(PathBuf::from("/opt/templates/rails"))
        );
    }

    #[test]
    fn classifies_urls_and_fragments() {
        assert_eq!(
            TemplateOrigin::classify("https://github.com/acme/rails_template.git"),
            remote("https://github.com/acme/rails_template.git", None)
        );
        assert_eq!(
            TemplateOrigin::classify("https://github.com/acme/rails_template.git#v2"),
            remote("https://github.com/acme/rails_template.git", Some("v2"))
        );
    }

    #[test]
    fn tree_path_selects_a_branch() {
        assert_eq!(
            TemplateOrigin::classify("https://github.com/acme/rails_template/tree/rails-6"),
            remote("https://github.com/acme/rails_template", Some("rails-6"))
        );
    }

    #[test]
    fn classifies_scp_style_remotes() {
        assert_eq!(
            TemplateOrigin::classify("git@github.com:acme/rails_template.git#main"),
            remote("git@github.com:acme/rails_template.git", Some("main"))
        );
        assert_eq!(
            TemplateOrigin::classify("C:/templates"),
            TemplateOrigin::Local(PathBuf::from("C:/templates"))
        );
    }

    #[test]
    fn resolves_existing_local_directory() {
        let tmp = TempDir::new().unwrap();
        let origin = tmp.path().to_string_lossy().into_owned();
        let source = GitSourceResolver::new().resolve(&origin).unwrap();
        assert!(!source.is_temporary());
        assert!(source.root().is_dir());
    }

    #[test]
    fn missing_local_directory_is_a_resolution_error() {
        let tmp = TempDir::new().unwrap();
        let origin = tmp.path().join("missing").to_string_lossy().into_owned();
        let err = GitSourceResolver::new().resolve(&origin).unwrap_err();
        assert!(matches!(
            err,
            AppstrapError::Application(ApplicationError::SourceResolution { .. })
        ));
    }

    #[test]
    fn unreachable_remote_is_a_resolution_error() {
        let tmp = TempDir::new().unwrap();
        let url = format!("file://{}/nope.git", tmp.path().display());
        let err = GitSourceResolver::with_git("appstrap-no-such-git")
            .resolve(&url)
            .unwrap_err();
        assert!(err.to_string().contains("nope.git"));
    }
}
