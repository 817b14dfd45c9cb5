//! The git bootstrap state machine.
//!
//! ```text
//!   NoRepo ──init──▶ RepoNoCommits ──add/commit[/remote/push]──▶ RepoWithCommits
//! ```
//!
//! The state is derived on demand from two observations (does `.git`
//! exist, does `git log -1` print anything) and is never stored.

use std::fmt;

use crate::domain::step::GitOpKind;

/// Where the target repository stands before bootstrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoState {
    NoRepo,
    RepoNoCommits,
    RepoWithCommits,
}

impl RepoState {
    pub const fn detect(git_dir_exists: bool, has_commits: bool) -> Self {
        match (git_dir_exists, has_commits) {
            (false, _) => Self::NoRepo,
            (true, false) => Self::RepoNoCommits,
            (true, true) => Self::RepoWithCommits,
        }
    }
}

impl fmt::Display for RepoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoRepo => "no repository",
            Self::RepoNoCommits => "repository without commits",
            Self::RepoWithCommits => "repository with commits",
        })
    }
}

/// The `origin` remote for a new repository, or the decision not to set one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteUrl {
    Skip,
    Url(String),
}

impl RemoteUrl {
    /// Answer the user typed: blank or `skip` (any case) means no remote.
    pub fn parse(answer: &str) -> Self {
        let trimmed = answer.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("skip") {
            Self::Skip
        } else {
            Self::Url(trimmed.to_string())
        }
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Skip => None,
            Self::Url(url) => Some(url),
        }
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Whether a run in `state` will want to know the remote at all.
pub const fn needs_remote(state: RepoState) -> bool {
    !matches!(state, RepoState::RepoWithCommits)
}

/// The git operations that bring `state` to a committed repository.
///
/// An existing history is never touched, whatever the remote says.
pub fn plan_git(state: RepoState, commit_message: &str, remote: &RemoteUrl) -> Vec<GitOpKind> {
    let mut ops = Vec::new();
    match state {
        RepoState::RepoWithCommits => return ops,
        RepoState::NoRepo => ops.push(GitOpKind::Init),
        RepoState::RepoNoCommits => {}
    }

    ops.push(GitOpKind::AddAll);
    ops.push(GitOpKind::Commit {
        message: commit_message.to_string(),
    });

    if let Some(url) = remote.as_url() {
        ops.push(GitOpKind::AddRemote {
            url: url.to_string(),
        });
        ops.push(GitOpKind::PushAll);
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    const MSG: &str = "Project setup";

    #[test]
    fn state_is_derived_from_observations() {
        assert_eq!(RepoState::detect(false, false), RepoState::NoRepo);
        assert_eq!(RepoState::detect(false, true), RepoState::NoRepo);
        assert_eq!(RepoState::detect(true, false), RepoState::RepoNoCommits);
        assert_eq!(RepoState::detect(true, true), RepoState::RepoWithCommits);
    }

    #[test]
    fn blank_and_skip_mean_no_remote() {
        assert_eq!(RemoteUrl::parse(""), RemoteUrl::Skip);
        assert_eq!(RemoteUrl::parse("  "), RemoteUrl::Skip);
        assert_eq!(RemoteUrl::parse("SKIP"), RemoteUrl::Skip);
        assert_eq!(
            RemoteUrl::parse(" git@example.test:me/blog.git "),
            RemoteUrl::Url("git@example.test:me/blog.git".into())
        );
    }

    #[test]
    fn fresh_directory_with_remote_runs_full_sequence() {
        let remote = RemoteUrl::parse("https://example.test/repo.git");
        assert_eq!(
            plan_git(RepoState::NoRepo, MSG, &remote),
            vec![
                GitOpKind::Init,
                GitOpKind::AddAll,
                GitOpKind::Commit {
                    message: MSG.into()
                },
                GitOpKind::AddRemote {
                    url: "https://example.test/repo.git".into()
                },
                GitOpKind::PushAll,
            ]
        );
    }

    #[test]
    fn empty_repo_without_remote_only_commits() {
        assert_eq!(
            plan_git(RepoState::RepoNoCommits, MSG, &RemoteUrl::Skip),
            vec![
                GitOpKind::AddAll,
                GitOpKind::Commit {
                    message: MSG.into()
                }
            ]
        );
    }

    #[test]
    fn existing_history_is_left_alone() {
        let remote = RemoteUrl::parse("https://example.test/repo.git");
        assert!(plan_git(RepoState::RepoWithCommits, MSG, &remote).is_empty());
        assert!(!needs_remote(RepoState::RepoWithCommits));
        assert!(needs_remote(RepoState::NoRepo));
    }
}
