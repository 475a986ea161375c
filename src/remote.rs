//! Local git remote detection
//!
//! Infers the `owner/name` of a GitHub repository from the remotes of the
//! local checkout.

use std::path::Path;
use std::sync::OnceLock;

use git2::Repository;
use regex::Regex;
use tracing::debug;

use crate::error::Result;

/// Remotes tried, in order, when guessing the primary remote
pub const PRIMARY_REMOTES: &[&str] = &["upstream", "origin"];

fn remote_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([\w.-]+/[\w.-]+?)(?:\.git)?/?$").expect("remote URL pattern is valid")
    })
}

/// Extract `owner/name` from a remote URL
///
/// Handles SSH (`git@github.com:owner/name.git`) and HTTPS
/// (`https://github.com/owner/name`) forms.
pub fn repository_from_url(url: &str) -> Option<String> {
    remote_url_pattern()
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Look up the repository behind a named remote of the checkout at `path`
///
/// Returns `Ok(None)` when `path` is not inside a git repository, the remote
/// does not exist, or its URL cannot be parsed.
///
/// # Errors
/// Returns an error for git failures other than a missing repository or remote
pub fn remote_repository_at(path: &Path, remote_name: &str) -> Result<Option<String>> {
    let repo = match Repository::discover(path) {
        Ok(repo) => repo,
        Err(e) if e.code() == git2::ErrorCode::NotFound => {
            debug!(path = %path.display(), "Not inside a git repository");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let remote = match repo.find_remote(remote_name) {
        Ok(remote) => remote,
        Err(e) if matches!(e.code(), git2::ErrorCode::NotFound | git2::ErrorCode::InvalidSpec) => {
            debug!(remote = remote_name, "Remote not configured");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let resolved = remote.url().and_then(repository_from_url);
    debug!(remote = remote_name, repository = ?resolved, "Resolved remote");
    Ok(resolved)
}

/// Look up the repository behind a named remote of the current directory
///
/// # Errors
/// See [`remote_repository_at`]
pub fn remote_repository(remote_name: &str) -> Result<Option<String>> {
    remote_repository_at(&std::env::current_dir()?, remote_name)
}

/// Guess the primary repository of the checkout at `path`
///
/// Tries `upstream` first, then `origin`.
///
/// # Errors
/// See [`remote_repository_at`]
pub fn primary_remote_at(path: &Path) -> Result<Option<String>> {
    for name in PRIMARY_REMOTES {
        if let Some(repository) = remote_repository_at(path, name)? {
            return Ok(Some(repository));
        }
    }
    Ok(None)
}

/// Guess the primary repository of the current directory
///
/// # Errors
/// See [`remote_repository_at`]
pub fn primary_remote() -> Result<Option<String>> {
    primary_remote_at(&std::env::current_dir()?)
}
