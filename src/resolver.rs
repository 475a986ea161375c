//! Repository Resolver
//!
//! Turns the selected input mode into an ordered list of `owner/name`
//! repository identifiers

use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::config::parse_repository;
use crate::error::{Error, Result};
use crate::github::GitHubService;

/// Regex used when a namespace is selected without a filter
pub const DEFAULT_REPO_REGEX: &str = ".*";

/// How the set of target repositories is selected
#[derive(Debug, Clone)]
pub enum RepoSelector {
    /// A single repository in "owner/name" format
    Single(String),

    /// Every repository of a namespace whose name matches `regex`
    Namespace { namespace: String, regex: Regex },

    /// A repository list loaded from a URL or a local file
    ListSource(String),
}

impl RepoSelector {
    /// Select a single repository
    ///
    /// # Errors
    /// Returns an error if `repo` is not in "owner/name" format
    pub fn single(repo: impl Into<String>) -> Result<Self> {
        let repo = repo.into();
        parse_repository(&repo)?;
        Ok(Self::Single(repo))
    }

    /// Select a namespace, optionally filtered by a regex (default `.*`)
    ///
    /// # Errors
    /// Returns an error if the namespace is empty or the regex does not compile
    pub fn namespace(namespace: impl Into<String>, repo_regex: Option<&str>) -> Result<Self> {
        let namespace = namespace.into();
        if namespace.trim().is_empty() || namespace.contains('/') {
            return Err(Error::config_validation(format!(
                "Invalid namespace: {namespace:?}"
            )));
        }

        let regex = Regex::new(repo_regex.unwrap_or(DEFAULT_REPO_REGEX))?;
        Ok(Self::Namespace { namespace, regex })
    }
}

/// Entry of a mapping-style repository list
#[derive(Debug, Deserialize)]
struct ManagedEntry {
    github: String,
}

/// Supported repository list layouts
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RepositoryList {
    /// `key: { github: owner/name }`
    Mapping(serde_yaml::Mapping),

    /// `- owner/name`
    Sequence(Vec<String>),
}

/// Resolve the selector into repository identifiers
///
/// # Errors
/// Returns an error if listing or loading fails, or an identifier is malformed
pub async fn resolve_repositories<C>(selector: &RepoSelector, client: &C) -> Result<Vec<String>>
where
    C: GitHubService + ?Sized,
{
    let repositories = match selector {
        RepoSelector::Single(repo) => vec![repo.clone()],
        RepoSelector::Namespace { namespace, regex } => {
            let names = client.list_repositories(namespace).await?;
            let total = names.len();
            let selected: Vec<String> = names
                .into_iter()
                .filter(|name| regex.is_match(name))
                .map(|name| format!("{namespace}/{name}"))
                .collect();
            debug!(
                namespace = %namespace,
                regex = %regex,
                total,
                selected = selected.len(),
                "Filtered namespace repositories"
            );
            selected
        }
        RepoSelector::ListSource(location) => load_repository_list(location).await?,
    };

    info!(count = repositories.len(), "Resolved target repositories");
    Ok(repositories)
}

/// Load a repository list from an http(s) URL or a local file
///
/// # Errors
/// Returns an error if fetching, reading or parsing fails
pub async fn load_repository_list(location: &str) -> Result<Vec<String>> {
    let content = match Url::parse(location) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            debug!(url = %url, "Fetching repository list");
            reqwest::get(url).await?.error_for_status()?.text().await?
        }
        _ => {
            debug!(path = location, "Reading repository list");
            let path = Path::new(location);
            if !path.exists() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Repository list not found: {location}"),
                )
                .into());
            }
            std::fs::read_to_string(path)?
        }
    };

    parse_repository_list(&content)
}

/// Parse a YAML repository list
///
/// Accepts a mapping of `key -> { github: owner/name }` (order preserved) or
/// a sequence of `owner/name` strings.
///
/// # Errors
/// Returns an error if the content is not one of those layouts or an
/// identifier is not in "owner/name" format
pub fn parse_repository_list(content: &str) -> Result<Vec<String>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let repositories = match serde_yaml::from_str::<RepositoryList>(content)? {
        RepositoryList::Sequence(repositories) => repositories,
        RepositoryList::Mapping(mapping) => mapping
            .into_iter()
            .map(|(key, value)| {
                let key = key.as_str().unwrap_or("<non-string key>").to_string();
                serde_yaml::from_value::<ManagedEntry>(value)
                    .map(|entry| entry.github)
                    .map_err(|e| {
                        Error::config_validation(format!(
                            "Repository list entry {key:?} has no usable 'github' field: {e}"
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    for repo in &repositories {
        parse_repository(repo)?;
    }

    Ok(repositories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::mock::{Call, MockGitHub};

    #[tokio::test]
    async fn test_single_selector() {
        let github = MockGitHub::default();
        let selector = RepoSelector::single("voxpupuli/puppet-nginx").unwrap();

        let repos = resolve_repositories(&selector, &github).await.unwrap();
        assert_eq!(repos, vec!["voxpupuli/puppet-nginx"]);
        assert!(github.calls().is_empty());
    }

    #[test]
    fn test_single_selector_rejects_bad_format() {
        assert!(RepoSelector::single("puppet-nginx").is_err());
    }

    #[tokio::test]
    async fn test_namespace_default_regex_selects_all() {
        let github = MockGitHub::default()
            .with_namespace("voxpupuli", &["puppet-nginx", "puppet-redis", "modulesync"]);
        let selector = RepoSelector::namespace("voxpupuli", None).unwrap();

        let repos = resolve_repositories(&selector, &github).await.unwrap();
        assert_eq!(
            repos,
            vec![
                "voxpupuli/puppet-nginx",
                "voxpupuli/puppet-redis",
                "voxpupuli/modulesync",
            ]
        );
        assert_eq!(
            github.calls(),
            vec![Call::ListRepositories("voxpupuli".to_string())]
        );
    }

    #[tokio::test]
    async fn test_namespace_regex_filters() {
        let github = MockGitHub::default()
            .with_namespace("voxpupuli", &["puppet-nginx", "puppet-redis", "modulesync"]);
        let selector = RepoSelector::namespace("voxpupuli", Some("^puppet-")).unwrap();

        let repos = resolve_repositories(&selector, &github).await.unwrap();
        assert_eq!(repos, vec!["voxpupuli/puppet-nginx", "voxpupuli/puppet-redis"]);
    }

    #[tokio::test]
    async fn test_namespace_regex_is_unanchored() {
        let github = MockGitHub::default()
            .with_namespace("voxpupuli", &["puppet-nginx", "puppet-redis"]);
        let selector = RepoSelector::namespace("voxpupuli", Some("redis")).unwrap();

        let repos = resolve_repositories(&selector, &github).await.unwrap();
        assert_eq!(repos, vec!["voxpupuli/puppet-redis"]);
    }

    #[test]
    fn test_namespace_rejects_invalid_input() {
        assert!(RepoSelector::namespace("voxpupuli", Some("(")).is_err());
        assert!(RepoSelector::namespace("", None).is_err());
        assert!(RepoSelector::namespace("owner/repo", None).is_err());
    }

    #[tokio::test]
    async fn test_unknown_namespace_propagates() {
        let github = MockGitHub::default();
        let selector = RepoSelector::namespace("nobody", None).unwrap();

        let err = resolve_repositories(&selector, &github).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_parse_mapping_list_preserves_order() {
        let content = "\
puppet-redis:
  github: voxpupuli/puppet-redis
puppet-nginx:
  github: voxpupuli/puppet-nginx
";
        let repos = parse_repository_list(content).unwrap();
        assert_eq!(repos, vec!["voxpupuli/puppet-redis", "voxpupuli/puppet-nginx"]);
    }

    #[test]
    fn test_parse_sequence_list() {
        let content = "- voxpupuli/puppet-nginx\n- theforeman/puppet-foreman\n";
        let repos = parse_repository_list(content).unwrap();
        assert_eq!(repos, vec!["voxpupuli/puppet-nginx", "theforeman/puppet-foreman"]);
    }

    #[test]
    fn test_parse_list_rejects_missing_github_field() {
        let content = "puppet-nginx:\n  url: https://example.com\n";
        let err = parse_repository_list(content).unwrap_err();
        assert!(err.to_string().contains("puppet-nginx"));
    }

    #[test]
    fn test_parse_list_rejects_bad_identifier() {
        assert!(parse_repository_list("- puppet-nginx\n").is_err());
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_repository_list("").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_source_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("managed_modules.yml");
        std::fs::write(&path, "- voxpupuli/puppet-nginx\n").unwrap();

        let github = MockGitHub::default();
        let selector = RepoSelector::ListSource(path.display().to_string());
        let repos = resolve_repositories(&selector, &github).await.unwrap();
        assert_eq!(repos, vec!["voxpupuli/puppet-nginx"]);
    }

    #[tokio::test]
    async fn test_list_source_missing_file() {
        assert!(load_repository_list("/nonexistent/managed_modules.yml")
            .await
            .is_err());
    }
}
