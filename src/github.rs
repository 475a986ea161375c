//! GitHub API Client
//!
//! The [`GitHubService`] seam used by the drivers and its octocrab-backed
//! implementation

use async_trait::async_trait;
use octocrab::models::Repository;
use octocrab::{Octocrab, Page};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{parse_repository, Label};
use crate::error::{Error, Result};

/// Labels requested per page
const LABELS_PER_PAGE: u8 = 100;

/// Repositories requested per page
const REPOS_PER_PAGE: u8 = 100;

/// Encode a string for use in URL path segments (RFC 3986 with UTF-8 support)
///
/// Only unreserved characters (A-Z, a-z, 0-9, -, ., _, ~) are left unencoded.
fn encode_path_segment(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~' => c.to_string(),
            _ => c
                .to_string()
                .bytes()
                .map(|b| format!("%{:02X}", b))
                .collect::<String>(),
        })
        .collect()
}

/// Check if an octocrab error is a 404 response
///
/// The message varies by endpoint ("Not Found", "Branch not found"), so only
/// the status code is reliable.
fn is_not_found_error(err: &octocrab::Error) -> bool {
    match err {
        octocrab::Error::GitHub { source, .. } => source.status_code.as_u16() == 404,
        _ => false,
    }
}

/// Map an octocrab error, surfacing 404s as [`Error::NotFound`]
fn map_api_error(err: octocrab::Error, resource: impl FnOnce() -> String) -> Error {
    if is_not_found_error(&err) {
        Error::NotFound(resource())
    } else {
        Error::GitHubApi(err)
    }
}

/// Repository Handle
///
/// The repository attributes the drivers need to decide whether to act
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    /// Full name in "owner/name" format
    pub identifier: String,

    /// Whether the repository is a fork
    pub is_fork: bool,

    /// Whether the repository is archived
    pub is_archived: bool,
}

/// Branch metadata as returned by the branches endpoint
///
/// Looking up a renamed branch follows the rename, so `name` may differ from
/// the name that was requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchInfo {
    /// Branch name
    pub name: String,
}

/// Rate Limit Information
///
/// Represents GitHub API rate limit status
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Hourly limit
    pub limit: u32,

    /// Remaining usage count
    pub remaining: u32,

    /// Reset time
    pub reset_at: chrono::DateTime<chrono::Utc>,
}

/// Operations the organization tools need from GitHub
///
/// Repository arguments are full names in "owner/name" format. A missing
/// resource is reported as [`Error::NotFound`].
#[async_trait]
pub trait GitHubService: Send + Sync {
    /// List repository names (without owner) under a namespace
    async fn list_repositories(&self, namespace: &str) -> Result<Vec<String>>;

    /// Fetch fork/archived status of a repository
    async fn get_repository(&self, repo: &str) -> Result<RepositoryHandle>;

    /// Fetch all labels of a repository
    async fn list_labels(&self, repo: &str) -> Result<Vec<Label>>;

    /// Create a label
    async fn create_label(&self, repo: &str, label: &Label) -> Result<()>;

    /// Update color and description of the label with the same name
    async fn update_label(&self, repo: &str, label: &Label) -> Result<()>;

    /// Delete a label by name
    async fn delete_label(&self, repo: &str, name: &str) -> Result<()>;

    /// Fetch branch metadata
    async fn get_branch(&self, repo: &str, branch: &str) -> Result<BranchInfo>;

    /// Rename a branch
    async fn rename_branch(&self, repo: &str, from: &str, to: &str) -> Result<()>;
}

/// GitHub API Client
///
/// Octocrab-backed [`GitHubService`]
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// # Arguments
    /// - `access_token`: GitHub access token
    ///
    /// # Errors
    /// Returns an error if client initialization or the authentication check fails
    pub async fn new(access_token: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(access_token.to_string())
            .build()?;

        let user = octocrab
            .current()
            .user()
            .await
            .map_err(|_| Error::AuthenticationFailed)?;
        info!(login = %user.login, "Authenticated with GitHub");

        Ok(Self { octocrab })
    }

    /// Get rate limit information
    ///
    /// # Errors
    /// Returns an error if the GitHub API call fails
    pub async fn rate_limit(&self) -> Result<RateLimitInfo> {
        let rate_limit = self.octocrab.ratelimit().get().await?;

        Ok(RateLimitInfo {
            limit: rate_limit.resources.core.limit as u32,
            remaining: rate_limit.resources.core.remaining as u32,
            reset_at: chrono::DateTime::from_timestamp(rate_limit.resources.core.reset as i64, 0)
                .unwrap_or_else(chrono::Utc::now),
        })
    }

    /// List user repositories, used when the namespace is not an organization
    async fn list_user_repositories(&self, namespace: &str) -> Result<Vec<Repository>> {
        let route = format!("/users/{}/repos", encode_path_segment(namespace));
        let per_page = REPOS_PER_PAGE.to_string();
        let first: Page<Repository> = self
            .octocrab
            .get(route, Some(&[("per_page", per_page.as_str())]))
            .await
            .map_err(|e| map_api_error(e, || format!("namespace {namespace}")))?;

        Ok(self.octocrab.all_pages(first).await?)
    }
}

#[async_trait]
impl GitHubService for GitHubClient {
    async fn list_repositories(&self, namespace: &str) -> Result<Vec<String>> {
        let org_page = self
            .octocrab
            .orgs(namespace)
            .list_repos()
            .per_page(REPOS_PER_PAGE)
            .send()
            .await;

        let repositories = match org_page {
            Ok(first) => self.octocrab.all_pages(first).await?,
            Err(e) if is_not_found_error(&e) => {
                debug!(namespace, "Not an organization, listing user repositories");
                self.list_user_repositories(namespace).await?
            }
            Err(e) => return Err(Error::GitHubApi(e)),
        };

        debug!(namespace, count = repositories.len(), "Listed repositories");
        Ok(repositories.into_iter().map(|repo| repo.name).collect())
    }

    async fn get_repository(&self, repo: &str) -> Result<RepositoryHandle> {
        let (owner, name) = parse_repository(repo)?;
        let repository = self
            .octocrab
            .repos(&owner, &name)
            .get()
            .await
            .map_err(|e| map_api_error(e, || format!("repository {repo}")))?;

        Ok(RepositoryHandle {
            identifier: repository.full_name.unwrap_or_else(|| repo.to_string()),
            is_fork: repository.fork.unwrap_or(false),
            is_archived: repository.archived.unwrap_or(false),
        })
    }

    async fn list_labels(&self, repo: &str) -> Result<Vec<Label>> {
        let (owner, name) = parse_repository(repo)?;
        let mut labels = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .octocrab
                .issues(&owner, &name)
                .list_labels_for_repo()
                .page(page)
                .per_page(LABELS_PER_PAGE)
                .send()
                .await
                .map_err(|e| map_api_error(e, || format!("repository {repo}")))?;

            let count = response.items.len();
            labels.extend(response.items.into_iter().map(|label| Label {
                name: label.name,
                color: Label::normalize_color(&label.color),
                description: label.description.unwrap_or_default(),
            }));

            if count < usize::from(LABELS_PER_PAGE) {
                break;
            }
            page += 1;
        }

        debug!(repo, count = labels.len(), "Fetched labels");
        Ok(labels)
    }

    async fn create_label(&self, repo: &str, label: &Label) -> Result<()> {
        let (owner, name) = parse_repository(repo)?;
        self.octocrab
            .issues(&owner, &name)
            .create_label(
                &label.name,
                &Label::normalize_color(&label.color),
                &label.description,
            )
            .await?;

        debug!(repo, label = %label.name, "Created label");
        Ok(())
    }

    async fn update_label(&self, repo: &str, label: &Label) -> Result<()> {
        let (owner, name) = parse_repository(repo)?;
        let route = format!(
            "/repos/{}/{}/labels/{}",
            owner,
            name,
            encode_path_segment(&label.name)
        );
        let body = serde_json::json!({
            "color": Label::normalize_color(&label.color),
            "description": label.description,
        });

        let _: octocrab::models::Label = self
            .octocrab
            .patch(route, Some(&body))
            .await
            .map_err(|e| map_api_error(e, || format!("label {} in {repo}", label.name)))?;

        debug!(repo, label = %label.name, "Updated label");
        Ok(())
    }

    async fn delete_label(&self, repo: &str, label_name: &str) -> Result<()> {
        let (owner, name) = parse_repository(repo)?;
        // Spaces and non-ASCII names must be percent-encoded in the path
        let encoded_name = encode_path_segment(label_name);
        self.octocrab
            .issues(&owner, &name)
            .delete_label(&encoded_name)
            .await
            .map_err(|e| map_api_error(e, || format!("label {label_name} in {repo}")))?;

        debug!(repo, label = label_name, "Deleted label");
        Ok(())
    }

    async fn get_branch(&self, repo: &str, branch: &str) -> Result<BranchInfo> {
        let (owner, name) = parse_repository(repo)?;
        let route = format!(
            "/repos/{}/{}/branches/{}",
            owner,
            name,
            encode_path_segment(branch)
        );

        self.octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| map_api_error(e, || format!("branch {branch} in {repo}")))
    }

    async fn rename_branch(&self, repo: &str, from: &str, to: &str) -> Result<()> {
        let (owner, name) = parse_repository(repo)?;
        let route = format!(
            "/repos/{}/{}/branches/{}/rename",
            owner,
            name,
            encode_path_segment(from)
        );
        let body = serde_json::json!({ "new_name": to });

        let _: BranchInfo = self
            .octocrab
            .post(route, Some(&body))
            .await
            .map_err(|e| map_api_error(e, || format!("branch {from} in {repo}")))?;

        debug!(repo, from, to, "Renamed branch");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("bug"), "bug");
        assert_eq!(encode_path_segment("skip-changelog"), "skip-changelog");

        assert_eq!(
            encode_path_segment("good first issue"),
            "good%20first%20issue"
        );
        assert_eq!(encode_path_segment("help wanted"), "help%20wanted");

        // Non-ASCII names are encoded as UTF-8 bytes
        assert_eq!(encode_path_segment("バグ"), "%E3%83%90%E3%82%B0");

        assert_eq!(
            encode_path_segment("test-label_v1.2~alpha"),
            "test-label_v1.2~alpha"
        );
        assert_eq!(encode_path_segment("test/label"), "test%2Flabel");
        assert_eq!(encode_path_segment("test@label"), "test%40label");
    }

    #[test]
    fn test_branch_info_deserialize() {
        let json = r#"{"name":"main","commit":{"sha":"abc"},"protected":true}"#;
        let branch: BranchInfo = serde_json::from_str(json).unwrap();
        assert_eq!(branch.name, "main");
    }

    /// Serve one canned HTTP response on a local port and return its base URI
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 8192];
            let _ = socket.read(&mut request).await;

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}")
    }

    async fn local_client(status: &'static str, body: &'static str) -> GitHubClient {
        let uri = serve_once(status, body).await;
        let octocrab = Octocrab::builder().base_uri(uri).unwrap().build().unwrap();
        GitHubClient { octocrab }
    }

    #[tokio::test]
    async fn test_missing_branch_maps_to_not_found() {
        let client = local_client(
            "404 Not Found",
            r#"{"message":"Branch not found","documentation_url":"https://docs.github.com/rest/branches/branches#get-a-branch"}"#,
        )
        .await;

        let err = client
            .get_branch("voxpupuli/migrated", "master")
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err}");
        assert!(err.to_string().contains("branch master in voxpupuli/migrated"));
    }

    #[tokio::test]
    async fn test_missing_repository_maps_to_not_found() {
        let client = local_client(
            "404 Not Found",
            r#"{"message":"Not Found","documentation_url":"https://docs.github.com/rest"}"#,
        )
        .await;

        let err = client.list_labels("voxpupuli/gone").await.unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_other_statuses_stay_api_errors() {
        let client = local_client(
            "422 Unprocessable Entity",
            r#"{"message":"Validation Failed","documentation_url":"https://docs.github.com/rest"}"#,
        )
        .await;

        let err = client
            .rename_branch("voxpupuli/puppet-nginx", "master", "main")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GitHubApi(_)), "unexpected error: {err}");
        assert!(!err.is_not_found());

        let message = err.to_string();
        assert!(message.contains("Validation Failed"), "message: {message}");
        assert!(message.contains("422"), "message: {message}");
    }

    #[tokio::test]
    async fn test_repository_handle_uses_canonical_name() {
        let client = local_client(
            "200 OK",
            r#"{"id":1,"name":"Puppet-Nginx","full_name":"voxpupuli/Puppet-Nginx","url":"https://api.github.com/repos/voxpupuli/Puppet-Nginx","fork":true,"archived":false}"#,
        )
        .await;

        let handle = client
            .get_repository("voxpupuli/puppet-nginx")
            .await
            .unwrap();
        assert_eq!(handle.identifier, "voxpupuli/Puppet-Nginx");
        assert!(handle.is_fork);
        assert!(!handle.is_archived);
    }

    #[tokio::test]
    async fn test_forbidden_is_not_not_found() {
        let client = local_client(
            "403 Forbidden",
            r#"{"message":"Must have admin rights to Repository.","documentation_url":"https://docs.github.com/rest"}"#,
        )
        .await;

        let err = client
            .get_branch("voxpupuli/puppet-nginx", "master")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GitHubApi(_)), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_mock_reports_not_found() {
        let github = mock::MockGitHub::default();
        let err = github.get_repository("owner/missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
