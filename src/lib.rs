//! # gh-org-admin
//!
//! Bulk housekeeping for the repositories of a GitHub organization
//!
//! ## Features
//! - Label reconciliation against a canonical label set
//! - `master` to `main` default branch renaming
//! - Repository selection by name, namespace + regex, local git remote or list file

pub mod branch;
pub mod config;
pub mod diff;
pub mod error;
pub mod github;
pub mod logging;
pub mod reconcile;
pub mod remote;
pub mod resolver;

pub use branch::BranchRenamer;
pub use config::{wanted_labels, Label, LabelsOptions};
pub use diff::{diff_labels, LabelDiff};
pub use error::{Error, Result};
pub use github::{GitHubClient, GitHubService};
pub use reconcile::LabelReconciler;
pub use resolver::{resolve_repositories, RepoSelector};

/// Reconcile the labels of a single repository
///
/// Prints the report to stdout and applies changes allowed by `options`.
///
/// # Examples
///
/// ```rust,no_run
/// use gh_org_admin::{wanted_labels, GitHubClient, LabelsOptions};
///
/// #[tokio::main]
/// async fn main() -> gh_org_admin::Result<()> {
///     let client = GitHubClient::new("your_github_token").await?;
///     let options = LabelsOptions {
///         fix_labels: true,
///         delete_labels: false,
///     };
///
///     let outcome = gh_org_admin::reconcile_repository_labels(
///         &client,
///         "owner/repo",
///         wanted_labels(),
///         options,
///     )
///     .await?;
///
///     println!("Reconciled: {:?}", outcome);
///     Ok(())
/// }
/// ```
pub async fn reconcile_repository_labels<C: GitHubService + ?Sized>(
    client: &C,
    repository: &str,
    labels: Vec<Label>,
    options: LabelsOptions,
) -> Result<reconcile::RepositoryOutcome> {
    config::parse_repository(repository)?;

    let reconciler = LabelReconciler::new(client, labels, options);
    reconciler
        .reconcile_repository(repository, &mut std::io::stdout())
        .await
}
