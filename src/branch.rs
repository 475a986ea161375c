//! Default Branch Renaming
//!
//! Renames `master` to `main` across a list of repositories

use std::io::Write;

use colored::Colorize;
use tracing::debug;

use crate::error::Result;
use crate::github::GitHubService;

/// Branch that gets renamed
pub const OLD_BRANCH: &str = "master";

/// Name it gets renamed to
pub const NEW_BRANCH: &str = "main";

/// What happened to one repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// `master` was renamed to `main`
    Renamed,

    /// Looking up `master` already resolves to `main`
    AlreadyMain,

    SkippedFork,

    SkippedArchived,

    /// The repository or its `master` branch does not exist
    NotFound,
}

/// Per-repository outcomes of a rename run, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameSummary {
    pub results: Vec<(String, RenameOutcome)>,
}

impl RenameSummary {
    /// Number of repositories with the given outcome
    pub fn count(&self, outcome: RenameOutcome) -> usize {
        self.results.iter().filter(|(_, o)| *o == outcome).count()
    }
}

/// Branch Renamer
///
/// A not-found error only ends processing of the repository it occurred in.
/// Every other error aborts the run.
pub struct BranchRenamer<'a, C: GitHubService + ?Sized> {
    client: &'a C,
}

impl<'a, C: GitHubService + ?Sized> BranchRenamer<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Rename the default branch of every repository in order
    ///
    /// # Errors
    /// Returns the first error that is not a not-found error
    pub async fn run<W: Write>(&self, repositories: &[String], out: &mut W) -> Result<RenameSummary> {
        let mut summary = RenameSummary::default();

        for repository in repositories {
            let outcome = match self.rename_repository(repository, out).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_not_found() => {
                    debug!(repo = %repository, error = %e, "Ignoring missing resource");
                    RenameOutcome::NotFound
                }
                Err(e) => return Err(e),
            };
            summary.results.push((repository.clone(), outcome));
        }

        Ok(summary)
    }

    /// Rename `master` to `main` in one repository
    ///
    /// # Errors
    /// Returns an error if any GitHub call fails, including not-found errors
    pub async fn rename_repository<W: Write>(&self, repo: &str, out: &mut W) -> Result<RenameOutcome> {
        let handle = self.client.get_repository(repo).await?;
        if handle.is_fork {
            debug!(repo = %handle.identifier, "Skipping fork");
            return Ok(RenameOutcome::SkippedFork);
        }
        if handle.is_archived {
            debug!(repo = %handle.identifier, "Skipping archived repository");
            return Ok(RenameOutcome::SkippedArchived);
        }

        let branch = self.client.get_branch(repo, OLD_BRANCH).await?;
        if branch.name == NEW_BRANCH {
            debug!(repo, "Already renamed");
            return Ok(RenameOutcome::AlreadyMain);
        }

        self.client
            .rename_branch(repo, OLD_BRANCH, NEW_BRANCH)
            .await?;
        writeln!(
            out,
            "{}: {} -> {}",
            repo,
            OLD_BRANCH,
            NEW_BRANCH.green()
        )?;

        Ok(RenameOutcome::Renamed)
    }
}
