//! Label Reconciliation
//!
//! Drives the label differ over a list of repositories, printing a report for
//! each one and applying changes when requested

use std::io::Write;

use colored::Colorize;
use tracing::{debug, info};

use crate::config::{Label, LabelsOptions};
use crate::diff::{diff_labels, LabelDiff};
use crate::error::Result;
use crate::github::GitHubService;

/// What happened to one repository during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOutcome {
    /// Forks are never touched
    SkippedFork,

    /// Archived repositories are read-only
    SkippedArchived,

    /// Labels were compared and, depending on options, changed
    Reconciled {
        diff: LabelDiff,
        deleted: usize,
        updated: usize,
        created: usize,
    },
}

/// Outcome for a named repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryResult {
    /// Repository in "owner/name" format
    pub repository: String,

    /// What happened
    pub outcome: RepositoryOutcome,
}

/// Per-repository outcomes of a run, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub results: Vec<RepositoryResult>,
}

impl RunSummary {
    /// Number of repositories skipped as forks or archived
    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !matches!(r.outcome, RepositoryOutcome::Reconciled { .. }))
            .count()
    }

    /// Number of repositories whose labels were compared
    pub fn reconciled(&self) -> usize {
        self.results.len() - self.skipped()
    }

    /// Total `(deleted, updated, created)` labels across the run
    pub fn changes(&self) -> (usize, usize, usize) {
        self.results
            .iter()
            .fold((0, 0, 0), |acc, result| match &result.outcome {
                RepositoryOutcome::Reconciled {
                    deleted,
                    updated,
                    created,
                    ..
                } => (acc.0 + deleted, acc.1 + updated, acc.2 + created),
                _ => acc,
            })
    }
}

/// Label Reconciliation Driver
///
/// Processes repositories one at a time. Any API error aborts the run.
pub struct LabelReconciler<'a, C: GitHubService + ?Sized> {
    client: &'a C,
    wanted: Vec<Label>,
    options: LabelsOptions,
}

impl<'a, C: GitHubService + ?Sized> LabelReconciler<'a, C> {
    /// Create a new reconciler
    ///
    /// # Arguments
    /// - `client`: GitHub service used for all reads and writes
    /// - `wanted`: Canonical label set
    /// - `options`: Which mutations are allowed
    pub fn new(client: &'a C, wanted: Vec<Label>, options: LabelsOptions) -> Self {
        Self {
            client,
            wanted,
            options,
        }
    }

    /// Reconcile every repository in order
    ///
    /// # Errors
    /// Returns the first API or output error encountered
    pub async fn run<W: Write>(&self, repositories: &[String], out: &mut W) -> Result<RunSummary> {
        let names: Vec<&str> = self.wanted.iter().map(|l| l.name.as_str()).collect();
        writeln!(
            out,
            "Checking for the following labels: [{}]",
            names.join(", ")
        )?;

        let mut summary = RunSummary::default();
        for repository in repositories {
            let outcome = self.reconcile_repository(repository, out).await?;
            summary.results.push(RepositoryResult {
                repository: repository.clone(),
                outcome,
            });
        }

        Ok(summary)
    }

    /// Reconcile a single repository
    ///
    /// # Errors
    /// Returns an error if any GitHub call or writing the report fails
    pub async fn reconcile_repository<W: Write>(
        &self,
        repo: &str,
        out: &mut W,
    ) -> Result<RepositoryOutcome> {
        let handle = self.client.get_repository(repo).await?;
        if handle.is_fork {
            debug!(repo = %handle.identifier, "Skipping fork");
            return Ok(RepositoryOutcome::SkippedFork);
        }
        if handle.is_archived {
            debug!(repo = %handle.identifier, "Skipping archived repository");
            return Ok(RepositoryOutcome::SkippedArchived);
        }

        let current = self.client.list_labels(repo).await?;
        let diff = diff_labels(&self.wanted, &current);

        writeln!(out, "{} {}, {}", "Delete:".red(), repo, label_names(&diff.extra))?;
        writeln!(out, "{} {}, {}", "Create:".green(), repo, label_names(&diff.missing))?;
        writeln!(out, "{} {}, {}", "Fix:".yellow(), repo, label_names(&diff.incorrect))?;

        let mut deleted = 0;
        if self.options.delete_labels {
            for label in &diff.extra {
                self.client.delete_label(repo, &label.name).await?;
                deleted += 1;
            }
        }

        let (mut updated, mut created) = (0, 0);
        if self.options.fix_labels {
            for label in &diff.incorrect {
                self.client.update_label(repo, label).await?;
                updated += 1;
            }
            for label in &diff.missing {
                self.client.create_label(repo, label).await?;
                created += 1;
            }
        }

        if deleted + updated + created > 0 {
            info!(repo, deleted, updated, created, "Applied label changes");
        }

        Ok(RepositoryOutcome::Reconciled {
            diff,
            deleted,
            updated,
            created,
        })
    }
}

/// Render label names as `[a, b]`
fn label_names(labels: &[Label]) -> String {
    let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
    format!("[{}]", names.join(", "))
}
