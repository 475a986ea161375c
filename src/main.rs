//! gh-org-labels CLI
//!
//! Reconciles repository labels against the canonical label set

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::debug;

use gh_org_admin::{
    config::{load_labels_from_file, resolve_access_token},
    logging::init_tracing,
    reconcile::RunSummary,
    remote::{primary_remote, remote_repository},
    resolve_repositories, wanted_labels, Error, GitHubClient, Label, LabelReconciler,
    LabelsOptions, RepoSelector, Result,
};

/// gh-org-labels CLI
///
/// Reports and fixes label drift across GitHub repositories
#[derive(Parser, Debug)]
#[command(
    name = "gh-org-labels",
    version,
    about = "Reconcile GitHub repository labels against a canonical label set",
    long_about = "Compares the labels of each selected repository with the canonical label set \
    and reports labels to delete, create and fix. Nothing is changed unless --fix-labels or \
    --delete-labels is given. Forks and archived repositories are skipped."
)]
struct Cli {
    /// Add the missing labels and fix incorrect ones
    #[arg(short = 'f', long)]
    fix_labels: bool,

    /// Delete unwanted labels
    #[arg(short = 'd', long)]
    delete_labels: bool,

    /// Name of a GitHub namespace to work on
    #[arg(short = 'n', long, value_name = "NAME")]
    namespace: Option<String>,

    /// Repository name regex, applied within --namespace
    #[arg(short = 'r', long, value_name = "REGEX", requires = "namespace")]
    repo_regex: Option<String>,

    /// Repository (owner/repo), defaults to the primary remote of the current checkout
    #[arg(long, value_name = "REPO", conflicts_with = "remote")]
    repo: Option<Option<String>>,

    /// Name of a local git remote whose repository to work on
    #[arg(long, value_name = "REMOTE")]
    remote: Option<String>,

    /// Repository list (URL or file) used when no repository or namespace is given
    #[arg(short = 'u', long, value_name = "LOCATION")]
    url: Option<String>,

    /// Label file (JSON/YAML) replacing the canonical label set
    #[arg(long, value_name = "PATH")]
    labels_file: Option<PathBuf>,

    /// GitHub access token
    #[arg(short = 't', long)]
    access_token: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> LabelsOptions {
        LabelsOptions {
            fix_labels: self.fix_labels,
            delete_labels: self.delete_labels,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

/// Execute a reconciliation run
async fn run(cli: Cli) -> Result<()> {
    let selector = select_repositories(&cli)?;
    let labels = load_wanted_labels(cli.labels_file.as_deref())?;
    let token = resolve_access_token(cli.access_token.clone())?;

    let client = GitHubClient::new(&token).await?;
    if let Ok(rate_limit) = client.rate_limit().await {
        debug!(
            limit = rate_limit.limit,
            remaining = rate_limit.remaining,
            reset_at = %rate_limit.reset_at,
            "GitHub rate limit"
        );
    }

    let repositories = resolve_repositories(&selector, &client).await?;
    let reconciler = LabelReconciler::new(&client, labels, cli.options());
    let summary = reconciler
        .run(&repositories, &mut std::io::stdout().lock())
        .await?;

    display_summary(&summary, cli.options());
    Ok(())
}

/// Pick the repository selection mode
///
/// An explicit repository or remote wins over a namespace, which wins over a
/// repository list.
fn select_repositories(cli: &Cli) -> Result<RepoSelector> {
    if let Some(repo) = &cli.repo {
        let repo = match repo {
            Some(repo) => repo.clone(),
            None => primary_remote()?.ok_or_else(|| {
                Error::config_validation("Could not guess primary remote. Try using --remote instead.")
            })?,
        };
        return RepoSelector::single(repo);
    }

    if let Some(remote) = &cli.remote {
        let repo = remote_repository(remote)?
            .ok_or_else(|| Error::config_validation(format!("No url set for remote {remote}")))?;
        return RepoSelector::single(repo);
    }

    if let Some(namespace) = &cli.namespace {
        return RepoSelector::namespace(namespace.clone(), cli.repo_regex.as_deref());
    }

    cli.url.clone().map(RepoSelector::ListSource).ok_or_else(|| {
        Error::config_validation(
            "No repositories selected. Use --repo, --remote, --namespace or --url",
        )
    })
}

/// Load the wanted label set
fn load_wanted_labels(path: Option<&std::path::Path>) -> Result<Vec<Label>> {
    match path {
        Some(path) => load_labels_from_file(path),
        None => Ok(wanted_labels()),
    }
}

/// Display run statistics
fn display_summary(summary: &RunSummary, options: LabelsOptions) {
    let (deleted, updated, created) = summary.changes();

    println!(
        "\n{} Processed {} repositories",
        "✓".green(),
        summary.results.len()
    );
    println!("  Reconciled: {}", summary.reconciled().to_string().cyan());
    println!("  Skipped: {}", summary.skipped().to_string().white());

    if options.delete_labels {
        println!("  Deleted: {}", deleted.to_string().red());
    }
    if options.fix_labels {
        println!("  Updated: {}", updated.to_string().yellow());
        println!("  Created: {}", created.to_string().green());
    }
    if !options.delete_labels && !options.fix_labels {
        println!(
            "  {} Report only; use --fix-labels or --delete-labels to apply changes",
            "!".yellow()
        );
    }
}
