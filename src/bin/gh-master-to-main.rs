//! gh-master-to-main CLI
//!
//! Renames the `master` branch to `main` in every repository of a namespace

use clap::Parser;
use colored::Colorize;

use gh_org_admin::{
    branch::{RenameOutcome, RenameSummary},
    config::resolve_access_token,
    logging::init_tracing,
    resolve_repositories, BranchRenamer, GitHubClient, RepoSelector, Result,
};

/// gh-master-to-main CLI
#[derive(Parser, Debug)]
#[command(
    name = "gh-master-to-main",
    version,
    about = "Rename master to main in every repository of a GitHub namespace",
    long_about = "Renames the master branch to main in every repository of the namespace. \
    Forks, archived repositories and repositories without a master branch are left alone."
)]
struct Cli {
    /// Name of a GitHub namespace to work on
    #[arg(short = 'n', long, value_name = "NAME")]
    namespace: String,

    /// GitHub access token
    #[arg(short = 't', long)]
    access_token: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
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

/// Execute a rename run
async fn run(cli: Cli) -> Result<()> {
    let selector = RepoSelector::namespace(cli.namespace, None)?;
    let token = resolve_access_token(cli.access_token)?;
    let client = GitHubClient::new(&token).await?;

    let repositories = resolve_repositories(&selector, &client).await?;
    let summary = BranchRenamer::new(&client)
        .run(&repositories, &mut std::io::stdout().lock())
        .await?;

    if cli.verbose {
        display_summary(&summary);
    }
    Ok(())
}

/// Display run statistics
fn display_summary(summary: &RenameSummary) {
    println!(
        "\n{} Processed {} repositories",
        "✓".green(),
        summary.results.len()
    );
    println!(
        "  Renamed: {}",
        summary.count(RenameOutcome::Renamed).to_string().green()
    );
    println!(
        "  Already on main: {}",
        summary.count(RenameOutcome::AlreadyMain).to_string().white()
    );
    println!(
        "  Skipped: {}",
        (summary.count(RenameOutcome::SkippedFork) + summary.count(RenameOutcome::SkippedArchived))
            .to_string()
            .white()
    );
    println!(
        "  Not found: {}",
        summary.count(RenameOutcome::NotFound).to_string().dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_namespace_is_required() {
        assert!(Cli::try_parse_from(["gh-master-to-main"]).is_err());

        let cli = Cli::try_parse_from(["gh-master-to-main", "--namespace=voxpupuli"]).unwrap();
        assert_eq!(cli.namespace, "voxpupuli");

        let cli = Cli::try_parse_from(["gh-master-to-main", "-n", "voxpupuli"]).unwrap();
        assert_eq!(cli.namespace, "voxpupuli");
    }

    #[test]
    fn test_display_summary() {
        let summary = RenameSummary {
            results: vec![
                ("voxpupuli/a".to_string(), RenameOutcome::Renamed),
                ("voxpupuli/b".to_string(), RenameOutcome::NotFound),
            ],
        };
        // Should not panic
        display_summary(&summary);
    }
}
