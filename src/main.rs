//! labelver - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use labelver::config::{CONFIG_FILE, Config};
use labelver::github::{GitHubSource, RepoSlug, get_github_token, parse_github_remote};
use labelver::release::{
    GitActions, Orchestrator, PipelineOptions, ShellExecutor, run_increment, run_refresh,
};

/// Version and changelog management driven by pull request labels.
#[derive(Parser, Debug)]
#[command(name = "labelver")]
#[command(about = "Version and changelog management driven by pull request labels")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// GitHub repository as owner/name (defaults to the configured remote)
    #[arg(long, global = true)]
    repo: Option<RepoSlug>,

    /// Show what would happen without changing anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Treat unlabeled changes as internal instead of patch
    #[arg(long, global = true)]
    abort_on_missing_label: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Release the latest merged change if its label calls for one
    Increment,
    /// Rebuild the changelog and version from the full history
    Refresh,
    /// Fail unless a pull request carries a recognized version label
    Check {
        /// Pull request number
        pr: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if cli.abort_on_missing_label {
        config.abort_on_missing_label = true;
    }

    let executor = ShellExecutor;
    let slug = match cli.repo {
        Some(slug) => slug,
        None => {
            let url = GitActions::new(&executor, &config.remote, &config.branch)
                .remote_url()
                .with_context(|| format!("No '{}' remote found", config.remote))?;
            parse_github_remote(&url).context("Could not parse GitHub remote URL")?
        }
    };

    let token = get_github_token().context("GitHub authentication required")?;
    let source = GitHubSource::new(&token, &slug.owner, &slug.name, &config.branch)
        .context("Failed to create GitHub client")?;

    let options = PipelineOptions {
        dry_run: cli.dry_run,
        today: Utc::now().date_naive(),
    };

    match cli.command {
        Command::Increment => {
            run_increment(&source, &executor, &config, options)
                .await
                .context("Release failed")?;
        }
        Command::Refresh => {
            run_refresh(&source, &config, options)
                .await
                .context("Refresh failed")?;
        }
        Command::Check { pr } => {
            match Orchestrator::new(&source, &config).check(pr).await {
                Ok(directive) => println!("#{}: {}", pr, directive),
                Err(e) => bail!("#{}: {}", pr, e),
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "labelver=debug" } else { "labelver=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
