use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

mod directory;
mod http;
mod provision;
mod report;
mod teams;

use directory::DirectoryClient;
use provision::Provisioner;
use teams::TeamsClient;

#[derive(Parser)]
#[command(name = "rosterctl", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision teams from a CSV roster
    Provision {
        /// Path to the roster CSV (team,user,role)
        #[arg(value_name = "FILE")]
        roster: PathBuf,

        /// Resolve and report without issuing any mutating call
        #[arg(long)]
        dry_run: bool,

        /// Directory service base URL (default: ROSTERCTL_DIRECTORY_URL)
        #[arg(long, value_name = "URL")]
        directory_url: Option<String>,

        /// Teams service base URL (default: ROSTERCTL_TEAMS_URL)
        #[arg(long, value_name = "URL")]
        teams_url: Option<String>,
    },
    /// Validate a roster file without touching the network
    Validate {
        /// Path to the roster CSV (team,user,role)
        #[arg(value_name = "FILE")]
        roster: PathBuf,
    },
    /// Print version and exit
    Version,
}

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Provision {
            roster,
            dry_run,
            directory_url,
            teams_url,
        } => {
            if let Err(e) = run_provision(&roster, dry_run, directory_url, teams_url) {
                eprintln!("Error provisioning roster: {:?}", e);
                std::process::exit(1);
            }
        }
        Commands::Validate { roster } => {
            if let Err(e) = run_validate(&roster) {
                eprintln!("Invalid roster: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}

fn run_provision(
    roster_path: &Path,
    dry_run: bool,
    directory_url: Option<String>,
    teams_url: Option<String>,
) -> Result<()> {
    let records = roster::load_roster(roster_path)?;
    let plans = roster::group_by_team(&records)?;
    tracing::info!(
        "Roster has {} rows across {} teams",
        records.len(),
        plans.len()
    );

    let directory_token = std::env::var("ROSTERCTL_DIRECTORY_TOKEN")
        .context("ROSTERCTL_DIRECTORY_TOKEN is required")?;
    let teams_token =
        std::env::var("ROSTERCTL_TEAMS_TOKEN").context("ROSTERCTL_TEAMS_TOKEN is required")?;

    let directory = DirectoryClient::new(directory_url.as_deref(), &directory_token)?;
    let teams = TeamsClient::new(teams_url.as_deref(), &teams_token)?;

    let mut provisioner = Provisioner::new(&directory, &teams, dry_run);
    let result = provisioner.run(&plans)?;

    if dry_run {
        println!("Dry run - no changes were applied.\n");
    }
    println!("{}", report::render_report(&result));
    println!("\n{}", report::render_summary(&result));

    if result.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_validate(roster_path: &Path) -> Result<()> {
    let records = roster::load_roster(roster_path)?;
    let plans = roster::group_by_team(&records)?;

    println!("{}", report::render_plans(&plans));
    println!(
        "\nRoster OK: {} rows across {} teams",
        records.len(),
        plans.len()
    );
    Ok(())
}
