use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use leavedesk_core::{BalanceError, EmployeeProfile, EngineConfig, LeaveRequest, compute_balance};
use leavedesk_sync::ApiClient;

mod display;

#[derive(Parser)]
#[command(name = "leavedesk", version, about = "Institute leave balance tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ReportArgs {
    /// Compute as of this date instead of today (YYYY-MM-DD).
    #[arg(long)]
    as_of: Option<NaiveDate>,
    /// Apportion pending half-days across buckets the way approved ones are.
    #[arg(long)]
    apportion_pending: bool,
    /// Emit the raw report as JSON instead of the card.
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a balance report from local JSON files.
    Balance {
        /// Employee profile JSON (joining_date, position, department).
        #[arg(long)]
        profile: PathBuf,
        /// Leave records JSON array.
        #[arg(long)]
        leaves: PathBuf,
        #[command(flatten)]
        report: ReportArgs,
    },
    /// Pull the profile and leave records from the backend, then compute.
    Fetch {
        /// Employee email to fetch leave records for.
        #[arg(long)]
        email: String,
        /// Backend base URL, e.g. http://localhost:8000.
        #[arg(long, env = "LEAVEDESK_API_URL")]
        api_url: String,
        /// Bearer token for the backend.
        #[arg(long, env = "LEAVEDESK_TOKEN")]
        token: Option<String>,
        #[command(flatten)]
        report: ReportArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("leavedesk v{}", env!("CARGO_PKG_VERSION"));
    let cli = Cli::parse();

    match cli.command {
        Command::Balance {
            profile,
            leaves,
            report,
        } => {
            let profile: EmployeeProfile = read_json(&profile)?;
            let leaves: Vec<LeaveRequest> = read_json(&leaves)?;
            render(&profile, &leaves, &report)
        }
        Command::Fetch {
            email,
            api_url,
            token,
            report,
        } => {
            let client = ApiClient::new(api_url, token);
            let profile = client.fetch_profile().await.context("fetching profile")?;
            let leaves = client
                .fetch_leaves(&email)
                .await
                .context("fetching leave records")?;
            render(&profile, &leaves, &report)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn render(
    profile: &EmployeeProfile,
    leaves: &[LeaveRequest],
    args: &ReportArgs,
) -> anyhow::Result<()> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let config = EngineConfig {
        apportion_pending_half_days: args.apportion_pending,
    };

    match compute_balance(profile, leaves, as_of, &config) {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_report(&report);
            }
        }
        // The portal renders this as an informational state, not an error;
        // the CLI does the same.
        Err(BalanceError::MissingJoiningDate) => {
            println!("Joining date not available. Cannot calculate leave balance.");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
