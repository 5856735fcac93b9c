use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use modbot_agent::{AgentConfig, Runtime};
use moderation::authz::ActorIdentity;
use moderation::ledger::{CaseRecord, ModAction};
use serde::Serialize;
use tokio::io::BufReader;
use tracing::info;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Identity of the staff member running an administrative command
#[derive(clap::Args, Debug)]
struct ActorArgs {
    /// Actor id
    #[arg(long)]
    actor: String,

    /// Role held by the actor (repeatable)
    #[arg(long = "role")]
    roles: Vec<String>,

    /// The actor owns the community
    #[arg(long, default_value_t = false)]
    owner: bool,

    /// The actor holds administrator permission
    #[arg(long, default_value_t = false)]
    administrator: bool,
}

impl ActorArgs {
    fn identity(&self) -> ActorIdentity {
        ActorIdentity {
            actor_id: self.actor.clone(),
            roles: self.roles.iter().cloned().collect(),
            is_owner: self.owner,
            is_administrator: self.administrator,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run JSON-lines action requests and print one outcome per line
    Apply {
        /// Request file (stdin when absent)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Show one case
    Case { case_number: u64 },
    /// List cases by target, actor or action
    History {
        #[arg(long, conflicts_with_all = ["actor", "action"])]
        target: Option<String>,
        #[arg(long, conflicts_with = "action")]
        actor: Option<String>,
        #[arg(long)]
        action: Option<ModAction>,
    },
    /// Delete a case
    DeleteCase {
        case_number: u64,
        #[command(flatten)]
        by: ActorArgs,
    },
    /// Show a subject's point balance
    Points { subject: String },
    /// Remove points from a subject's balance
    RemovePoints {
        subject: String,
        points: u32,
        #[command(flatten)]
        by: ActorArgs,
    },
    /// Total cases and counts per action
    Stats,
}

#[derive(Serialize)]
struct Stats {
    total_cases: usize,
    by_action: std::collections::BTreeMap<ModAction, usize>,
    next_case_number: u64,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AgentConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let runtime = Runtime::dry_run(&config);
    info!("Moderation agent ready");

    run(&runtime, cli.command).await?;
    runtime.shutdown().await;
    Ok(())
}

async fn run(runtime: &Runtime, command: Command) -> Result<()> {
    let coordinator = runtime.coordinator();
    match command {
        Command::Apply { input } => {
            let stdout = tokio::io::stdout();
            match input {
                Some(path) => {
                    let file = tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("Failed to open {}", path.display()))?;
                    runtime.apply_lines(BufReader::new(file), stdout).await?;
                }
                None => {
                    runtime
                        .apply_lines(BufReader::new(tokio::io::stdin()), stdout)
                        .await?;
                }
            }
        }
        Command::Case { case_number } => match coordinator.case(case_number) {
            Some(record) => print_json(&record)?,
            None => bail!("Case #{} not found", case_number),
        },
        Command::History {
            target,
            actor,
            action,
        } => {
            let records: Vec<CaseRecord> = match (target, actor, action) {
                (Some(target), _, _) => coordinator.cases_for_target(&target),
                (_, Some(actor), _) => coordinator.cases_by_actor(&actor),
                (_, _, Some(action)) => coordinator.cases_by_action(action),
                _ => coordinator.ledger().all_cases(),
            };
            print_json(&records)?;
        }
        Command::DeleteCase { case_number, by } => {
            if coordinator.delete_case(&by.identity(), case_number)? {
                println!("Case #{} deleted", case_number);
            } else {
                bail!("Case #{} not found", case_number);
            }
        }
        Command::Points { subject } => {
            println!("{}: {} points", subject, coordinator.points(&subject));
        }
        Command::RemovePoints {
            subject,
            points,
            by,
        } => {
            let total = coordinator.remove_points(&by.identity(), &subject, points)?;
            println!("{}: {} points", subject, total);
        }
        Command::Stats => {
            let ledger = coordinator.ledger();
            print_json(&Stats {
                total_cases: ledger.total_cases(),
                by_action: ledger.counts_by_action(),
                next_case_number: ledger.peek_next(),
            })?;
        }
    }
    Ok(())
}
