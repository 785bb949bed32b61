//! LinkPulse command line.
//!
//! Each subcommand is one UI trigger against the lead lifecycle core.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use linkpulse_lib::gateway;
use linkpulse_lib::types::{Lead, ScoreBand};
use linkpulse_lib::{approval, import, state, AppState, ErrorReport, PipelineError};

/// Command-line arguments for linkpulse
#[derive(Parser, Debug)]
#[command(name = "linkpulse")]
#[command(about = "Import LinkedIn prospects, AI-qualify them, approve outreach")]
#[command(version)]
struct Args {
    /// Config file (defaults to ~/.linkpulse/config.json)
    #[arg(long, env = "LINKPULSE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the lead store, overrides dataDir from config
    #[arg(long, env = "LINKPULSE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import "name, company, headline, recentPost" lines (stdin when no file)
    Import { file: Option<PathBuf> },
    /// List every lead, newest first
    List,
    /// Score a lead and draft outreach when it clears the threshold
    Qualify {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<String>,
        /// Qualify every NEW lead concurrently
        #[arg(long)]
        all: bool,
    },
    /// Show drafted messages waiting for approval
    Pending,
    /// Approve a drafted message and mark it sent
    Approve { id: String },
    /// Delete one lead
    Remove { id: String },
    /// Delete every lead
    Reset,
    /// Dashboard counters
    Stats,
    /// Ask the sales assistant about your pipeline
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config_path = match args.config {
        Some(path) => path,
        None => state::config_path().map_err(|e| anyhow!(e))?,
    };
    let mut config = state::load_config(&config_path)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }

    let app = AppState::new(config).map_err(|e| anyhow!(e))?;

    let code = dispatch(&app, args.command).await?;

    // A failed write is only logged by the store; surface it before exiting.
    if let Err(e) = app.store.flush() {
        return Ok(report(Err(e.into())));
    }
    Ok(code)
}

async fn dispatch(app: &AppState, command: Command) -> Result<ExitCode> {
    match command {
        Command::Import { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("reading stdin")?;
                    buf
                }
            };
            let leads = import::import(&app.store, &raw);
            println!("Imported {} leads", leads.len());
            for lead in &leads {
                print_lead(lead);
            }
        }
        Command::List => {
            for lead in app.store.all() {
                print_lead(&lead);
            }
        }
        Command::Qualify { id: Some(id), .. } => {
            let result = app.qualifier.qualify(&id).await;
            return Ok(report(result.map(|lead| print_lead(&lead))));
        }
        Command::Qualify { id: None, .. } => {
            let mut failed = false;
            for (id, result) in app.qualifier.qualify_all_new().await {
                match result {
                    Ok(lead) => print_lead(&lead),
                    Err(e) => {
                        failed = true;
                        eprintln!("{}: {}", id, e);
                    }
                }
            }
            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Pending => {
            let pending = approval::pending(&app.store);
            if pending.is_empty() {
                println!("All caught up! No outreach messages are waiting for approval.");
            }
            for lead in pending {
                print_lead(&lead);
                if let Some(reasoning) = &lead.ai_reasoning {
                    println!("    AI reasoning: {}", reasoning);
                }
                if let Some(message) = &lead.generated_message {
                    println!("    Message: {}", message);
                }
            }
        }
        Command::Approve { id } => {
            let result = approval::approve(&app.store, &id);
            return Ok(report(result.map(|lead| print_lead(&lead))));
        }
        Command::Remove { id } => {
            if !app.store.remove_by_id(&id) {
                eprintln!("No lead with id {}", id);
                return Ok(ExitCode::FAILURE);
            }
            println!("Removed {}", id);
        }
        Command::Reset => {
            app.store.clear();
            println!("Lead store cleared");
        }
        Command::Stats => {
            let summary = serde_json::json!({
                "stats": app.store.stats(),
                "intent": app.store.intent_breakdown(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Chat { message } => {
            let reply = gateway::chat_with_assistant(
                app.gateway.as_ref(),
                &message.join(" "),
                &app.store.all(),
                app.config.chat_context_limit,
            )
            .await;
            println!("{}", reply);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print the structured report of a failed operation to stderr.
fn report(result: Result<(), PipelineError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = ErrorReport::from(&e);
            match serde_json::to_string_pretty(&report) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn print_lead(lead: &Lead) {
    let score = match lead.score {
        Some(s) => format!("{:>5} {:<8}", s, format!("{:?}", ScoreBand::of(s))),
        None => format!("{:>5} {:<8}", "-", ""),
    };
    println!(
        "{}  {:<16}  {}  {} ({}) - {}",
        lead.id,
        lead.status.label(),
        score,
        lead.name,
        lead.company,
        lead.headline
    );
}
