//! Doorkeep command-line interface
//!
//! Runs the access-control boundary against a JSON-file store. Each subcommand
//! is one boundary operation; results print as JSON on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doorkeep_authorization::{
    ensure_builtin_accounts, AccessApi, AccessEffects, AccessOrchestrator,
};
use doorkeep_effects::{
    EveryNthCall, JsonFileRepository, Pbkdf2PasswordHasher, RealClockHandler, RealRandomHandler,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;

use config::DoorkeepConfig;

#[derive(Parser)]
#[command(name = "doorkeep")]
#[command(about = "Doorkeep - door access control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "doorkeep.toml")]
    config: PathBuf,

    /// Caller API key
    #[arg(short = 'k', long, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the seed admin and maintenance accounts if absent
    Bootstrap,

    /// Open an actor for one pulse
    SetState {
        /// Target actor id
        #[arg(long)]
        actor_id: Option<String>,
    },

    /// Query an actor; exits 0 when open, 1 when closed, 2 on failure
    GetState {
        /// Target actor id
        #[arg(long)]
        actor_id: Option<String>,
    },

    /// Check whether an actor polled recently (maintenance key)
    ActorHealth {
        /// Target actor id
        #[arg(long)]
        actor_id: Option<String>,

        /// Maximum age of the last poll in seconds
        #[arg(long)]
        timeout: Option<String>,
    },

    /// Create an identity (admin key)
    AddUser {
        /// Unique name
        #[arg(long)]
        name: Option<String>,

        /// deactivated, admin, actor, user, guest, or maintenance
        #[arg(long)]
        role: Option<String>,

        /// Unique contact address
        #[arg(long)]
        email: Option<String>,

        /// Initial password
        #[arg(long)]
        password: Option<String>,
    },

    /// Grant a mode on an actor (admin key)
    AddScope {
        /// Permission holder
        #[arg(long)]
        grantor_id: Option<String>,

        /// Target actor
        #[arg(long)]
        actor_id: Option<String>,

        /// unset, read, or write
        #[arg(long)]
        mode: Option<String>,
    },

    /// Grant a validity window (admin key)
    AddValid {
        /// Identity the window applies to
        #[arg(long)]
        subject_id: Option<String>,

        /// Window start, ISO-8601; open if omitted
        #[arg(long)]
        start: Option<String>,

        /// Window end, ISO-8601; open if omitted
        #[arg(long)]
        end: Option<String>,
    },

    /// Replace the caller's API key
    RegenerateApiKey,
}

const EXIT_OK: u8 = 0;
const EXIT_CLOSED: u8 = 1;
const EXIT_FAILED: u8 = 2;

/// Polling scripts branch on the status alone, so a failed query must not
/// read as a closed door.
fn state_exit_code(open: bool) -> u8 {
    if open {
        EXIT_OK
    } else {
        EXIT_CLOSED
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn build_api(config: &DoorkeepConfig) -> Result<AccessApi> {
    let repository = JsonFileRepository::open(&config.data_path)
        .await
        .with_context(|| format!("opening store {}", config.data_path.display()))?;
    let random = Arc::new(RealRandomHandler::new());
    let hasher = Pbkdf2PasswordHasher::with_iterations(config.password_iterations)?
        .with_random(random.clone());
    let effects = AccessEffects::new(
        Arc::new(repository),
        Arc::new(RealClockHandler::new()),
        random,
        Arc::new(hasher),
    );
    let schedule = Arc::new(EveryNthCall::new(config.sanitize_every));
    Ok(AccessApi::new(AccessOrchestrator::new(effects, schedule)))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FAILED)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let config = DoorkeepConfig::load(&cli.config)?;

    let fallback = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let api = build_api(&config).await?;
    let key = cli.api_key.as_deref();

    match cli.command {
        Commands::Bootstrap => {
            let created = ensure_builtin_accounts(api.orchestrator().credentials()).await?;
            if created.is_empty() {
                tracing::info!("seed accounts already present");
            }
            print_json(&created)?;
        }

        Commands::SetState { actor_id } => {
            print_json(&api.set_state(key, actor_id.as_deref()).await?)?;
        }

        Commands::GetState { actor_id } => {
            let response = api.get_state(key, actor_id.as_deref()).await?;
            print_json(&response)?;
            return Ok(state_exit_code(response.state));
        }

        Commands::ActorHealth { actor_id, timeout } => {
            let response = api
                .actor_health(key, actor_id.as_deref(), timeout.as_deref())
                .await?;
            print_json(&response)?;
        }

        Commands::AddUser {
            name,
            role,
            email,
            password,
        } => {
            let response = api
                .add_user(
                    key,
                    name.as_deref(),
                    role.as_deref(),
                    email.as_deref(),
                    password.as_deref(),
                )
                .await?;
            print_json(&response)?;
        }

        Commands::AddScope {
            grantor_id,
            actor_id,
            mode,
        } => {
            let response = api
                .add_scope(
                    key,
                    grantor_id.as_deref(),
                    actor_id.as_deref(),
                    mode.as_deref(),
                )
                .await?;
            print_json(&response)?;
        }

        Commands::AddValid {
            subject_id,
            start,
            end,
        } => {
            let response = api
                .add_valid(key, subject_id.as_deref(), start.as_deref(), end.as_deref())
                .await?;
            print_json(&response)?;
        }

        Commands::RegenerateApiKey => {
            print_json(&api.regenerate_api_key(key).await?)?;
        }
    }

    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_exit_apart_from_closed() {
        assert_eq!(state_exit_code(true), 0);
        assert_eq!(state_exit_code(false), 1);
        assert_ne!(EXIT_FAILED, state_exit_code(false));
        assert_ne!(EXIT_FAILED, state_exit_code(true));
    }

    #[test]
    fn get_state_parses_actor_flag() {
        let cli = Cli::try_parse_from(["doorkeep", "-k", "secret", "get-state", "--actor-id", "x"])
            .unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("secret"));
        assert!(matches!(
            cli.command,
            Commands::GetState { actor_id: Some(ref id) } if id == "x"
        ));
    }
}
