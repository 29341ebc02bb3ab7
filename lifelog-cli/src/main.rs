use clap::{Parser, Subcommand};
use colored::Colorize;
use human_panic::setup_panic;
use lifelog_lib::client::Client;
use sysexits::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{config::ClientConfig, error::CliError};

mod config;
mod error;
mod profile;
mod session;
mod timebox;

#[derive(Parser, Debug)]
#[command(name = "lifelog")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Override the server URL from client.toml
    #[arg(short, long, global = true)]
    server: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Show or edit your profile
    #[command(subcommand)]
    Profile(profile::Command),
    /// Show and edit the 15-minute blocks of a day
    #[command(subcommand)]
    Timebox(timebox::Command),
    /// Manage the stored session
    #[command(subcommand)]
    Session(session::Command),
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_panic!();

    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::Ok,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            e.exit_code()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut cfg = ClientConfig::load()?;
    let server = cli.server.as_deref();

    match &cli.command {
        Command::Profile(cmd) => profile::handle(client(&cfg, server)?, cmd).await,
        Command::Timebox(cmd) => timebox::handle(client(&cfg, server)?, cmd).await,
        Command::Session(cmd) => session::handle(&mut cfg, cmd),
    }
}

/// An authenticated client for the configured server, or `server` when given.
fn client(cfg: &ClientConfig, server: Option<&str>) -> Result<Client, CliError> {
    let token = cfg.session_token.as_deref().ok_or(CliError::NoSession)?;
    let url = server.unwrap_or(&cfg.server_url);

    Ok(Client::new(url).with_session(token))
}
