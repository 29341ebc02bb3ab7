use chrono::TimeDelta;
use clap::Subcommand;
use colored::Colorize;
use lifelog_lib::repository::config::CoreConfig;
use tracing::info;
use uuid::Uuid;

use crate::{config::ClientConfig, error::CliError};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Issue a session token signed with the local secret and store it
    New {
        /// Account to sign in as. Defaults to the stored account, or a new one.
        #[arg(long)]
        account: Option<Uuid>,
        /// Lifetime of the token, defaults to the core configuration's TTL
        #[arg(long)]
        ttl_hours: Option<u32>,
    },
    /// Print the stored client settings
    Show,
}

pub fn handle(cfg: &mut ClientConfig, cmd: &Command) -> Result<(), CliError> {
    match cmd {
        Command::New { account, ttl_hours } => {
            let core = CoreConfig::load()?;
            let account = account.or(cfg.account_id).unwrap_or_else(Uuid::new_v4);
            let ttl = ttl_hours
                .map(|h| TimeDelta::hours(i64::from(h)))
                .unwrap_or_else(|| core.session_ttl());

            let session = core.session_key().issue(account, ttl)?;
            info!("Issued session for {account} until {}", session.expires_at);

            cfg.account_id = Some(account);
            cfg.session_token = Some(session.token);
            cfg.save()?;

            println!(
                "{} {account}, valid until {}",
                "Signed in as".green(),
                session.expires_at.to_rfc3339()
            );
        }
        Command::Show => {
            println!("{:>8}  {}", "Server".bold(), cfg.server_url);
            println!(
                "{:>8}  {}",
                "Account".bold(),
                cfg.account_id
                    .map_or_else(|| "none".dimmed().to_string(), |id| id.to_string())
            );
            println!(
                "{:>8}  {}",
                "Session".bold(),
                if cfg.session_token.is_some() {
                    "stored".to_string()
                } else {
                    "none".dimmed().to_string()
                }
            );
        }
    }

    Ok(())
}
