use std::process::ExitCode;

use human_panic::setup_panic;
use lifelog_server::start_server;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> ExitCode {
    setup_panic!();

    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match start_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
