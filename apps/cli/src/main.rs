mod commands;
mod config;
mod state;

use std::process::ExitCode;

use clap::Parser;
use studylog_core::UserIdentity;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{
    commands::Command,
    config::Config,
    state::{AppError, AppState},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Habit tracking and study statistics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn init_tracing() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn execute(command: Command, config: &Config) -> Result<String, AppError> {
    let state = AppState::init(&config.data_dir, config.utc_offset_minutes)?;
    let user = config.user_id.clone().map(UserIdentity::new);
    commands::run(command, &state, user.as_ref()).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load();

    match execute(cli.command, &config).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
