use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli_args::{Cli, Command};
use cli_program::{CLIProgram, RecordOptions};
use cloudflare_provider::CloudflareProvider;
use config::{Config, Settings, SettingsLayer};
use error::Error;

mod cli_args;
mod cli_program;
mod cloudflare_provider;
mod config;
mod dns_client;
mod dns_provider;
mod error;
mod mutation;
mod output;
mod query;
mod record;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "cfcli=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), Error> {
    let Cli { global, command } = cli;

    let command = match command {
        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "cfcli", &mut std::io::stdout());
            return Ok(());
        }
        Command::Dns(command) => command,
    };

    let config = match Config::get_config_path(global.config.clone()) {
        Some(path) => Config::load(&path)?,
        None => {
            warn!("could not determine home directory, continuing without a config file");
            Config::default()
        }
    };
    let settings = Settings::resolve(
        &config,
        global.account.as_deref(),
        &SettingsLayer::from_env(),
        &global.settings_layer(),
    )?;

    let token = settings.require_token()?;
    let provider = CloudflareProvider::new(token, &settings.email)?;

    let mut program = CLIProgram::new(
        provider,
        settings,
        RecordOptions::from(&global),
        std::io::stdout(),
        std::io::stderr(),
    );
    program.run(command).await
}
