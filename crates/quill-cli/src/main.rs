//! Quill CLI - capture and triage notes against a hosted notes service.

mod cli;
mod commands;
mod config;
mod error;
mod session;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Login { username, password }) => {
            commands::auth_cmd::run_login(&username, &password).await?;
        }
        Some(Commands::Logout) => commands::auth_cmd::run_logout()?,
        Some(Commands::Status) => commands::auth_cmd::run_status()?,
        Some(Commands::Add { content, important }) => {
            commands::add::run_add(&content, important).await?;
        }
        Some(Commands::List {
            important,
            json,
            limit,
        }) => commands::list::run_list(important, json, limit).await?,
        Some(Commands::Toggle { id }) => commands::toggle::run_toggle(&id).await?,
        Some(Commands::Config { command }) => commands::config_cmd::run_config(command)?,
        Some(Commands::Completions { shell, output }) => {
            commands::completions::run_completions(shell, output.as_deref())?;
        }
        None => {
            // Quick capture mode: quill "my note"
            if cli.note.is_empty() {
                Cli::command().print_help()?;
                println!();
            } else {
                commands::add::run_add(&cli.note, false).await?;
            }
        }
    }

    Ok(())
}
