//! Scribe CLI - Short text notes from the command line
//!
//! Every command talks to the configured Supabase project directly; the
//! signed-in session is kept in the OS keychain per profile.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;


use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::{open_profile_backend, open_store, resolve_note_content};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::watch::run_watch;
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
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "scribe=info"
                    .parse()
                    .map_err(|error| CliError::Config(format!("log filter: {error}")))?,
            ),
        )
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Some(Commands::Add { title, content }) => {
            let content = resolve_note_content(&content)?;
            let store = open_store(profile)?;
            run_add(&store, title.as_deref(), &content).await?;
        }
        Some(Commands::List { json }) => run_list(&open_store(profile)?, json).await?,
        Some(Commands::Edit { id, title, content }) => {
            run_edit(&open_store(profile)?, &id, title, content).await?;
        }
        Some(Commands::Delete { id }) => run_delete(&open_store(profile)?, &id).await?,
        Some(Commands::Watch) => run_watch(&open_store(profile)?).await?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        Some(Commands::Config { command }) => run_config(command, profile)?,
        Some(Commands::Auth { command }) => {
            let (profile_name, backend) = open_profile_backend(profile)?;
            run_auth(command, &profile_name, &backend).await?;
        }
        None => {
            // Quick capture mode: scribe "my note"
            if cli.note.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                let store = open_store(profile)?;
                run_add(&store, None, &cli.note.join(" ")).await?;
            }
        }
    }

    Ok(())
}
