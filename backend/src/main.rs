mod config;
mod db;
mod error;
mod reconcile;
mod services;
mod state;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::reconcile::document::document_entries;
use crate::state::AppState;
use actix_web::{middleware, web, App, HttpServer};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::{Path, PathBuf};

/// Power interruption notices: HTTP API and document importer.
#[derive(Debug, Parser)]
#[command(name = "outage-notices", version, about)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (the default)
    Serve,
    /// Import a JSON document file and print the report
    Import {
        /// Path to the document
        path: PathBuf,
    },
}

#[actix_web::main]
async fn main() -> Result<(), ApiError> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse();
    let state = AppState::from_config(&cli.config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli.config, state).await,
        Command::Import { path } => import_file(&state, &path),
    }
}

async fn serve(config: &AppConfig, state: AppState) -> Result<(), ApiError> {
    let host = config.host.clone();
    let port = config.port;
    info!(
        "Server running at http://{}:{} (database {}, delete policy {:?})",
        host,
        port,
        state.db.path().display(),
        state.delete_policy
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(services::json_config())
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;
    Ok(())
}

fn import_file(state: &AppState, path: &Path) -> Result<(), ApiError> {
    let text = std::fs::read_to_string(path)?;
    let entries = document_entries(serde_json::from_str(&text)?)?;
    info!("Importing {} entries from {}", entries.len(), path.display());

    let report = reconcile::reconcile(&state.db, &entries, state.retry_backoff)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
