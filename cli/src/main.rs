//! catalog - command-line host for the catalog client core.
//!
//! Executes the core's view commands over HTTP with a ureq agent and prints
//! the resulting state. Configuration comes from flags, the environment and
//! an optional `.env` file.

use std::io::{self, Write};

use anyhow::{Context, Result};
use catalog_core::{CatalogClient, EntityId};
use clap::Parser;

mod commands;
mod config;
mod render;
mod transport;

use commands::Session;
use config::Cli;
use transport::UreqTransport;

fn confirm_on_stdin(id: &EntityId) -> bool {
    eprint!("Delete book {id}? [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn main() -> Result<()> {
    // A missing `.env` is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    config::init_tracing(cli.verbose);

    let client = CatalogClient::new(&cli.api_url)
        .with_context(|| format!("failed to configure client for {}", cli.api_url))?;
    tracing::debug!(base_url = %client.base_url(), timeout = ?cli.timeout(), "client ready");

    let session = Session::new(client, UreqTransport::new(cli.timeout()));
    let output = session.run(&cli.command, confirm_on_stdin)?;
    print!("{output}");
    Ok(())
}
