//! strapi-mcp - MCP server for a Strapi CMS.
//!
//! Exposes content, publication, localization and media operations as MCP
//! tools over stdio. The subcommands beside `serve` manage the local token
//! cache.

mod cache;
mod cli;
mod commands;
mod config;
mod output;
mod server;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::run(&cli.connection).await,
        Commands::Login => commands::login::run(&cli.connection).await,
        Commands::ProvisionToken(args) => commands::provision_token::run(&cli.connection, args).await,
        Commands::ClearCache => commands::clear_cache::run(&cli.connection),
    }
}

/// Logs go to stderr; stdout carries MCP frames.
fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
