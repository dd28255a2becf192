//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::provision_token::ProvisionTokenArgs;
use crate::config::ConnectionArgs;

/// MCP server for a Strapi CMS.
#[derive(Parser, Debug)]
#[command(name = "strapi-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve MCP tools over stdio
    Serve,
    /// Check the admin credentials against the backend
    Login,
    /// Create a full-access API token and cache it
    ProvisionToken(ProvisionTokenArgs),
    /// Remove the cached token
    ClearCache,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["strapi-mcp", "--url", "http://cms.internal:1337"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.connection.url, "http://cms.internal:1337");
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["strapi-mcp", "login", "-vv", "--timeout-secs", "5"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Login)));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.connection.timeout_secs, 5);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
