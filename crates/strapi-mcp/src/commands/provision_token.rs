//! Provision an API token through the admin API and cache it.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use strapi_http::{ClientConfig, ContentClient, TokenKind};

use crate::config::ConnectionArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct ProvisionTokenArgs {
    /// Token name shown in the admin panel
    #[arg(long, default_value = "strapi-mcp")]
    pub name: String,

    /// Days until the token expires (never, if omitted)
    #[arg(long)]
    pub lifespan_days: Option<u32>,

    /// Create a read-only token instead of a full-access one
    #[arg(long)]
    pub read_only: bool,
}

pub async fn run(conn: &ConnectionArgs, args: ProvisionTokenArgs) -> Result<()> {
    let Some(credentials) = conn.admin_credentials()? else {
        bail!("Provisioning a token needs STRAPI_ADMIN_EMAIL and STRAPI_ADMIN_PASSWORD");
    };
    let base_url = conn.base_url()?;

    let config = ClientConfig::new(base_url.clone())
        .with_timeout(std::time::Duration::from_secs(conn.timeout_secs))
        .with_admin_credentials(credentials);
    let client = ContentClient::new(config).context("Failed to create client")?;

    let kind = if args.read_only {
        TokenKind::ReadOnly
    } else {
        TokenKind::FullAccess
    };

    eprintln!("{}", "Provisioning API token...".dimmed());

    let provisioned = client
        .create_api_token(
            &args.name,
            Some("Created by strapi-mcp"),
            kind,
            args.lifespan_days,
        )
        .await
        .context("Failed to create API token")?;

    let cache = conn.token_cache()?;
    cache.store_token(&base_url, &provisioned.token, provisioned.id)?;

    output::success("API token created");
    output::field("Name", &provisioned.name);
    output::field("Id", &provisioned.id.to_string());
    output::field("Access", kind.as_str());
    output::field("Cached at", &cache.path().display().to_string());

    Ok(())
}
