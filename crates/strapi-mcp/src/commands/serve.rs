//! Serve the MCP tools over stdio.

use anyhow::{Context, Result};
use rmcp::ServiceExt;
use tracing::info;

use strapi_http::ContentClient;

use crate::config::ConnectionArgs;
use crate::server::StrapiMcp;

pub async fn run(args: &ConnectionArgs) -> Result<()> {
    let cache = args.token_cache()?;
    let config = args.client_config(&cache)?;
    let client = ContentClient::new(config).context("Failed to create client")?;

    info!(
        base_url = %client.base_url(),
        admin = client.authenticator().has_admin_credentials(),
        api_token = client.authenticator().has_api_token(),
        "starting MCP server on stdio"
    );

    let service = StrapiMcp::new(client)
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP server")?;
    service.waiting().await.context("MCP server stopped")?;

    Ok(())
}
