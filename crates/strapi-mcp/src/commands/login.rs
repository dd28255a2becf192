//! Check the admin credentials.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use colored::Colorize;

use strapi_http::{ClientConfig, ContentClient};

use crate::config::ConnectionArgs;
use crate::output;

pub async fn run(args: &ConnectionArgs) -> Result<()> {
    let Some(credentials) = args.admin_credentials()? else {
        bail!("Login needs STRAPI_ADMIN_EMAIL and STRAPI_ADMIN_PASSWORD");
    };
    let base_url = args.base_url()?;
    let email = credentials.email().to_string();

    let config = ClientConfig::new(base_url.clone())
        .with_timeout(std::time::Duration::from_secs(args.timeout_secs))
        .with_admin_credentials(credentials);
    let client = ContentClient::new(config).context("Failed to create client")?;

    eprintln!("{}", "Logging in...".dimmed());

    if !client.authenticator().login().await.context("Login failed")? {
        bail!("The backend rejected the admin credentials");
    }

    let cache = args.token_cache()?;
    let previous = cache.last_admin_login()?;
    cache.record_login(&base_url, Utc::now())?;

    output::success("Logged in");
    output::field("Backend", base_url.as_str());
    output::field("Admin", &email);
    if let Some(at) = previous {
        output::field("Previous login", &at.to_rfc3339());
    }

    Ok(())
}
