//! Connection settings, read from flags or the environment.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::info;

use strapi_core::{AdminCredentials, ApiToken, BaseUrl};
use strapi_http::ClientConfig;

use crate::cache::TokenCache;

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Backend base URL
    #[arg(long, env = "STRAPI_URL", default_value = "http://localhost:1337", global = true)]
    pub url: String,

    /// Static API token
    #[arg(long, env = "STRAPI_API_TOKEN", hide_env_values = true, global = true)]
    pub api_token: Option<String>,

    /// Admin email, enables the content-manager routes
    #[arg(long, env = "STRAPI_ADMIN_EMAIL", global = true)]
    pub admin_email: Option<String>,

    /// Admin password
    #[arg(long, env = "STRAPI_ADMIN_PASSWORD", hide_env_values = true, global = true)]
    pub admin_password: Option<String>,

    /// Overall request timeout in seconds
    #[arg(long, env = "STRAPI_TIMEOUT_SECS", default_value_t = 60, global = true)]
    pub timeout_secs: u64,

    /// Directory holding the token cache
    #[arg(long, env = "STRAPI_MCP_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,
}

impl ConnectionArgs {
    pub fn base_url(&self) -> Result<BaseUrl> {
        BaseUrl::new(&self.url).with_context(|| format!("Invalid backend URL: {}", self.url))
    }

    pub fn token_cache(&self) -> Result<TokenCache> {
        TokenCache::new(self.cache_dir.as_deref())
    }

    pub fn admin_credentials(&self) -> Result<Option<AdminCredentials>> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Ok(Some(AdminCredentials::new(email, password))),
            (Some(_), None) => bail!("STRAPI_ADMIN_EMAIL is set but STRAPI_ADMIN_PASSWORD is not"),
            (None, Some(_)) => bail!("STRAPI_ADMIN_PASSWORD is set but STRAPI_ADMIN_EMAIL is not"),
            (None, None) => Ok(None),
        }
    }

    /// Build the client configuration, falling back to a cached token when no
    /// static token is given.
    pub fn client_config(&self, cache: &TokenCache) -> Result<ClientConfig> {
        let base_url = self.base_url()?;

        let api_token = match &self.api_token {
            Some(token) => Some(ApiToken::new(token)),
            None => {
                let cached = cache.token_for(&base_url)?;
                if cached.is_some() {
                    info!(path = %cache.path().display(), "using cached API token");
                }
                cached
            }
        };

        let mut config =
            ClientConfig::new(base_url).with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(token) = api_token {
            config = config.with_api_token(token);
        }
        if let Some(credentials) = self.admin_credentials()? {
            config = config.with_admin_credentials(credentials);
        }

        if !config.has_credentials() {
            bail!(
                "No credentials configured. Set STRAPI_API_TOKEN, or STRAPI_ADMIN_EMAIL and \
                 STRAPI_ADMIN_PASSWORD, or run `strapi-mcp provision-token`"
            );
        }

        Ok(config)
    }
}
