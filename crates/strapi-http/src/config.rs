//! Client configuration.

use std::time::Duration;

use strapi_core::error::TransportError;
use strapi_core::{AdminCredentials, ApiToken, BaseUrl, Result};

use crate::auth::RetryPolicy;

/// Everything needed to talk to one backend instance.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: BaseUrl,
    pub api_token: Option<ApiToken>,
    pub admin: Option<AdminCredentials>,
    /// Overall per-request timeout. `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,
    pub login_retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            api_token: None,
            admin: None,
            timeout: None,
            login_retry: RetryPolicy::default(),
        }
    }

    pub fn with_api_token(mut self, token: ApiToken) -> Self {
        self.api_token = Some(token);
        self
    }

    pub fn with_admin_credentials(mut self, credentials: AdminCredentials) -> Self {
        self.admin = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_login_retry(mut self, policy: RetryPolicy) -> Self {
        self.login_retry = policy;
        self
    }

    /// Returns true when at least one kind of credential is configured.
    pub fn has_credentials(&self) -> bool {
        self.api_token.is_some() || self.admin.is_some()
    }

    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("strapi-mcp/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|e| {
            TransportError::Http {
                message: format!("failed to build HTTP client: {}", e),
            }
            .into()
        })
    }
}
