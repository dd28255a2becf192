//! Admin session management.
//!
//! The [`Authenticator`] owns the credentials for one backend instance. It
//! holds an optional static API token and an optional admin session token;
//! the session token wins whenever both are present. Logins are
//! single-flight: concurrent callers share one in-progress attempt and all
//! observe its outcome.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use reqwest::StatusCode;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use strapi_core::error::{AuthError, TransportError};
use strapi_core::{AdminCredentials, ApiToken, BaseUrl, Error, Result, SessionToken};

use crate::config::ClientConfig;
use crate::dispatch::transport_error;
use crate::endpoints::{self, LoginRequest, LoginResponse};

/// The credential attached to one outgoing request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Session(SessionToken),
    ApiToken(ApiToken),
}

impl Credential {
    /// Bearer value for the Authorization header.
    pub fn as_str(&self) -> &str {
        match self {
            Credential::Session(token) => token.as_str(),
            Credential::ApiToken(token) => token.as_str(),
        }
    }

    pub fn is_session(&self) -> bool {
        matches!(self, Credential::Session(_))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Session(_) => f.write_str("Credential::Session([REDACTED])"),
            Credential::ApiToken(_) => f.write_str("Credential::ApiToken([REDACTED])"),
        }
    }
}

/// Backoff schedule for rate-limited logins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_delay.saturating_mul(1u32 << exponent)
    }
}

type LoginAttempt = Shared<BoxFuture<'static, Result<bool>>>;

/// Session state for one backend instance.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Authenticator {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    client: reqwest::Client,
    base_url: BaseUrl,
    api_token: Option<ApiToken>,
    admin: Option<AdminCredentials>,
    retry: RetryPolicy,
    session: RwLock<Option<SessionToken>>,
    in_flight: Mutex<Option<LoginAttempt>>,
}

impl Authenticator {
    pub fn new(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                admin: config.admin.clone(),
                retry: config.login_retry.clone(),
                session: RwLock::new(None),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn has_admin_credentials(&self) -> bool {
        self.inner.admin.is_some()
    }

    pub fn has_api_token(&self) -> bool {
        self.inner.api_token.is_some()
    }

    /// Returns true while an admin session token is held.
    pub async fn has_session(&self) -> bool {
        self.inner.session.read().await.is_some()
    }

    /// Log in with the admin credentials.
    ///
    /// Returns `Ok(true)` once a session is held (immediately, if one already
    /// is) and `Ok(false)` when login was rejected or no admin credentials
    /// are configured. Connectivity failures are returned as errors.
    ///
    /// Concurrent callers share a single attempt: exactly one login request
    /// is in flight at a time, and every caller sees the same result.
    pub async fn login(&self) -> Result<bool> {
        if self.has_session().await {
            return Ok(true);
        }

        let attempt = {
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(existing) => {
                    debug!("joining in-flight admin login");
                    existing.clone()
                }
                None => {
                    // A previous attempt may have settled while we waited.
                    if self.has_session().await {
                        return Ok(true);
                    }
                    let inner = Arc::clone(&self.inner);
                    let attempt = async move {
                        let outcome = inner.perform_login().await;
                        inner.in_flight.lock().await.take();
                        outcome
                    }
                    .boxed()
                    .shared();
                    *slot = Some(attempt.clone());
                    attempt
                }
            }
        };

        attempt.await
    }

    /// The credential to attach to a request: session token first, then the
    /// static API token. `None` means the request goes out anonymously.
    pub async fn credential(&self) -> Option<Credential> {
        if let Some(token) = self.inner.session.read().await.as_ref() {
            return Some(Credential::Session(token.clone()));
        }
        self.inner.api_token.clone().map(Credential::ApiToken)
    }

    /// React to an authentication failure on a request that carried `used`.
    ///
    /// Only session tokens are recoverable: the stale token is cleared and a
    /// fresh login runs. If another caller already replaced the token, the
    /// replacement is reused without logging in again. Returns whether a
    /// usable session is now held.
    #[instrument(skip(self, used), fields(session = used.is_session()))]
    pub async fn handle_auth_error(&self, used: &Credential) -> Result<bool> {
        let Credential::Session(stale) = used else {
            debug!("static credential rejected, nothing to recover");
            return Ok(false);
        };

        {
            let mut session = self.inner.session.write().await;
            match session.as_ref() {
                Some(current) if current == stale => {
                    info!("admin session expired, re-authenticating");
                    *session = None;
                }
                Some(_) => {
                    debug!("admin session already renewed by another request");
                    return Ok(true);
                }
                None => {}
            }
        }

        self.login().await
    }

    /// Guarantee an admin session for a privileged request.
    ///
    /// # Errors
    ///
    /// [`AuthError::AdminCredentialsRequired`] when no admin credentials are
    /// configured, [`AuthError::LoginFailed`] when login is rejected, and
    /// transport errors when the backend is unreachable.
    pub async fn ensure_session(&self) -> Result<Credential> {
        if let Some(token) = self.inner.session.read().await.as_ref() {
            return Ok(Credential::Session(token.clone()));
        }

        if self.inner.admin.is_none() {
            return Err(AuthError::AdminCredentialsRequired.into());
        }

        if !self.login().await? {
            return Err(AuthError::LoginFailed.into());
        }

        self.inner
            .session
            .read()
            .await
            .clone()
            .map(Credential::Session)
            .ok_or_else(|| AuthError::LoginFailed.into())
    }

    /// Drop the current session token, if any.
    pub async fn clear_session(&self) {
        self.inner.session.write().await.take();
    }
}

impl AuthInner {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn perform_login(&self) -> Result<bool> {
        let Some(admin) = &self.admin else {
            debug!("no admin credentials configured, skipping login");
            return Ok(false);
        };

        let url = self.base_url.endpoint(endpoints::ADMIN_LOGIN);
        let body = LoginRequest {
            email: admin.email(),
            password: admin.password(),
        };

        for attempt in 1..=self.retry.max_attempts {
            debug!(attempt, "admin login attempt");

            let response = match self.client.post(&url).json(&body).send().await {
                Ok(response) => response,
                Err(err) => {
                    let err = transport_error(err);
                    if is_fatal(&err) {
                        error!(error = %err, "backend unreachable during admin login");
                        return Err(err);
                    }
                    warn!(error = %err, "admin login request failed");
                    return Ok(false);
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt < self.retry.max_attempts {
                    let delay = self.retry.delay_after(attempt);
                    warn!(attempt, ?delay, "admin login rate limited, backing off");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                warn!(
                    attempts = self.retry.max_attempts,
                    "admin login still rate limited, giving up"
                );
                return Ok(false);
            }

            if !status.is_success() {
                warn!(%status, "admin login rejected");
                return Ok(false);
            }

            return match response.json::<LoginResponse>().await {
                Ok(body) => {
                    *self.session.write().await = Some(SessionToken::new(body.data.token));
                    info!("admin session established");
                    Ok(true)
                }
                Err(err) => {
                    warn!(error = %err, "admin login response carried no token");
                    Ok(false)
                }
            };
        }

        Ok(false)
    }
}

fn is_fatal(err: &Error) -> bool {
    matches!(
        err,
        Error::Transport(TransportError::Connection { .. } | TransportError::Timeout { .. })
    )
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("base_url", &self.inner.base_url)
            .field("api_token", &self.inner.api_token.is_some())
            .field("admin", &self.inner.admin.is_some())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
