//! Token cache for persisting a provisioned API token between runs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use strapi_core::{ApiToken, BaseUrl};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

const CACHE_FILE: &str = "token-cache.json";

/// Stored cache contents.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CachedState {
    base_url: Option<String>,
    api_token: Option<String>,
    token_id: Option<u64>,
    last_admin_login: Option<DateTime<Utc>>,
}

/// A JSON file holding at most one API token, bound to the backend it was
/// issued by.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Open the cache in `dir`, or in the platform data directory.
    pub fn new(dir: Option<&Path>) -> Result<Self> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => ProjectDirs::from("", "", "strapi-mcp")
                .context("Could not determine data directory")?
                .data_dir()
                .to_path_buf(),
        };
        fs::create_dir_all(&dir).context("Failed to create data directory")?;

        Ok(Self {
            path: dir.join(CACHE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CachedState> {
        if !self.path.exists() {
            return Ok(CachedState::default());
        }

        let json = fs::read_to_string(&self.path).context("Failed to read token cache")?;
        serde_json::from_str(&json).context("Invalid token cache file")
    }

    fn save(&self, state: &CachedState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, &json).context("Failed to write token cache")?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    /// The cached token, if it was issued by `base_url`.
    pub fn token_for(&self, base_url: &BaseUrl) -> Result<Option<ApiToken>> {
        let state = self.load()?;
        if state.base_url.as_deref() != Some(base_url.as_str()) {
            return Ok(None);
        }
        Ok(state.api_token.map(ApiToken::new))
    }

    /// Replace the cached token.
    pub fn store_token(&self, base_url: &BaseUrl, token: &ApiToken, id: u64) -> Result<()> {
        let mut state = self.load()?;
        if state.base_url.as_deref() != Some(base_url.as_str()) {
            state.last_admin_login = None;
        }
        state.base_url = Some(base_url.as_str().to_string());
        state.api_token = Some(token.as_str().to_string());
        state.token_id = Some(id);
        self.save(&state)
    }

    /// Record a successful admin login against `base_url`.
    pub fn record_login(&self, base_url: &BaseUrl, at: DateTime<Utc>) -> Result<()> {
        let mut state = self.load()?;
        if state.base_url.as_deref() != Some(base_url.as_str()) {
            state = CachedState {
                base_url: Some(base_url.as_str().to_string()),
                ..CachedState::default()
            };
        }
        state.last_admin_login = Some(at);
        self.save(&state)
    }

    pub fn last_admin_login(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.load()?.last_admin_login)
    }

    /// Remove the cache file. Returns whether anything was removed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).context("Failed to remove token cache")?;
        Ok(true)
    }
}
