//! strapi-http - HTTP layer for the strapi-mcp content adapter.
//!
//! Session management, request dispatch with expiry recovery, query
//! translation for both endpoint families, and the content operations
//! built on top of them.
//!
//! # Example
//!
//! ```no_run
//! use strapi_core::{AdminCredentials, BaseUrl, ContentTypeUid, QuerySpec};
//! use strapi_http::{ClientConfig, ContentClient};
//!
//! # async fn example() -> strapi_core::Result<()> {
//! let config = ClientConfig::new(BaseUrl::new("http://localhost:1337")?)
//!     .with_admin_credentials(AdminCredentials::new("admin@example.com", "secret"));
//! let client = ContentClient::new(config)?;
//!
//! let uid = ContentTypeUid::new("api::project.project")?;
//! let page = client.get_entries(&uid, &QuerySpec::default()).await?;
//! println!("{}", page);
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod auth;
pub mod config;
pub mod content;
pub mod dispatch;
pub mod endpoints;
pub mod media;
pub mod translate;

pub use admin::{ProvisionedToken, TokenKind};
pub use auth::{Authenticator, Credential, RetryPolicy};
pub use config::ClientConfig;
pub use content::ContentClient;
pub use dispatch::{ApiRequest, Dispatcher, RequestBody};
pub use media::MediaSource;
pub use translate::ApiFamily;
