//! A client that mirrors the signed-in user's records and keeps them in sync
//! with the record API.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use shawlet::client::{ClientConfig, RecordContext, Session, StaticIdentity};
//! use shawlet::UserId;
//!
//! # async fn run() -> Result<(), shawlet::client::ClientError> {
//! let config = ClientConfig::from_env()?;
//! let identity = Arc::new(StaticIdentity::new(Some(Session {
//!     user_id: UserId::new("user_2abc"),
//!     token: "<session token>".to_owned(),
//! })));
//!
//! let context = RecordContext::new(&config, identity);
//! context.sync_session().await?;
//! println!("net balance: {}", context.summary().net);
//! # Ok(())
//! # }
//! ```

mod api;
mod config;
mod context;
mod error;
mod identity;

pub use api::RecordApi;
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use context::{ContextEvent, Notification, RecordContext, RecordDraft};
pub use error::{ClientError, ClientResult};
pub use identity::{IdentityProvider, Session, StaticIdentity};
