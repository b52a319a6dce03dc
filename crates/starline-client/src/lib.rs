//! StarLine Client Library
//!
//! Async client for the StarLine telematics REST API: the SLID/SLNET
//! authentication handshake plus device data and device commands.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use starline_client::{Config, DeviceCommand, LoginParams, StarlineClient, TracingLogger};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::new()
//!         .with_login("login")
//!         .with_password("password")
//!         .with_app_id("app id")
//!         .with_secret("secret key");
//!     let client = StarlineClient::new(config)?.with_logger(Arc::new(TracingLogger));
//!
//!     // Each step feeds the next; an empty result means the step failed
//!     let code = client.fetch_code().await?;
//!     let token = client.fetch_token(&code).await?;
//!     let user_token = client.fetch_user_token(&token, &LoginParams::new()).await?;
//!     let Some(session) = client.fetch_slnet_token(&user_token).await? else {
//!         anyhow::bail!("SLNET authentication failed");
//!     };
//!
//!     let devices = client
//!         .fetch_devices_info(&session.slnet_token, &user_token, session.numeric_user_id())
//!         .await?;
//!     println!("{:?}", devices.get("user_data"));
//!
//!     let result = client
//!         .run_query(&session.slnet_token, "864326031234567", &DeviceCommand::arm(true).into_value())
//!         .await?;
//!     println!("{:?}", result);
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module provides a queue-driven [`testing::MockTransport`],
//! a recording [`testing::MemoryLogger`] and an axum-backed
//! [`testing::TestServer`].

mod client;
mod config;
pub mod digest;
mod error;
pub mod json;
mod logger;
pub mod testing;
pub mod transport;
mod types;

pub use client::{StarlineClient, DEVELOPER_BASE_URL, ID_BASE_URL};
pub use config::Config;
pub use error::{Result, StarlineError};
pub use logger::{ErrorLogger, TracingLogger};
pub use transport::{ReqwestTransport, Transport, TransportOptions};
pub use types::*;
