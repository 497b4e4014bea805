//! # kumoru-sdk
//!
//! Client library for the Kumoru platform APIs.
//!
//! The platform is split across several services (application,
//! authorization, location, pool). Every call is a plain REST request that
//! is signed with the caller's token pair:
//!
//! - [`config`] - INI configuration: endpoints, tokens, active role
//! - [`signer`] - canonical signing string and HMAC `Authorization` header
//! - [`request`] - fluent request state (method, URL, query, body)
//! - [`client`] - dispatch, debug dumps, response handling
//! - resource models: [`account`], [`application`], [`deployment`],
//!   [`location`], [`pool`], [`secret`], plus [`token`] issuance and
//!   authorization [`resource`] lookup
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   Request    ┌────────┐   signed HTTP   ┌─────────────────┐
//! │ resource API │─────────────►│ Client │────────────────►│ Kumoru services │
//! └──────────────┘              └───┬────┘                 └─────────────────┘
//!                                   │ Signer (HMAC-SHA256)
//!                                   ▼
//!                               Config (INI)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use kumoru_sdk::{Client, application::Application};
//!
//! # async fn example() -> kumoru_sdk::Result<()> {
//! let client = Client::from_env()?;
//! let apps = Application::list(&client).await?;
//! println!("{} application(s)", apps.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod application;
pub mod client;
pub mod config;
pub mod deployment;
pub mod error;
pub mod location;
pub mod pool;
pub mod request;
pub mod resource;
pub mod secret;
mod serde_helpers;
pub mod signer;
pub mod token;

pub use client::{Client, Response};
pub use config::{Config, Credentials, Endpoints, Tokens};
pub use error::{Error, Result};
pub use request::{BodyKind, Request};
pub use signer::{ForwardedRequest, SignedHeaders, Signer};
