//! # Invest API client
//!
//! Configures a tonic gRPC client for the Tinkoff Invest API: endpoint
//! selection (sandbox or production), TLS, per-call bearer credentials with an
//! `x-app-name` header, unbounded inbound messages and a fixed retry policy
//! for `UNAVAILABLE` responses.
//!
//! Generated service stubs are not part of this crate. Calls go through
//! [`InvestApiClient::unary`] and [`InvestApiClient::server_streaming`], which
//! always retry; stubs built on the raw [`InvestApiClient::transport`] bypass
//! retries and need [`InvestApiClient::apply_limits`].
//!
//! ## Quick Start
//! ```ignore
//! use invest_api::{InvestApiClient, InvestApiSettings};
//!
//! let settings = InvestApiSettings::new(token).with_sandbox(true);
//! let client = InvestApiClient::from_settings("", &settings)?;
//! ```
//!
//! ### From the environment
//! ```ignore
//! use core_config::FromEnv;
//! use invest_api::{InvestApiClient, InvestApiSettings};
//!
//! // INVEST_ACCESS_TOKEN, INVEST_SANDBOX, INVEST_APP_NAME, INVEST_WEB_CLIENT
//! let settings = InvestApiSettings::from_env()?;
//! let client = InvestApiClient::from_settings("", &settings)?;
//! ```
//!
//! ### Several named clients
//! ```ignore
//! use invest_api::ClientRegistry;
//!
//! let mut registry = ClientRegistry::new();
//! registry.add_named_client("sandbox", |s| {
//!     s.access_token = Some(token.clone());
//!     s.sandbox = true;
//! }, false)?;
//! ```

pub mod channel;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod interceptors;
pub mod retry;
pub mod settings;

pub use channel::{ChannelConfig, TransportKind};
pub use client::{
    AuthenticatedTransport, ClientRegistry, ConfigurableClient, DEFAULT_CLIENT_NAME,
    InvestApiClient, configure, with_limits, with_unbounded_limits,
};
pub use endpoint::{ApiEndpoint, PRODUCTION_URL, SANDBOX_URL};
pub use error::{InvestApiError, InvestApiResult};
pub use interceptors::InvestApiCredentials;
pub use retry::RetryPolicy;
pub use settings::{DEFAULT_APP_NAME, InvestApiSettings, ResolvedSettings};
