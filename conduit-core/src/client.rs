//! # Conduit Client
//!
//! This module implements the high-level logic for calling remote Conduit methods dynamically.
//!
//! A [`ConduitClient`] owns four things:
//!
//! 1. **[`ConduitConfig`]**: where the server lives, how to authenticate and how long to wait.
//! 2. **A working [`Schema`]**: its own copy of the interface catalog. Resolving unknown
//!    method names adds placeholder entries to this copy, and [`ConduitClient::refresh_catalog`]
//!    replaces it with the server's live catalog.
//! 3. **An [`Authenticator`]**: the credentials and the authentication state machine.
//! 4. **A [`Transport`]**: [`HttpTransport`] by default, or anything else implementing the trait.
//!
//! ## Calling methods
//!
//! Methods are reached either one segment at a time through [`ConduitClient::resource`], or in
//! one go through [`ConduitClient::call`] with the full dotted name. Both walk the schema the
//! same way, so `diffusion.repository.edit` resolves to app `diffusion` and method
//! `repository.edit` in either case.
//!
//! ```rust,no_run
//! use conduit_core::client::{ConduitClient, ConduitConfig, Credentials, Params};
//! use conduit_core::serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConduitConfig::new(
//!     "https://phabricator.example.com/api/",
//!     Credentials::Token("api-xxxxxxxxxxxx".to_string()),
//! )?;
//! let mut client = ConduitClient::new(config)?;
//!
//! // Segment by segment
//! let me = client.resource("user").resource("whoami").call(Params::new()).await?;
//! println!("{}", me["userName"]);
//!
//! // By full name
//! let mut params = Params::new();
//! params.insert("ids".to_string(), json!([1, 2, 3]));
//! let tasks = client.call("maniphest.query", params).await?;
//! println!("{} tasks", tasks.len());
//! # Ok(())
//! # }
//! ```
mod auth;
mod config;
mod pipeline;
mod resource;
mod types;
mod validate;

pub use auth::*;
pub use config::*;
pub use resource::*;
pub use types::*;
pub use validate::*;

use crate::{
    catalog::{Schema, default_schema},
    http::{ApiError, HttpTransport, ProtocolError, Transport, TransportError},
};

/// Errors that can occur while invoking a remote method.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("'{0}' does not name a callable method")]
    MissingResource(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Remote API error: {0}")]
    Api(#[from] ApiError),
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// A dynamic client for one Conduit host.
///
/// The client is not meant to be shared between tasks: every operation that may authenticate
/// or extend the working schema takes `&mut self`.
#[derive(Debug)]
pub struct ConduitClient<T = HttpTransport> {
    config: ConduitConfig,
    schema: Schema,
    auth: Authenticator,
    transport: T,
}

impl ConduitClient<HttpTransport> {
    /// Creates a client backed by an [`HttpTransport`] that honours the configured timeout.
    ///
    /// The working schema starts as a copy of the bundled catalog snapshot.
    pub fn new(config: ConduitConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::from_transport(config, transport))
    }
}

impl<T: Transport> ConduitClient<T> {
    /// Creates a client that sends every request through `transport`.
    pub fn from_transport(config: ConduitConfig, transport: T) -> Self {
        let auth = Authenticator::new(config.credentials.clone());
        Self {
            config,
            schema: default_schema(),
            auth,
            transport,
        }
    }

    /// Replaces the working schema, e.g. with one parsed from a cached live catalog.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn config(&self) -> &ConduitConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn auth_state(&self) -> &AuthState {
        self.auth.state()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Starts resolving a method path at `name`.
    pub fn resource(&mut self, name: &str) -> Resource<'_, T> {
        Resource::root(self).resource(name)
    }

    /// Resolves the dotted `path` and invokes it with `params`.
    ///
    /// `client.call("diffusion.repository.edit", params)` is equivalent to
    /// `client.resource("diffusion").resource("repository").resource("edit").call(params)`.
    pub async fn call(&mut self, path: &str, params: Params) -> Result<ConduitResult, CallError> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .fold(Resource::root(self), Resource::resource)
            .call(params)
            .await
    }
}
