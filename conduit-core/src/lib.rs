//! # Conduit Core
//!
//! `conduit-core` is the foundational library powering the Conduit CLI. It provides a dynamic
//! client for the Conduit RPC-over-HTTP protocol (the Phabricator API) that can call any remote
//! method without compile-time bindings: the method surface is discovered from an interface
//! catalog at runtime.
//!
//! ## Key Components
//!
//! * **[`catalog`]:** Turns the loosely structured, human-authored interface catalog into a
//!   normalized [`Schema`](catalog::Schema) of required and optional parameters per method.
//! * **[`ConduitClient`](client::ConduitClient):** The main entry point. It resolves method paths
//!   against the schema, validates arguments, authenticates lazily and dispatches the request
//!   through a [`Transport`](http::Transport).
//! * **[`Resource`](client::Resource):** A partially resolved method path, built one segment
//!   at a time (`client.resource("diffusion").resource("repository").resource("edit")`).
//!
//! ## Transport
//!
//! The client is generic over the [`Transport`](http::Transport) trait. The default
//! [`HttpTransport`](http::HttpTransport) is backed by `reqwest`; tests plug in an in-process
//! transport that replays canned responses.
//!
//! ## Configuration
//!
//! The client only consumes a resolved [`ConduitConfig`](client::ConduitConfig). Reading the
//! layered `.arcrc` files that usually provide it lives in [`arcrc`], so the client itself never
//! touches the filesystem.
//!
//! See the README.md for more details about usage.
pub mod arcrc;
pub mod catalog;
pub mod client;
pub mod http;

// Re-exports
pub use serde_json;
pub use url;
