//! # HTTP Transport
//!
//! This module contains the wire-level building blocks of a Conduit call:
//!
//! * [`Transport`]: the seam the client sends requests through. Given a URL, headers and a
//!   form-encoded body it performs a `POST` and hands back the status, headers and body bytes.
//! * [`HttpTransport`]: the default `reqwest`-backed implementation.
//! * [`decode_envelope`]: turns a response body into the `{result, error_code, error_info}`
//!   envelope, tolerating the `for(;;);` guard some deployments prefix responses with.
mod envelope;
mod transport;

pub use envelope::*;
pub use transport::*;
