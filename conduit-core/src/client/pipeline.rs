//! # Request Pipeline
//!
//! Every call, including the handshake itself, goes through the same steps: validate the
//! arguments, attach authentication, send the form-encoded request and decode the envelope.
use super::{AuthContext, CONTEXT_KEY, CallError, ConduitClient, Credentials, Params, validate};
use crate::{
    catalog::{Catalog, MethodSchema, parse_catalog},
    http::{HttpRequest, ProtocolError, Transport, TransportError, decode_envelope},
};
use http::{HeaderMap, HeaderValue, header};
use serde_json::{Value, json};
use std::time::SystemTime;

// Identity reported during the handshake and in the User-Agent header.
const CLIENT_NAME: &str = "conduit-rs";
const CLIENT_VERSION: u32 = 1;

const CONNECT_APP: &str = "conduit";
const CONNECT_METHOD: &str = "connect";
const CATALOG_METHOD: &str = "query";

impl<T: Transport> ConduitClient<T> {
    /// Establishes the authentication context if there is none yet.
    ///
    /// Token clients authenticate locally. Certificate clients perform the signed
    /// `conduit.connect` handshake and keep the returned session for the rest of their
    /// lifetime. Other calls do this on demand, so calling it explicitly is only needed to
    /// surface authentication problems early.
    pub async fn connect(&mut self) -> Result<(), CallError> {
        if self.auth.authenticate_with_token() {
            return Ok(());
        }

        let Credentials::Certificate { user, .. } = self.auth.credentials() else {
            return Ok(());
        };

        let mut params = Params::new();
        params.insert("user".to_string(), json!(user));
        params.insert("host".to_string(), json!(self.config.host.as_str()));
        params.insert("client".to_string(), json!(CLIENT_NAME));
        params.insert("clientVersion".to_string(), json!(CLIENT_VERSION));
        params.insert(
            "clientDescription".to_string(),
            json!(format!("{}:{CLIENT_NAME}", hostname())),
        );

        let schema = self
            .schema
            .method(CONNECT_APP, CONNECT_METHOD)
            .cloned()
            .unwrap_or_default();
        let mut params = validate(&schema, params)?;

        if let Some((token, signature)) = self.auth.handshake_signature(SystemTime::now()) {
            params.insert("authToken".to_string(), json!(token));
            params.insert("authSignature".to_string(), json!(signature));
        }

        self.auth.begin_handshake();
        tracing::debug!(host = %self.config.host, "starting conduit handshake");

        match self.handshake(params).await {
            Ok(context) => {
                self.auth.finish_handshake(context);
                Ok(())
            }
            Err(err) => {
                tracing::debug!(error = %err, "conduit handshake failed");
                self.auth.abort_handshake();
                Err(err)
            }
        }
    }

    /// Fetches the server's interface catalog and makes it the working schema.
    ///
    /// Returns the number of methods in the new schema.
    pub async fn refresh_catalog(&mut self) -> Result<usize, CallError> {
        let result = self
            .call(&format!("{CONNECT_APP}.{CATALOG_METHOD}"), Params::new())
            .await?;

        let catalog = Catalog::from_value(result.into_inner()).map_err(ProtocolError::from)?;
        self.schema = parse_catalog(&catalog);

        tracing::debug!(
            methods = self.schema.len(),
            "replaced working schema with live catalog"
        );
        Ok(self.schema.len())
    }

    pub(crate) async fn invoke(
        &mut self,
        method: &str,
        endpoint: &str,
        schema: &MethodSchema,
        params: Params,
    ) -> Result<Value, CallError> {
        let mut params = validate(schema, params)?;

        // An explicit handshake signs itself instead of waiting for a session.
        let is_handshake = method == CONNECT_APP && endpoint == CONNECT_METHOD;
        if is_handshake {
            self.auth.authenticate_with_token();
        } else {
            self.connect().await?;
        }

        if let Some(context) = self.auth.context() {
            params.insert(CONTEXT_KEY.to_string(), context.to_value());
        } else if is_handshake
            && let Some((token, signature)) = self.auth.handshake_signature(SystemTime::now())
        {
            params.insert("authToken".to_string(), json!(token));
            params.insert("authSignature".to_string(), json!(signature));
        }

        self.send(method, endpoint, params).await
    }

    async fn handshake(&self, params: Params) -> Result<AuthContext, CallError> {
        let result = self.send(CONNECT_APP, CONNECT_METHOD, params).await?;

        let session_key = result
            .get("sessionKey")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingField("sessionKey"))?;
        let connection_id = result
            .get("connectionID")
            .and_then(parse_connection_id)
            .ok_or(ProtocolError::MissingField("connectionID"))?;

        Ok(AuthContext::Session {
            session_key: session_key.to_string(),
            connection_id,
        })
    }

    async fn send(&self, method: &str, endpoint: &str, params: Params) -> Result<Value, CallError> {
        let format = self.config.response_format;
        let url = self.config.method_url(method, endpoint);

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("params", &Value::Object(params).to_string())
            .append_pair("output", format.as_str())
            .finish();

        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&user_agent())
            .map_err(|err| TransportError::Other(Box::new(err)))?;
        headers.insert(header::USER_AGENT, agent);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        tracing::debug!(%url, "sending conduit request");

        let response = self
            .transport
            .post(HttpRequest { url, headers, body })
            .await?;

        if !response.status.is_success() {
            return Err(TransportError::BadStatus(response.status).into());
        }

        let envelope = decode_envelope(format, &response.body)?;
        Ok(envelope.into_result()?)
    }
}

fn user_agent() -> String {
    format!("{CLIENT_NAME}/{CLIENT_VERSION}")
}

// Some servers send the connection ID as a numeric string.
fn parse_connection_id(value: &Value) -> Option<i64> {
    match value {
        Value::String(id) => id.trim().parse().ok(),
        other => other.as_i64(),
    }
}

fn hostname() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .into_iter()
        .find_map(|var| std::env::var(var).ok().filter(|name| !name.is_empty()))
        .unwrap_or_else(|| "localhost".to_string())
}
