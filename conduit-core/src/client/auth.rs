//! # Authentication
//!
//! A client authenticates either with a long-lived API token or with a user name and
//! certificate, in which case a signed handshake (`conduit.connect`) establishes a session.
//!
//! [`Authenticator`] owns the credentials and the [`AuthState`] machine:
//!
//! ```text
//! Unauthenticated --(token)--------------------------------> Authenticated
//! Unauthenticated --(certificate)--> Authenticating --(ok)--> Authenticated
//!                                          |
//!                                          +--(error)--> Unauthenticated
//! ```
//!
//! `Authenticated` is never left for the lifetime of the client.
use serde_json::{Value, json};
use sha1::{Digest, Sha1};
use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

/// The reserved parameter key the authentication context travels under.
pub const CONTEXT_KEY: &str = "__conduit__";

/// Credential material for one host.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A long-lived API token. No handshake is needed.
    Token(String),
    /// A user name and the certificate secret used to sign the handshake.
    Certificate { user: String, certificate: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Credentials::Certificate { user, .. } => f
                .debug_struct("Certificate")
                .field("user", user)
                .field("certificate", &"<redacted>")
                .finish(),
        }
    }
}

/// What gets attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Token { token: String },
    Session { session_key: String, connection_id: i64 },
}

impl AuthContext {
    pub fn to_value(&self) -> Value {
        match self {
            AuthContext::Token { token } => json!({ "token": token }),
            AuthContext::Session {
                session_key,
                connection_id,
            } => json!({ "sessionKey": session_key, "connectionID": connection_id }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// A handshake is in flight.
    Authenticating,
    Authenticated(AuthContext),
}

#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Credentials,
    state: AuthState,
}

impl Authenticator {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn context(&self) -> Option<&AuthContext> {
        match &self.state {
            AuthState::Authenticated(context) => Some(context),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.context().is_some()
    }

    /// Token clients authenticate without a network round trip. Returns whether the
    /// client is authenticated afterwards.
    pub(crate) fn authenticate_with_token(&mut self) -> bool {
        if !self.is_authenticated()
            && let Credentials::Token(token) = &self.credentials
        {
            let context = AuthContext::Token {
                token: token.clone(),
            };
            self.transition(AuthState::Authenticated(context));
        }
        self.is_authenticated()
    }

    pub(crate) fn begin_handshake(&mut self) {
        self.transition(AuthState::Authenticating);
    }

    pub(crate) fn finish_handshake(&mut self, context: AuthContext) {
        self.transition(AuthState::Authenticated(context));
    }

    pub(crate) fn abort_handshake(&mut self) {
        self.transition(AuthState::Unauthenticated);
    }

    /// Computes the `authToken`/`authSignature` pair for a handshake issued at `now`.
    /// Token credentials never sign.
    pub(crate) fn handshake_signature(&self, now: SystemTime) -> Option<(String, String)> {
        match &self.credentials {
            Credentials::Certificate { certificate, .. } => {
                let token = auth_token(now);
                let signature = sign(&token, certificate);
                Some((token, signature))
            }
            Credentials::Token(_) => None,
        }
    }

    // Every state change goes through here. An authenticated client stays authenticated.
    fn transition(&mut self, next: AuthState) {
        if self.is_authenticated() {
            return;
        }
        tracing::debug!(
            from = state_name(&self.state),
            to = state_name(&next),
            "auth state change"
        );
        self.state = next;
    }
}

fn state_name(state: &AuthState) -> &'static str {
    match state {
        AuthState::Unauthenticated => "unauthenticated",
        AuthState::Authenticating => "authenticating",
        AuthState::Authenticated(_) => "authenticated",
    }
}

/// The time-based one-time token: unix seconds as a decimal string.
pub fn auth_token(now: SystemTime) -> String {
    now.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// Signs a handshake token: lowercase hex SHA-1 over `token` followed by `certificate`.
pub fn sign(token: &str, certificate: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(token.as_bytes());
    hasher.update(certificate.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const CERTIFICATE: &str = concat!(
        "fdhcq3zsyijnm4h6gmh43zue5umsmng5t4dlwodvmiz4cnc6fl6f",
        "zrvjbfg2ftktrcddan7b3xtgmfge2afbrh4uwam6pfxpq5dbkhbl",
        "6mgaijdzpq5efw2ynlnjhoeqyh6dakl4yg346gbhabzkcxreu7hc",
        "jhw6vo6wwa7ky2sjdk742khlgsakwtme6sr2dfkhlxxkcqw3jngy",
        "rq5zj7m6m7hnscuzlzsviawnvg47pe7l4hxiexpbb5k456r"
    );

    fn certificate_credentials() -> Credentials {
        Credentials::Certificate {
            user: "test".to_string(),
            certificate: CERTIFICATE.to_string(),
        }
    }

    #[test]
    fn test_sign() {
        assert_eq!(
            sign("12345678", CERTIFICATE),
            "f8d3bea4e58a2b2967d93d5b307bfa7c693b2e7f"
        );
    }

    #[test]
    fn test_auth_token_is_unix_seconds() {
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(auth_token(now), "1700000000");
    }

    #[test]
    fn test_token_credentials_authenticate_locally() {
        let mut auth = Authenticator::new(Credentials::Token("api-abc".to_string()));
        assert_eq!(auth.state(), &AuthState::Unauthenticated);

        assert!(auth.authenticate_with_token());
        assert_eq!(
            auth.context(),
            Some(&AuthContext::Token {
                token: "api-abc".to_string()
            })
        );
        assert!(auth.handshake_signature(SystemTime::now()).is_none());
    }

    #[test]
    fn test_certificate_handshake_transitions() {
        let mut auth = Authenticator::new(certificate_credentials());
        assert!(!auth.authenticate_with_token());

        auth.begin_handshake();
        assert_eq!(auth.state(), &AuthState::Authenticating);
        auth.abort_handshake();
        assert_eq!(auth.state(), &AuthState::Unauthenticated);

        auth.begin_handshake();
        let context = AuthContext::Session {
            session_key: "key".to_string(),
            connection_id: 1759,
        };
        auth.finish_handshake(context.clone());
        assert_eq!(auth.context(), Some(&context));

        // Authenticated is terminal.
        auth.abort_handshake();
        assert_eq!(auth.context(), Some(&context));
    }

    #[test]
    fn test_handshake_signature_matches_token() {
        let auth = Authenticator::new(certificate_credentials());
        let now = UNIX_EPOCH + Duration::from_secs(12_345_678);

        let (token, signature) = auth.handshake_signature(now).unwrap();

        assert_eq!(token, "12345678");
        assert_eq!(signature, "f8d3bea4e58a2b2967d93d5b307bfa7c693b2e7f");
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let debug = format!("{:?}", certificate_credentials());
        assert!(!debug.contains(CERTIFICATE));
        assert!(debug.contains("test"));
    }

    #[test]
    fn test_context_wire_shape() {
        let session = AuthContext::Session {
            session_key: "abc".to_string(),
            connection_id: 1759,
        };
        assert_eq!(
            session.to_value(),
            json!({"sessionKey": "abc", "connectionID": 1759})
        );
    }
}
