use crate::catalog::CatalogError;
use serde_json::Value;
use std::{fmt, str::FromStr};

/// Literal some deployments prefix JSON responses with to defeat JSON hijacking.
pub const RESPONSE_GUARD: &str = "for(;;);";

/// The output format requested from the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Json,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unsupported response format '{0}', only 'json' is available")]
pub struct UnknownFormat(pub String);

impl FromStr for ResponseFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// The response did not have the expected envelope shape.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Response body is not valid UTF-8: '{0}'")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("Failed to decode response body: '{0}'")]
    Json(#[from] serde_json::Error),
    #[error("Response envelope must be a JSON object, got: '{0}'")]
    NotAnEnvelope(String),
    #[error("Response result is missing field '{0}'")]
    MissingField(&'static str),
    #[error("Server returned an unusable interface catalog: '{0}'")]
    Catalog(#[from] CatalogError),
}

/// The server reported a failure inside an otherwise successful response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {}", .info.as_deref().unwrap_or("(no error info)"))]
pub struct ApiError {
    pub code: String,
    pub info: Option<String>,
}

/// A decoded `{result, error_code, error_info}` response.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub result: Value,
    pub error_code: Option<String>,
    pub error_info: Option<String>,
}

impl Envelope {
    /// Returns the result, or the remote error if `error_code` is set.
    pub fn into_result(self) -> Result<Value, ApiError> {
        match self.error_code {
            Some(code) => Err(ApiError {
                code,
                info: self.error_info,
            }),
            None => Ok(self.result),
        }
    }
}

/// Decodes a response body into an [`Envelope`].
///
/// A leading [`RESPONSE_GUARD`] is stripped when present. An empty `error_code` counts as
/// success. An object carrying neither `result` nor `error_code` is not an envelope.
pub fn decode_envelope(format: ResponseFormat, body: &[u8]) -> Result<Envelope, ProtocolError> {
    let text = std::str::from_utf8(body)?.trim_start();
    let text = text.strip_prefix(RESPONSE_GUARD).unwrap_or(text);

    let value = match format {
        ResponseFormat::Json => serde_json::from_str::<Value>(text)?,
    };

    let Value::Object(mut fields) = value else {
        return Err(ProtocolError::NotAnEnvelope(truncate(text)));
    };

    if !fields.contains_key("result") && !fields.contains_key("error_code") {
        return Err(ProtocolError::NotAnEnvelope(truncate(text)));
    }

    Ok(Envelope {
        result: fields.remove("result").unwrap_or(Value::Null),
        error_code: non_empty_text(fields.remove("error_code")),
        error_info: non_empty_text(fields.remove("error_info")),
    })
}

fn non_empty_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn truncate(text: &str) -> String {
    const MAX: usize = 120;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
