//! # Interface Catalog
//!
//! The Conduit service describes itself with an interface catalog: a JSON document mapping
//! `"<app>.<method>"` to the method's parameters, each described by a human-written hint such
//! as `"optional list<phid>"` or `"required nonempty string (the query)"`.
//!
//! The same document shape is produced by the live `conduit.query` method and by the snapshot
//! bundled with this crate. [`parse_catalog`] normalizes it into a [`Schema`].
//!
//! The catalog is hand-written documentation repurposed as a schema source, so parsing is
//! lenient throughout: malformed entries are skipped and unknown type hints fall back to
//! [`SemanticType::StringLike`].
mod schema;
mod types;

pub use schema::*;
pub use types::*;

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::LazyLock;

const DEFAULT_CATALOG: &str = include_str!("../catalog/interfaces.json");

static DEFAULT_SCHEMA: LazyLock<Schema> = LazyLock::new(|| match Catalog::from_slice(
    DEFAULT_CATALOG.as_bytes(),
) {
    Ok(catalog) => parse_catalog(&catalog),
    Err(err) => {
        tracing::error!(error = %err, "bundled interface catalog is unreadable");
        Schema::default()
    }
});

/// Returns a fresh copy of the schema parsed from the bundled catalog snapshot.
///
/// The snapshot is parsed once per process; every call hands out an independent copy.
pub fn default_schema() -> Schema {
    DEFAULT_SCHEMA.clone()
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to decode interface catalog: '{0}'")]
    Json(#[from] serde_json::Error),
    #[error("Interface catalog must be a JSON object, got: {0}")]
    NotAnObject(String),
}

/// One raw catalog entry, as documented by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogEntry {
    /// Parameter name to free-text type hint.
    pub params: IndexMap<String, String>,
    pub description: Option<String>,
    pub returns: Option<String>,
}

/// The raw interface catalog, keyed by dotted method name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Builds a catalog from an already decoded JSON document.
    ///
    /// Entries that are not objects are kept with no parameters, `params` given as a
    /// JSON array (an empty PHP array) means no parameters, and non-string hints are
    /// treated as empty hints.
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        let Value::Object(map) = value else {
            return Err(CatalogError::NotAnObject(json_kind(&value).to_string()));
        };

        let entries = map
            .into_iter()
            .map(|(name, entry)| (name, CatalogEntry::from_value(entry)))
            .collect();

        Ok(Self { entries })
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: CatalogEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CatalogEntry {
    fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        let params = match fields.remove("params") {
            Some(Value::Object(params)) => params
                .into_iter()
                .map(|(name, hint)| match hint {
                    Value::String(hint) => (name, hint),
                    _ => (name, String::new()),
                })
                .collect(),
            _ => IndexMap::new(),
        };

        Self {
            params,
            description: take_string(&mut fields, "description"),
            returns: take_string(&mut fields, "return"),
        }
    }
}

fn take_string(fields: &mut serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalizes a raw catalog into a [`Schema`].
///
/// Catalog keys are split on the first `.` only, so `diffusion.repository.edit` becomes
/// method `repository.edit` of app `diffusion`. Keys without an app component are skipped.
pub fn parse_catalog(catalog: &Catalog) -> Schema {
    let mut schema = Schema::default();

    for (name, entry) in catalog.iter() {
        let Some((app, method)) = name
            .split_once('.')
            .filter(|(app, method)| !app.is_empty() && !method.is_empty())
        else {
            tracing::warn!(method = name, "skipping catalog entry without an app component");
            continue;
        };

        let mut method_schema = MethodSchema {
            description: entry.description.clone(),
            returns: entry.returns.clone(),
            ..MethodSchema::default()
        };

        for (param, hint) in &entry.params {
            let (optionality, ty) = parse_param(hint);
            method_schema.insert_param(param.clone(), optionality, ty);
        }

        schema
            .app_entry(app)
            .insert(method.to_string(), method_schema);
    }

    schema
}

/// Derives the optionality and type of a parameter from its free-text description.
///
/// The first `optional`/`required` token sets the optionality; `nonempty` and `deprecated`
/// override it, and `ignored` anywhere in the hint always makes the parameter optional. Any
/// other token is taken as the type hint, the last one winning.
pub fn parse_param(description: &str) -> (Optionality, SemanticType) {
    let mut explicit = None;
    let mut forced = None;
    let mut ignored = false;
    let mut hint = None;

    for token in hint_tokens(strip_trailing_comment(description)) {
        match token {
            "optional" => {
                explicit.get_or_insert(Optionality::Optional);
            }
            "required" => {
                explicit.get_or_insert(Optionality::Required);
            }
            "ignored" => ignored = true,
            "nonempty" => forced = Some(Optionality::Required),
            "deprecated" => forced = Some(Optionality::Optional),
            other => hint = Some(other),
        }
    }

    if ignored {
        forced = Some(Optionality::Optional);
    }

    let optionality = forced.or(explicit).unwrap_or(Optionality::Required);
    let ty = match hint {
        Some(hint) if !ignored => map_type(hint),
        _ => SemanticType::StringLike,
    };

    (optionality, ty)
}

/// Removes one trailing parenthetical comment, e.g. `"optional int (default = 100)"`.
fn strip_trailing_comment(text: &str) -> &str {
    let trimmed = text.trim_end();

    if let Some(body) = trimmed.strip_suffix(')')
        && let Some(open) = body.rfind('(')
    {
        let comment = &body[open + 1..];
        if !comment.is_empty() && !comment.contains(')') {
            return body[..open].trim_end();
        }
    }

    trimmed
}

/// Splits a hint on whitespace outside angle brackets, so `list<pair<a, b>>` stays one
/// token. Tokens that do not start with a word character carry no information and are
/// dropped.
fn hint_tokens(text: &str) -> impl Iterator<Item = &str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (idx, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    tokens.push(&text[begin..idx]);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(idx);
    }

    if let Some(begin) = start {
        tokens.push(&text[begin..]);
    }

    tokens
        .into_iter()
        .filter(|token| token.chars().next().is_some_and(is_word_char))
}
