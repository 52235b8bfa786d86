//! # Parameter Types
//!
//! The catalog describes parameters with free-text type hints such as `"uint"`,
//! `"list<phid>"` or `"list<pair<callsign, path>>"`. This module maps a hint onto a
//! [`SemanticType`], the closed set of shapes the client can check a JSON argument against.
//!
//! Mapping never fails: an unrecognized hint becomes [`SemanticType::StringLike`].
use serde_json::Value;
use std::fmt;

/// The shape a parameter value is expected to have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticType {
    /// Any integral JSON number.
    Integer,
    /// A JSON boolean.
    Boolean,
    /// A JSON object.
    Mapping,
    /// A fixed-size group of values, carried as a JSON array.
    Tuple,
    /// A JSON string, for hints that explicitly name a string type.
    String,
    /// Either a single element or a JSON array of elements.
    Sequence(Box<SemanticType>),
    /// The lenient default for hints the mapper does not recognize.
    StringLike,
}

impl SemanticType {
    pub fn sequence_of(element: SemanticType) -> Self {
        SemanticType::Sequence(Box::new(element))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, SemanticType::Sequence(_))
    }

    /// Returns the element type if this is a [`SemanticType::Sequence`].
    pub fn element(&self) -> Option<&SemanticType> {
        match self {
            SemanticType::Sequence(element) => Some(element),
            _ => None,
        }
    }

    /// Checks whether `value` has the shape described by this type.
    ///
    /// A sequence accepts a single matching element or an array whose elements all match.
    /// Element checks are shallow: a sequence of sequences only checks that each element
    /// is an array.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            SemanticType::Sequence(element) => match value {
                Value::Array(items) => items.iter().all(|item| element.matches_element(item)),
                single => element.matches_element(single),
            },
            scalar => scalar.matches_scalar(value),
        }
    }

    fn matches_element(&self, value: &Value) -> bool {
        match self {
            SemanticType::Sequence(_) => value.is_array(),
            scalar => scalar.matches_scalar(value),
        }
    }

    fn matches_scalar(&self, value: &Value) -> bool {
        match (self, value) {
            (SemanticType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (SemanticType::Boolean, Value::Bool(_)) => true,
            (SemanticType::Mapping, Value::Object(_)) => true,
            (SemanticType::Tuple, Value::Array(_)) => true,
            (SemanticType::String | SemanticType::StringLike, Value::String(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Integer => write!(f, "integer"),
            SemanticType::Boolean => write!(f, "boolean"),
            SemanticType::Mapping => write!(f, "map"),
            SemanticType::Tuple => write!(f, "pair"),
            SemanticType::String => write!(f, "string"),
            SemanticType::Sequence(element) => write!(f, "list<{element}>"),
            SemanticType::StringLike => write!(f, "string-like"),
        }
    }
}

/// Maps a catalog type hint onto a [`SemanticType`].
///
/// Only the leading word of the hint is inspected. For `list<...>` and `array<...>` the
/// leading word of the bracketed text becomes the element type, so
/// `list<pair<callsign, path>>` is a sequence of tuples and anything nested deeper is ignored.
///
/// # Examples
///
/// ```
/// use conduit_core::catalog::{SemanticType, map_type};
///
/// assert_eq!(map_type("uint"), SemanticType::Integer);
/// assert_eq!(map_type("list<bool>"), SemanticType::sequence_of(SemanticType::Boolean));
/// assert_eq!(map_type("wild"), SemanticType::StringLike);
/// ```
pub fn map_type(hint: &str) -> SemanticType {
    let Some((main, rest)) = leading_word(hint) else {
        return SemanticType::StringLike;
    };
    let main = main.to_ascii_lowercase();

    if main == "list" || main == "array" {
        let sub = rest
            .strip_prefix('<')
            .map(|inner| inner.trim_end_matches('>').trim())
            .filter(|inner| !inner.is_empty())
            .unwrap_or("str");

        let element = match leading_word(sub) {
            Some((word, _)) => scalar_type(&word.to_ascii_lowercase()),
            None => SemanticType::StringLike,
        };

        return SemanticType::sequence_of(element);
    }

    scalar_type(&main)
}

fn scalar_type(name: &str) -> SemanticType {
    match name {
        "int" | "uint" | "revisionid" | "revision_id" | "diffid" | "diff_id" | "id" | "enum" => {
            SemanticType::Integer
        }
        "bool" => SemanticType::Boolean,
        "map" | "dict" => SemanticType::Mapping,
        "list" => SemanticType::sequence_of(SemanticType::StringLike),
        "pair" => SemanticType::Tuple,
        "str" | "string" | "phid" | "guids" | "type" => SemanticType::String,
        _ => SemanticType::StringLike,
    }
}

/// Splits off the first run of word characters, skipping surrounding whitespace and a
/// single opening angle bracket.
fn leading_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    let text = text.strip_prefix('<').unwrap_or(text);
    let end = text
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());

    if end == 0 {
        return None;
    }

    Some(text.split_at(end))
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
