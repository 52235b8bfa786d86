use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::{fmt, ops::Index};

/// Call arguments, keyed by parameter name.
///
/// A name may carry a `:type` suffix (`"ids:list"`); it is stripped before validation.
pub type Params = Map<String, Value>;

/// The `result` of a successful call, viewed as a key-value container.
///
/// Most Conduit methods return an object, which is what the map-like accessors operate on.
/// Any other JSON value is still available through [`ConduitResult::as_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConduitResult {
    value: Value,
}

impl ConduitResult {
    pub(crate) fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.as_object()?.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.value.as_object_mut()?.get_mut(key)
    }

    /// Sets `key`, returning its previous value.
    ///
    /// A result that is not an object is replaced by an empty one first.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        if !self.value.is_object() {
            self.value = Value::Object(Map::new());
        }
        self.value
            .as_object_mut()
            .and_then(|map| map.insert(key.into(), value))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.value.as_object_mut()?.remove(key)
    }

    /// Number of entries: keys of an object, elements of an array, zero for `null` and one
    /// for any other value.
    pub fn len(&self) -> usize {
        match &self.value {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates over the entries of an object result. Other results yield nothing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.value
            .as_object()
            .into_iter()
            .flat_map(|map| map.iter().map(|(key, value)| (key.as_str(), value)))
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_inner(self) -> Value {
        self.value
    }

    /// Decodes the result into a caller-defined type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.value)
    }
}

impl Index<&str> for ConduitResult {
    type Output = Value;

    /// Returns `Value::Null` for missing keys, like indexing a [`Value`].
    fn index(&self, key: &str) -> &Value {
        &self.value[key]
    }
}

impl From<Value> for ConduitResult {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ConduitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#}", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}
