//! # Method Resolution
//!
//! A remote method is named by an app and a method inside it (`user.whoami`). Method names
//! may themselves contain dots (`diffusion.repository.edit` is method `repository.edit` of
//! app `diffusion`), so a path cannot simply be split and looked up: each segment is resolved
//! against the working schema as it arrives.
//!
//! At every step [`MethodPath`] decides whether the next segment
//!
//! * descends into a known app or method,
//! * starts or continues a dotted method name, when the schema has methods named
//!   `<segment>.<...>` but none named exactly `<segment>`, or
//! * names something the schema does not know, in which case an empty placeholder is added
//!   so that later calls see the same entry.
//!
//! Resolution never fails. Whether the result is callable is only decided by
//! [`Resource::call`].
use super::{CallError, ConduitClient, ConduitResult, Params};
use crate::{
    catalog::{MethodSchema, Schema},
    http::Transport,
};

/// An immutable snapshot of a partially resolved method path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodPath {
    /// Schema keys descended so far: `[]`, `[app]` or `[app, method]`.
    keys: Vec<String>,
    method: Option<String>,
    endpoint: Option<String>,
    /// Set while the endpoint is the prefix of a dotted method name.
    nested: bool,
    /// The segments walked so far, for error messages.
    name: String,
}

impl MethodPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// The app component of the remote method, e.g. `diffusion`.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// The method component inside the app, e.g. `repository.edit`.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn is_nested(&self) -> bool {
        self.nested
    }

    /// The dotted path as written by the caller.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves one more segment, adding a placeholder to `schema` for unknown names.
    pub fn step(&self, schema: &mut Schema, segment: &str) -> Self {
        let name = if self.name.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{segment}", self.name)
        };

        let attr = match (&self.endpoint, self.nested) {
            (Some(endpoint), true) => format!("{endpoint}.{segment}"),
            _ => segment.to_string(),
        };

        let method = if self.nested {
            self.method.clone()
        } else {
            self.endpoint.clone()
        };

        let keys_here = self.keys_here(schema);
        let prefix = format!("{attr}.");
        let has_family = keys_here.iter().any(|key| key.starts_with(&prefix));
        let is_key = keys_here.contains(&attr);

        if has_family && !is_key {
            return Self {
                keys: self.keys.clone(),
                method,
                endpoint: Some(attr),
                nested: true,
                name,
            };
        }

        if !is_key {
            self.materialize(schema, &attr);
        }

        let mut keys = self.keys.clone();
        keys.push(attr.clone());

        Self {
            keys,
            method,
            endpoint: Some(attr),
            nested: false,
            name,
        }
    }

    /// The schema of the method this path points at. Paths that do not point at a known
    /// method get an empty schema.
    pub fn schema_for(&self, schema: &Schema) -> MethodSchema {
        match self.keys.as_slice() {
            [app, method] => schema.method(app, method).cloned().unwrap_or_default(),
            _ => MethodSchema::default(),
        }
    }

    fn keys_here(&self, schema: &Schema) -> Vec<String> {
        match self.keys.as_slice() {
            [] => schema.apps().map(str::to_string).collect(),
            [app] => schema
                .app(app)
                .map(|methods| methods.keys().cloned().collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn materialize(&self, schema: &mut Schema, attr: &str) {
        match self.keys.as_slice() {
            [] => {
                tracing::debug!(app = attr, "adding placeholder app to working schema");
                schema.app_entry(attr);
            }
            [app] => {
                tracing::debug!(app = %app, method = attr, "adding placeholder method to working schema");
                schema
                    .app_entry(app)
                    .entry(attr.to_string())
                    .or_default();
            }
            // Below a method there is nothing left to extend.
            _ => {}
        }
    }
}

/// A method path bound to the client it resolves against.
///
/// Obtained from [`ConduitClient::resource`] and extended with [`Resource::resource`].
#[derive(Debug)]
pub struct Resource<'a, T> {
    client: &'a mut ConduitClient<T>,
    path: MethodPath,
}

impl<'a, T: Transport> Resource<'a, T> {
    pub(crate) fn root(client: &'a mut ConduitClient<T>) -> Self {
        Self {
            client,
            path: MethodPath::root(),
        }
    }

    /// Resolves one more path segment.
    pub fn resource(self, name: &str) -> Self {
        let Self { client, path } = self;
        let path = path.step(&mut client.schema, name);
        Self { client, path }
    }

    pub fn method(&self) -> Option<&str> {
        self.path.method()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.path.endpoint()
    }

    pub fn path(&self) -> &MethodPath {
        &self.path
    }

    /// The schema the call will be validated against.
    pub fn schema(&self) -> MethodSchema {
        self.path.schema_for(&self.client.schema)
    }

    /// Invokes the resolved method.
    ///
    /// Fails with [`CallError::MissingResource`] when the path does not name both an app and
    /// a method, as for the root or a bare app.
    pub async fn call(self, params: Params) -> Result<ConduitResult, CallError> {
        let Self { client, path } = self;
        let (Some(method), Some(endpoint)) = (path.method(), path.endpoint()) else {
            return Err(CallError::MissingResource(path.name().to_string()));
        };

        let schema = path.schema_for(&client.schema);
        client
            .invoke(method, endpoint, &schema, params)
            .await
            .map(ConduitResult::new)
    }
}
