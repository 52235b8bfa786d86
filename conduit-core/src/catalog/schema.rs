use super::SemanticType;
use std::collections::BTreeMap;

/// Whether a caller has to supply a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optionality {
    Required,
    Optional,
}

/// The normalized description of a single remote method.
///
/// Every parameter of the catalog entry lives in exactly one of `required` or `optional`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSchema {
    pub required: BTreeMap<String, SemanticType>,
    pub optional: BTreeMap<String, SemanticType>,
    /// The verb the catalog advertises. Requests are always sent as `POST`.
    pub http_verb: http::Method,
    /// Output formats the server can render for this method.
    pub formats: Vec<String>,
    pub description: Option<String>,
    pub returns: Option<String>,
}

impl Default for MethodSchema {
    fn default() -> Self {
        Self {
            required: BTreeMap::new(),
            optional: BTreeMap::new(),
            http_verb: http::Method::POST,
            formats: vec!["json".to_string(), "human".to_string()],
            description: None,
            returns: None,
        }
    }
}

impl MethodSchema {
    /// Looks up a declared parameter in either map.
    pub fn param(&self, name: &str) -> Option<(Optionality, &SemanticType)> {
        self.required
            .get(name)
            .map(|ty| (Optionality::Required, ty))
            .or_else(|| self.optional.get(name).map(|ty| (Optionality::Optional, ty)))
    }

    /// Stores a parameter, removing it from the other map if it was already declared there.
    pub(crate) fn insert_param(
        &mut self,
        name: String,
        optionality: Optionality,
        ty: SemanticType,
    ) {
        match optionality {
            Optionality::Required => {
                self.optional.remove(&name);
                self.required.insert(name, ty);
            }
            Optionality::Optional => {
                self.required.remove(&name);
                self.optional.insert(name, ty);
            }
        }
    }
}

/// Methods of one app, keyed by method name. Method names may contain dots
/// (`repository.edit` under `diffusion`).
pub type AppSchema = BTreeMap<String, MethodSchema>;

/// The normalized interface catalog: `app -> method -> MethodSchema`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    apps: BTreeMap<String, AppSchema>,
}

impl Schema {
    pub fn apps(&self) -> impl Iterator<Item = &str> {
        self.apps.keys().map(String::as_str)
    }

    pub fn app(&self, app: &str) -> Option<&AppSchema> {
        self.apps.get(app)
    }

    pub fn method(&self, app: &str, method: &str) -> Option<&MethodSchema> {
        self.apps.get(app)?.get(method)
    }

    /// Looks up a method by its full dotted name (`diffusion.repository.edit`).
    pub fn method_by_path(&self, path: &str) -> Option<&MethodSchema> {
        let (app, method) = path.split_once('.')?;
        self.method(app, method)
    }

    /// Total number of methods across all apps.
    pub fn len(&self) -> usize {
        self.apps.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the methods of `app`, inserting an empty app if it is unknown.
    pub(crate) fn app_entry(&mut self, app: &str) -> &mut AppSchema {
        self.apps.entry(app.to_string()).or_default()
    }
}
