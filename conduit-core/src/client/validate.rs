use super::Params;
use crate::catalog::{MethodSchema, SemanticType};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required argument: {0}")]
    MissingArgument(String),
    #[error("Wrong argument type: {0} is not a list")]
    NotAList(String),
    #[error("Wrong argument type: {name} is not a list of {expected}")]
    WrongElementType {
        name: String,
        expected: SemanticType,
    },
    #[error("Wrong argument type: {name} is not a {expected}")]
    WrongType {
        name: String,
        expected: SemanticType,
    },
}

impl ValidationError {
    /// The parameter the error is about.
    pub fn param(&self) -> &str {
        match self {
            ValidationError::MissingArgument(name) | ValidationError::NotAList(name) => name,
            ValidationError::WrongElementType { name, .. }
            | ValidationError::WrongType { name, .. } => name,
        }
    }
}

/// Checks `params` against `schema` and returns them with any `:type` suffix stripped from
/// their names.
///
/// Every required parameter must be present. Every present parameter declared by the schema
/// must have the declared shape; a `null` optional parameter is accepted as absent.
/// Parameters the schema does not declare are passed through untouched.
pub fn validate(schema: &MethodSchema, params: Params) -> Result<Params, ValidationError> {
    let params: Params = params
        .into_iter()
        .map(|(name, value)| (strip_type_suffix(&name).to_string(), value))
        .collect();

    for (name, ty) in &schema.required {
        let value = params
            .get(name)
            .ok_or_else(|| ValidationError::MissingArgument(name.clone()))?;
        check(name, ty, value)?;
    }

    for (name, ty) in &schema.optional {
        if let Some(value) = params.get(name)
            && !value.is_null()
        {
            check(name, ty, value)?;
        }
    }

    Ok(params)
}

fn strip_type_suffix(name: &str) -> &str {
    name.split_once(':').map_or(name, |(name, _)| name)
}

fn check(name: &str, ty: &SemanticType, value: &Value) -> Result<(), ValidationError> {
    // Tuples travel as JSON arrays too, so they are exempt.
    if value.is_array() && !ty.is_sequence() && *ty != SemanticType::Tuple {
        return Err(ValidationError::NotAList(name.to_string()));
    }

    if ty.matches(value) {
        return Ok(());
    }

    Err(match ty.element() {
        Some(element) => ValidationError::WrongElementType {
            name: name.to_string(),
            expected: element.clone(),
        },
        None => ValidationError::WrongType {
            name: name.to_string(),
            expected: ty.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Optionality;
    use serde_json::json;

    fn schema() -> MethodSchema {
        let mut schema = MethodSchema::default();
        schema.insert_param("query".into(), Optionality::Required, SemanticType::String);
        schema.insert_param(
            "ids".into(),
            Optionality::Required,
            SemanticType::sequence_of(SemanticType::Integer),
        );
        schema.insert_param("limit".into(), Optionality::Optional, SemanticType::Integer);
        schema
    }

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("test params must be an object"),
        }
    }

    #[test]
    fn test_missing_required_argument() {
        let err = validate(&schema(), params(json!({"ids": [1]}))).unwrap_err();

        assert_eq!(err, ValidationError::MissingArgument("query".into()));
        assert_eq!(err.to_string(), "Missing required argument: query");
    }

    #[test]
    fn test_list_against_plain_type() {
        let err = validate(&schema(), params(json!({"query": ["a"], "ids": [1]}))).unwrap_err();

        assert_eq!(err, ValidationError::NotAList("query".into()));
        assert_eq!(err.to_string(), "Wrong argument type: query is not a list");
    }

    #[test]
    fn test_wrong_element_type() {
        let err =
            validate(&schema(), params(json!({"query": "a", "ids": [1, "2"]}))).unwrap_err();

        assert_eq!(err.param(), "ids");
        assert_eq!(
            err.to_string(),
            "Wrong argument type: ids is not a list of integer"
        );
    }

    #[test]
    fn test_tuples_travel_as_lists() {
        let mut schema = MethodSchema::default();
        schema.insert_param("path".into(), Optionality::Required, SemanticType::Tuple);

        let validated = validate(&schema, params(json!({"path": ["rP", "README"]}))).unwrap();
        assert_eq!(validated["path"], json!(["rP", "README"]));

        let err = validate(&schema, params(json!({"path": "README"}))).unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongType {
                name: "path".into(),
                expected: SemanticType::Tuple
            }
        );

        // Every other plain type still rejects a list.
        for ty in [
            SemanticType::Integer,
            SemanticType::Boolean,
            SemanticType::Mapping,
            SemanticType::String,
            SemanticType::StringLike,
        ] {
            let mut schema = MethodSchema::default();
            schema.insert_param("value".into(), Optionality::Required, ty);

            let err = validate(&schema, params(json!({"value": [1]}))).unwrap_err();
            assert_eq!(err, ValidationError::NotAList("value".into()));
        }
    }

    #[test]
    fn test_single_value_for_sequence() {
        let validated = validate(&schema(), params(json!({"query": "a", "ids": 3}))).unwrap();
        assert_eq!(validated["ids"], json!(3));
    }

    #[test]
    fn test_type_suffix_is_stripped() {
        let validated =
            validate(&schema(), params(json!({"query:string": "a", "ids": [1]}))).unwrap();

        assert!(validated.contains_key("query"));
        assert!(!validated.contains_key("query:string"));
    }

    #[test]
    fn test_optional_parameters_are_checked_when_present() {
        let err = validate(
            &schema(),
            params(json!({"query": "a", "ids": [], "limit": "ten"})),
        )
        .unwrap_err();
        assert_eq!(err.param(), "limit");

        assert!(validate(&schema(), params(json!({"query": "a", "ids": [], "limit": null}))).is_ok());
    }

    #[test]
    fn test_undeclared_parameters_pass_through() {
        let validated = validate(
            &MethodSchema::default(),
            params(json!({"anything": {"goes": true}})),
        )
        .unwrap();
        assert_eq!(validated["anything"], json!({"goes": true}));
    }
}
