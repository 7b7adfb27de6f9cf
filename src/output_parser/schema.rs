//! JSON Schema descriptors for structured LLM output.
//!
//! Typed targets derive [`schemars::JsonSchema`] and [`Schema::for_type`]
//! renders that derivation, so the advertised shape and the deserialized
//! type cannot drift apart. Shapes only known at runtime come in as a JSON
//! Schema document through [`Schema::from_value`].
//!
//! Object schemas are closed (`additionalProperties: false`) unless the
//! document says otherwise. Validation runs through `jsonschema` and
//! reports the first violation as a [`ParseError`]. Nothing is coerced.
//!
//! ```
//! use llm_output_parsers::output_parser::Schema;
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct MovieReview {
//!     /// The title of the movie
//!     title: String,
//!     /// Rating out of 10
//!     rating: f64,
//!     /// Key points from the review
//!     main_points: Vec<String>,
//! }
//!
//! let schema = Schema::for_type::<MovieReview>();
//! assert_eq!(schema.name(), "MovieReview");
//! assert!(schema
//!     .validate(&json!({"title": "Heat", "rating": 8.5, "main_points": []}))
//!     .is_ok());
//! ```

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::ValidationError;
use schemars::JsonSchema;
use serde_json::Value;

use crate::output_parser::error::{json_type_name, ParseError};

/// A named JSON Schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    document: Value,
}

impl Schema {
    /// The schema `schemars` derives for `T`.
    pub fn for_type<T: JsonSchema>() -> Self {
        let document = schemars::schema_for!(T).to_value();
        Self::from_value(T::schema_name(), document)
    }

    /// Wrap a hand-supplied JSON Schema document.
    pub fn from_value(name: impl Into<String>, mut document: Value) -> Self {
        close_objects(&mut document);
        Self {
            name: name.into(),
            document,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The JSON Schema shown to the model.
    pub fn json_schema(&self) -> &Value {
        &self.document
    }

    /// Check `value` against the schema.
    ///
    /// Fails with [`ParseError::InvalidSchema`] when the document itself
    /// does not compile.
    pub fn validate(&self, value: &Value) -> Result<(), ParseError> {
        let validator =
            jsonschema::validator_for(&self.document).map_err(|e| ParseError::InvalidSchema {
                schema: self.name.clone(),
                reason: e.to_string(),
            })?;

        let result = match validator.iter_errors(value).next() {
            None => Ok(()),
            Some(error) => Err(self.violation(&error)),
        };
        result
    }

    fn violation(&self, error: &ValidationError<'_>) -> ParseError {
        let at = field_path(&error.instance_path.to_string());
        match &error.kind {
            ValidationErrorKind::Required { property } => ParseError::MissingField {
                field: join(&at, property.as_str().unwrap_or_default()),
            },
            ValidationErrorKind::AdditionalProperties { unexpected } => ParseError::UnknownField {
                field: join(&at, unexpected.first().map(String::as_str).unwrap_or_default()),
            },
            ValidationErrorKind::Type { kind } => ParseError::WrongType {
                field: self.or_root(at),
                expected: expected_types(kind),
                found: json_type_name(&error.instance),
            },
            _ => ParseError::SchemaViolation {
                field: self.or_root(at),
                reason: error.to_string(),
            },
        }
    }

    fn or_root(&self, path: String) -> String {
        if path.is_empty() {
            self.name.clone()
        } else {
            path
        }
    }
}

/// Add `additionalProperties: false` to every object schema that declares
/// `properties` and leaves extra keys unspecified.
fn close_objects(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            if map.contains_key("properties") && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".into(), Value::Bool(false));
            }
            for (keyword, child) in map.iter_mut() {
                match keyword.as_str() {
                    "properties" | "$defs" | "definitions" | "patternProperties" => {
                        if let Value::Object(named) = child {
                            named.values_mut().for_each(close_objects);
                        }
                    }
                    // Instance data, not subschemas.
                    "default" | "examples" | "const" | "enum" => {}
                    _ => close_objects(child),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

/// `/action_items/1/task` -> `action_items[1].task`.
fn field_path(pointer: &str) -> String {
    let mut path = String::new();
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if segment.parse::<usize>().is_ok() {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&segment);
        }
    }
    path
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn expected_types(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Single(ty) => ty.to_string(),
        TypeKind::Multiple(types) => (*types)
            .into_iter()
            .map(|ty| ty.to_string())
            .collect::<Vec<_>>()
            .join(" or "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Person {
        /// The person's name
        name: String,
        /// The person's age
        age: u32,
        /// List of the person's interests or hobbies
        interests: Vec<String>,
        /// The person's job or occupation
        #[serde(default)]
        occupation: String,
        /// Anything else worth knowing
        note: Option<String>,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct ActionItem {
        /// The task to be completed
        task: String,
        /// Person assigned to the task
        assignee: String,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct MeetingNotes {
        /// List of action items
        action_items: Vec<ActionItem>,
    }

    fn person() -> Schema {
        Schema::for_type::<Person>()
    }

    #[test]
    fn derived_schema_carries_doc_comments() {
        let rendered = person().json_schema().clone();
        assert_eq!(rendered["required"], json!(["name", "age", "interests"]));
        assert_eq!(rendered["properties"]["interests"]["items"]["type"], "string");
        assert_eq!(rendered["properties"]["name"]["description"], "The person's name");
        assert_eq!(rendered["additionalProperties"], json!(false));
    }

    #[test]
    fn nested_definitions_closed() {
        let rendered = Schema::for_type::<MeetingNotes>().json_schema().clone();
        let item = &rendered["$defs"]["ActionItem"];
        assert_eq!(item["required"], json!(["task", "assignee"]));
        assert_eq!(item["additionalProperties"], json!(false));
    }

    #[test]
    fn explicit_additional_properties_kept() {
        let schema = Schema::from_value(
            "Open",
            json!({"type": "object", "properties": {"a": {"type": "string"}}, "additionalProperties": true}),
        );
        assert!(schema.validate(&json!({"a": "x", "b": 1})).is_ok());
    }

    #[test]
    fn property_named_like_keyword_untouched() {
        let schema = Schema::from_value(
            "Odd",
            json!({"type": "object", "properties": {"properties": {"type": "string"}}}),
        );
        assert_eq!(
            schema.json_schema()["properties"]["properties"],
            json!({"type": "string"})
        );
    }

    #[test]
    fn validate_accepts_optional_absence_and_null() {
        let base = json!({"name": "Jake", "age": 30, "interests": ["chess"]});
        assert!(person().validate(&base).is_ok());
        let mut with_null = base.clone();
        with_null["note"] = Value::Null;
        assert!(person().validate(&with_null).is_ok());
    }

    #[test]
    fn validate_missing_field() {
        let value = json!({"name": "Jake", "interests": []});
        assert_eq!(
            person().validate(&value).unwrap_err(),
            ParseError::MissingField { field: "age".into() }
        );
    }

    #[test]
    fn validate_unknown_field() {
        let value = json!({"name": "Jake", "age": 30, "interests": [], "city": "NJ"});
        assert_eq!(
            person().validate(&value).unwrap_err(),
            ParseError::UnknownField { field: "city".into() }
        );
    }

    #[test]
    fn integer_rejects_strings() {
        let value = json!({"name": "Jake", "age": "30", "interests": []});
        assert_eq!(
            person().validate(&value).unwrap_err(),
            ParseError::WrongType {
                field: "age".into(),
                expected: "integer".into(),
                found: "string",
            }
        );
    }

    #[test]
    fn list_element_path_reported() {
        let value = json!({"name": "Jake", "age": 30, "interests": ["chess", 7]});
        assert!(matches!(
            person().validate(&value),
            Err(ParseError::WrongType { ref field, found: "integer", .. }) if field == "interests[1]"
        ));
    }

    #[test]
    fn nested_missing_field_path() {
        let value = json!({"action_items": [
            {"task": "a", "assignee": "Mike"},
            {"task": "b"}
        ]});
        assert_eq!(
            Schema::for_type::<MeetingNotes>().validate(&value).unwrap_err(),
            ParseError::MissingField { field: "action_items[1].assignee".into() }
        );
    }

    #[test]
    fn negative_unsigned_is_violation() {
        let value = json!({"name": "Jake", "age": -4, "interests": []});
        assert!(matches!(
            person().validate(&value),
            Err(ParseError::SchemaViolation { ref field, .. }) if field == "age"
        ));
    }

    #[test]
    fn top_level_must_be_object() {
        assert!(matches!(
            person().validate(&json!(["Jake"])),
            Err(ParseError::WrongType { ref field, found: "array", .. }) if field == "Person"
        ));
    }

    #[test]
    fn broken_document_reported() {
        let schema = Schema::from_value("Broken", json!({"type": 12}));
        assert!(matches!(
            schema.validate(&json!({})),
            Err(ParseError::InvalidSchema { ref schema, .. }) if schema == "Broken"
        ));
    }

    #[test]
    fn pointer_to_field_path() {
        assert_eq!(field_path(""), "");
        assert_eq!(field_path("/action_items/1/task"), "action_items[1].task");
        assert_eq!(field_path("/a~1b"), "a/b");
    }
}
