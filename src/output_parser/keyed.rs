//! Named-field extraction without type enforcement.
//!
//! [`StructuredParser`] is declared with a flat list of [`ResponseSchema`]
//! entries. Every declared name must appear in the model's JSON and no other
//! key may; the values are returned as-is. The type on each entry is only
//! advisory text in the format instructions.

use serde_json::{Map, Value};
use tracing::debug;

use crate::output_parser::error::{json_type_name, ParseError};
use crate::output_parser::extract::extract_json;
use crate::output_parser::OutputParser;

const KEYED_PREAMBLE: &str = "The output should be a markdown code snippet formatted in the following schema, including the leading and trailing \"```json\" and \"```\":";

/// One named, described output field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    pub name: String,
    pub description: String,
    /// Advisory type shown to the model. Default: `"string"`.
    pub type_hint: String,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            type_hint: "string".to_string(),
        }
    }

    /// Override the advisory type (e.g. `"float"`, `"List[string]"`).
    pub fn with_type(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = type_hint.into();
        self
    }
}

/// Parses a JSON object whose keys are exactly the declared schema names.
///
/// # Examples
///
/// ```
/// use llm_output_parsers::output_parser::{OutputParser, ResponseSchema, StructuredParser};
///
/// let parser = StructuredParser::from_response_schemas(vec![
///     ResponseSchema::new("color", "The primary color"),
///     ResponseSchema::new("mood", "The mood it evokes"),
/// ]);
/// let out = parser
///     .parse("```json\n{\"color\": \"orange\", \"mood\": \"peaceful\"}\n```")
///     .unwrap();
/// assert_eq!(out["mood"], "peaceful");
/// ```
#[derive(Debug, Clone)]
pub struct StructuredParser {
    schemas: Vec<ResponseSchema>,
}

impl StructuredParser {
    pub fn from_response_schemas(schemas: Vec<ResponseSchema>) -> Self {
        Self { schemas }
    }

    pub fn schemas(&self) -> &[ResponseSchema] {
        &self.schemas
    }
}

impl OutputParser for StructuredParser {
    type Output = Map<String, Value>;

    fn format_instructions(&self) -> String {
        let lines: Vec<String> = self
            .schemas
            .iter()
            .map(|s| format!("\t\"{}\": {}  // {}", s.name, s.type_hint, s.description))
            .collect();
        format!(
            "{}\n\n```json\n{{\n{}\n}}\n```",
            KEYED_PREAMBLE,
            lines.join("\n")
        )
    }

    fn parse(&self, text: &str) -> Result<Map<String, Value>, ParseError> {
        let object = match extract_json(text)? {
            Value::Object(map) => map,
            other => {
                return Err(ParseError::WrongType {
                    field: "<root>".into(),
                    expected: "object".into(),
                    found: json_type_name(&other),
                })
            }
        };

        if let Some(missing) = self.schemas.iter().find(|s| !object.contains_key(&s.name)) {
            return Err(ParseError::MissingField {
                field: missing.name.clone(),
            });
        }
        if let Some(unknown) = object
            .keys()
            .find(|k| !self.schemas.iter().any(|s| &s.name == *k))
        {
            return Err(ParseError::UnknownField {
                field: unknown.clone(),
            });
        }

        debug!(parser = self.kind(), fields = object.len(), "keyed output parsed");
        Ok(object)
    }

    fn kind(&self) -> &'static str {
        "keyed"
    }
}
