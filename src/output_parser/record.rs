//! Typed record extraction with strict schema validation.
//!
//! [`RecordParser<T>`] takes its [`Schema`] from `T`'s
//! [`JsonSchema`](schemars::JsonSchema) derive. The schema drives both the
//! format instructions and validation; serde only runs once the JSON is
//! known to have the declared shape.

use std::marker::PhantomData;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::output_parser::error::{truncate, ParseError};
use crate::output_parser::extract::extract_json;
use crate::output_parser::schema::Schema;
use crate::output_parser::OutputParser;

/// Preamble shared by the schema-carrying JSON parsers.
pub(crate) const JSON_SCHEMA_PREAMBLE: &str = r#"The output should be formatted as a JSON instance that conforms to the JSON schema below.

As an example, for the schema {"properties": {"foo": {"title": "Foo", "description": "a list of strings", "type": "array", "items": {"type": "string"}}}, "required": ["foo"]}
the object {"foo": ["bar", "baz"]} is a well-formatted instance of the schema. The object {"properties": {"foo": ["bar", "baz"]}} is not well-formatted.

Here is the output schema:"#;

/// Render the preamble followed by `schema` in a fenced block.
pub(crate) fn schema_instructions(schema: &Schema) -> String {
    format!("{}\n```\n{}\n```", JSON_SCHEMA_PREAMBLE, schema.json_schema())
}

/// Parses a completion into `T` after validating it against `T`'s schema.
///
/// Field doc comments become the field descriptions the model sees.
///
/// # Examples
///
/// ```
/// use llm_output_parsers::output_parser::{OutputParser, RecordParser};
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, JsonSchema)]
/// struct Review {
///     /// The title
///     title: String,
///     /// Rating out of 10
///     rating: f64,
/// }
///
/// let parser = RecordParser::<Review>::new();
/// let review = parser.parse(r#"{"title": "The Matrix", "rating": 9.5}"#).unwrap();
/// assert_eq!(review.rating, 9.5);
/// ```
pub struct RecordParser<T> {
    schema: Schema,
    _target: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned + JsonSchema> RecordParser<T> {
    pub fn new() -> Self {
        Self {
            schema: Schema::for_type::<T>(),
            _target: PhantomData,
        }
    }
}

impl<T: DeserializeOwned + JsonSchema> Default for RecordParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser<Value> {
    /// Validate against a schema known only at runtime; the value stays
    /// untyped JSON.
    pub fn from_schema(schema: Schema) -> Self {
        Self {
            schema,
            _target: PhantomData,
        }
    }
}

impl<T> RecordParser<T> {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl<T> Clone for RecordParser<T> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            _target: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for RecordParser<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordParser")
            .field("schema", &self.schema.name())
            .field("target", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned> OutputParser for RecordParser<T> {
    type Output = T;

    fn format_instructions(&self) -> String {
        schema_instructions(&self.schema)
    }

    fn parse(&self, text: &str) -> Result<T, ParseError> {
        let extracted = extract_json(text)?;
        self.schema.validate(&extracted)?;
        debug!(parser = self.kind(), schema = %self.schema.name(), "record validated");

        T::deserialize(&extracted).map_err(|e| ParseError::DeserializationFailed {
            reason: e.to_string(),
            raw_json: truncate(&extracted.to_string(), 200),
        })
    }

    fn kind(&self) -> &'static str {
        "record"
    }
}
