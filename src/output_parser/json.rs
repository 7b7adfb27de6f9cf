//! Untyped JSON extraction from LLM responses.
//!
//! [`JsonParser`] returns whatever JSON value the model produced. A schema
//! can be attached to improve the format instructions, but it is not
//! enforced; use [`RecordParser`](super::RecordParser) for that.

use serde_json::Value;

use crate::output_parser::error::ParseError;
use crate::output_parser::extract::extract_json;
use crate::output_parser::record::schema_instructions;
use crate::output_parser::schema::Schema;
use crate::output_parser::OutputParser;

const PLAIN_JSON_INSTRUCTIONS: &str = "Return a JSON object.";

/// Parses any JSON value out of a completion.
///
/// # Examples
///
/// ```
/// use llm_output_parsers::output_parser::{JsonParser, OutputParser};
///
/// let parser = JsonParser::new();
/// let value = parser.parse("Here you go: {\"setup\": \"Why?\", \"punchline\": \"Because.\"}").unwrap();
/// assert_eq!(value["punchline"], "Because.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonParser {
    schema: Option<Schema>,
}

impl JsonParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe the expected shape in the format instructions.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }
}

impl OutputParser for JsonParser {
    type Output = Value;

    fn format_instructions(&self) -> String {
        match self.schema {
            Some(ref schema) => schema_instructions(schema),
            None => PLAIN_JSON_INSTRUCTIONS.to_string(),
        }
    }

    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        extract_json(text)
    }

    fn kind(&self) -> &'static str {
        "json"
    }
}
