//! Runtime-selected parser variant.
//!
//! [`ParserSpec`] lets a caller choose the output shape from data (a config
//! value, a CLI flag) instead of a type parameter. Every variant yields a
//! [`Structure`], which serializes to plain JSON.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::output_parser::datetime::DatetimeParser;
use crate::output_parser::error::ParseError;
use crate::output_parser::keyed::{ResponseSchema, StructuredParser};
use crate::output_parser::list::CommaSeparatedListParser;
use crate::output_parser::record::RecordParser;
use crate::output_parser::schema::Schema;
use crate::output_parser::OutputParser;

/// Which parser to run, with its configuration.
#[derive(Debug, Clone)]
pub enum ParserSpec {
    /// Strict schema validation; the value stays untyped JSON.
    Record(RecordParser<Value>),
    List(CommaSeparatedListParser),
    KeyedSchema(StructuredParser),
    DateTime(DatetimeParser),
}

impl ParserSpec {
    pub fn record(schema: Schema) -> Self {
        ParserSpec::Record(RecordParser::from_schema(schema))
    }

    pub fn list() -> Self {
        ParserSpec::List(CommaSeparatedListParser::new())
    }

    pub fn keyed(schemas: Vec<ResponseSchema>) -> Self {
        ParserSpec::KeyedSchema(StructuredParser::from_response_schemas(schemas))
    }

    pub fn datetime(parser: DatetimeParser) -> Self {
        ParserSpec::DateTime(parser)
    }
}

/// The value produced by a [`ParserSpec`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Structure {
    Record(Value),
    List(Vec<String>),
    Keyed(Map<String, Value>),
    DateTime(NaiveDateTime),
}

impl OutputParser for ParserSpec {
    type Output = Structure;

    fn format_instructions(&self) -> String {
        match self {
            ParserSpec::Record(parser) => parser.format_instructions(),
            ParserSpec::List(parser) => parser.format_instructions(),
            ParserSpec::KeyedSchema(parser) => parser.format_instructions(),
            ParserSpec::DateTime(parser) => parser.format_instructions(),
        }
    }

    fn parse(&self, text: &str) -> Result<Structure, ParseError> {
        match self {
            ParserSpec::Record(parser) => parser.parse(text).map(Structure::Record),
            ParserSpec::List(parser) => parser.parse(text).map(Structure::List),
            ParserSpec::KeyedSchema(parser) => parser.parse(text).map(Structure::Keyed),
            ParserSpec::DateTime(parser) => parser.parse(text).map(Structure::DateTime),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ParserSpec::Record(parser) => parser.kind(),
            ParserSpec::List(parser) => parser.kind(),
            ParserSpec::KeyedSchema(parser) => parser.kind(),
            ParserSpec::DateTime(parser) => parser.kind(),
        }
    }
}
