//! # LLM Output Parsers
//!
//! Parsers that turn a raw model completion into a typed value, each paired
//! with the format instructions that tell the model what to produce.
//!
//! ## Parsers Available
//!
//! | Parser | Output | Use Case |
//! |--------|--------|----------|
//! | [`RecordParser`] | `T: DeserializeOwned + JsonSchema` | Typed records with strict schema validation |
//! | [`JsonParser`] | `serde_json::Value` | Any JSON, schema only advisory |
//! | [`CommaSeparatedListParser`] | `Vec<String>` | Comma-delimited lists |
//! | [`StructuredParser`] | `Map<String, Value>` | Named fields without type enforcement |
//! | [`DatetimeParser`] | `NaiveDateTime` | One date/time expression |
//! | [`ParserSpec`] | [`Structure`] | Runtime-selected variant of the above |
//!
//! ## Shared Utilities
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`strip_think_tags`] | Remove `<think>` blocks from text |
//! | [`extract_json`] | Locate a JSON value in prose or a code fence |

pub mod datetime;
pub mod error;
pub mod extract;
pub mod json;
pub mod keyed;
pub mod list;
pub mod natural;
pub mod parser_spec;
pub mod record;
pub mod schema;

pub use datetime::DatetimeParser;
pub use error::ParseError;
pub use extract::{extract_json, preprocess, strip_think_tags};
pub use json::JsonParser;
pub use keyed::{ResponseSchema, StructuredParser};
pub use list::CommaSeparatedListParser;
pub use parser_spec::{ParserSpec, Structure};
pub use record::RecordParser;
pub use schema::Schema;

/// A parser that can describe its expected format and recover a value from text.
///
/// `format_instructions` must be a pure function of the parser's
/// configuration: the same parser always yields the same text. `parse` is
/// all-or-nothing and never returns a partially populated value.
pub trait OutputParser: Send + Sync {
    /// The structured value produced by a successful parse.
    type Output;

    /// Natural-language directive embedded in the prompt.
    fn format_instructions(&self) -> String;

    /// Interpret a raw completion.
    fn parse(&self, text: &str) -> Result<Self::Output, ParseError>;

    /// Stable identifier for logging (e.g. `"record"`, `"comma-list"`).
    fn kind(&self) -> &'static str;
}
