//! # LLM Output Parsers
//!
//! Turn free-form model completions into typed values.
//!
//! Every parser does two things: it describes the output format the model
//! should follow (its *format instructions*, embedded into the prompt), and
//! it recovers a structured value from the completion or fails with a
//! [`ParseError`]. Parsers never fabricate or repair data.
//!
//! ## Core Concepts
//!
//! - **[`OutputParser`]** — `format_instructions()` + `parse(text)`.
//!   Implementations: [`RecordParser`], [`JsonParser`],
//!   [`CommaSeparatedListParser`], [`StructuredParser`], [`DatetimeParser`],
//!   and the runtime-selected [`ParserSpec`].
//! - **[`PromptTemplate`]** — `{name}` placeholders with partial variables.
//! - **[`ChatModel`]** — an OpenAI-compatible model handle (or
//!   [`MockBackend`] offline).
//! - **[`ParseChain`]** — prompt → model → parser, with the parser's
//!   instructions bound into the prompt.
//!
//! ## Quick Start
//!
//! ```no_run
//! use llm_output_parsers::{
//!     ChatModel, ModelConfig, ParseChain, PromptTemplate, PromptVars, RecordParser,
//! };
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, JsonSchema)]
//! struct Person {
//!     /// The person's name
//!     name: String,
//!     /// The person's age
//!     age: u32,
//!     /// The person's job
//!     occupation: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let model = ChatModel::from_config(ModelConfig::from_env())?;
//!     let parser = RecordParser::<Person>::new();
//!     let chain = ParseChain::new(
//!         "person",
//!         PromptTemplate::from_template("Describe {who}.\n{format_instructions}")?,
//!         parser,
//!     );
//!     let person = chain
//!         .invoke(&model, &PromptVars::new().insert("who", "a fictional chef"))
//!         .await?;
//!     println!("{person:#?}");
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod chain;
pub mod config;
pub mod error;
pub mod model;
pub mod output_parser;
pub mod prompt;
pub mod types;

pub use backend::{BackoffConfig, MockBackend, OpenAiBackend};
pub use chain::ParseChain;
pub use config::ModelConfig;
pub use error::{ChainError, Result};
pub use model::{ChatModel, ChatModelBuilder};
pub use output_parser::{
    CommaSeparatedListParser, DatetimeParser, JsonParser, OutputParser, ParseError, ParserSpec,
    RecordParser, ResponseSchema, Schema, Structure, StructuredParser,
};
pub use prompt::{PromptTemplate, TemplateError};
pub use types::{ChainOutput, PromptVars};
