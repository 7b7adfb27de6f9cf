//! Prompt → model → parser composition.
//!
//! [`ParseChain`] binds a parser's format instructions into a prompt
//! template, sends the rendered prompt to a [`ChatModel`], and parses the
//! completion. Nothing is caught along the way: template, transport and
//! parse failures all surface as [`ChainError`](crate::ChainError).

use tracing::debug;

use crate::error::Result;
use crate::model::ChatModel;
use crate::output_parser::OutputParser;
use crate::prompt::PromptTemplate;
use crate::types::{ChainOutput, PromptVars};

/// Name of the partial variable that receives the parser's instructions.
pub const FORMAT_INSTRUCTIONS_VAR: &str = "format_instructions";

/// A single prompt → completion → parsed value step.
///
/// # Example
///
/// ```
/// use llm_output_parsers::output_parser::CommaSeparatedListParser;
/// use llm_output_parsers::{ChatModel, ModelConfig, ParseChain, PromptTemplate, PromptVars};
///
/// # #[tokio::main]
/// # async fn main() -> llm_output_parsers::Result<()> {
/// let model = ChatModel::builder(ModelConfig::default())
///     .mock(vec!["mango, papaya, guava".to_string()])
///     .build()?;
/// let chain = ParseChain::new(
///     "fruits",
///     PromptTemplate::from_template("List three tropical fruits.\n{format_instructions}")?,
///     CommaSeparatedListParser::new(),
/// );
/// let fruits = chain.invoke(&model, &PromptVars::new()).await?;
/// assert_eq!(fruits, vec!["mango", "papaya", "guava"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ParseChain<P> {
    name: String,
    prompt: PromptTemplate,
    parser: P,
    format_instructions: String,
}

impl<P: OutputParser> ParseChain<P> {
    /// Bind `parser`'s instructions into `prompt` as `{format_instructions}`.
    pub fn new(name: impl Into<String>, prompt: PromptTemplate, parser: P) -> Self {
        let format_instructions = parser.format_instructions();
        let prompt = prompt.with_partial(FORMAT_INSTRUCTIONS_VAR, format_instructions.clone());
        Self {
            name: name.into(),
            prompt,
            parser,
            format_instructions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The instructions captured when the chain was built.
    pub fn format_instructions(&self) -> &str {
        &self.format_instructions
    }

    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// The exact text that would be sent to the model.
    pub fn render(&self, vars: &PromptVars) -> Result<String> {
        Ok(self.prompt.format(vars)?)
    }

    /// Render, invoke `model`, and parse the completion.
    pub async fn invoke(&self, model: &ChatModel, vars: &PromptVars) -> Result<P::Output> {
        Ok(self.invoke_detailed(model, vars).await?.value)
    }

    /// Like [`invoke`](Self::invoke), also returning the prompt and raw completion.
    pub async fn invoke_detailed(
        &self,
        model: &ChatModel,
        vars: &PromptVars,
    ) -> Result<ChainOutput<P::Output>> {
        let prompt = self.render(vars)?;
        debug!(chain = %self.name, parser = self.parser.kind(), "prompt rendered");

        let raw_completion = model.invoke(&prompt).await?;
        let value = self.parser.parse(&raw_completion)?;
        debug!(chain = %self.name, parser = self.parser.kind(), "completion parsed");

        Ok(ChainOutput {
            prompt,
            raw_completion,
            value,
        })
    }
}
