//! Walkthrough of every parser against a live OpenAI-compatible model.
//!
//! Run with: `cargo run --example parsing_tutorial`
//! Needs `OPENAI_API_KEY` (environment or `.env`). `RUST_LOG=debug` shows
//! each request and parse step.

use chrono::Local;
use llm_output_parsers::output_parser::Schema;
use llm_output_parsers::{
    ChatModel, CommaSeparatedListParser, DatetimeParser, JsonParser, ModelConfig, OutputParser,
    ParseChain, PromptTemplate, PromptVars, RecordParser, ResponseSchema, StructuredParser,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, JsonSchema)]
#[allow(dead_code)]
struct Person {
    /// The person's name
    name: String,
    /// The person's age
    age: u32,
    /// List of the person's interests or hobbies
    interests: Vec<String>,
    /// The person's job or occupation
    #[serde(default = "unknown_occupation")]
    occupation: String,
}

fn unknown_occupation() -> String {
    "Unknown".into()
}

#[derive(Debug, Deserialize, JsonSchema)]
#[allow(dead_code)]
struct Joke {
    /// question to set up a joke
    setup: String,
    /// answer to resolve the joke
    punchline: String,
}

fn banner(title: &str) {
    println!("\n{} {} {}", "#".repeat(30), title, "#".repeat(30));
}

fn type_name_of<T>(_: &T) -> &'static str {
    std::any::type_name::<T>()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model = ChatModel::from_config(ModelConfig::from_env())?;

    // 1. Typed record with a default.
    banner("1. RecordParser");
    let chain = ParseChain::new(
        "person",
        PromptTemplate::new(
            "Please extract structured information about this person. Include their name, age, interests, and occupation if mentioned.\n\nText to analyze: {query}\n\n{format_instructions}\n\nRemember to:\n- Extract the name and age accurately\n- List any mentioned interests or hobbies\n- Include occupation if stated, otherwise mark as \"Unknown\"\n",
            ["query"],
        )?,
        RecordParser::<Person>::new(),
    );
    let query = "Hi there! I'm Jake, a 30-year-old data scientist based in New Jersey. \
I'm really passionate about Generative AI and machine learning. In my free time, \
I enjoy baseball and playing chess. I've been working in tech for about 5 years now.";
    let person = chain
        .invoke(&model.with_temperature(0.0), &PromptVars::new().insert("query", query))
        .await?;
    println!("{person:#?}");
    println!("{}", type_name_of(&person));

    // 2. Comma-separated list.
    banner("2. CommaSeparatedListParser");
    let chain = ParseChain::new(
        "list",
        PromptTemplate::new("Generate a list of {subject}.\n{format_instructions}", ["subject"])?,
        CommaSeparatedListParser::new(),
    );
    let creative = model.with_temperature(0.5);
    for subject in ["tropical fruits", "popular programming languages in 2024"] {
        let items = chain
            .invoke(&creative, &PromptVars::new().insert("subject", subject))
            .await?;
        println!("{items:#?}");
    }

    // 3. Keyed schema.
    banner("3. StructuredParser");
    let chain = ParseChain::new(
        "color-mood",
        PromptTemplate::new(
            "Analyze the following item and extract its color and the mood it evokes.\n\nItem: {item}\n\n{format_instructions}\n",
            ["item"],
        )?,
        StructuredParser::from_response_schemas(vec![
            ResponseSchema::new("color", "The primary color"),
            ResponseSchema::new("mood", "The mood it evokes"),
        ]),
    );
    let strict = model.with_temperature(0.0);
    for item in ["A vibrant sunset over the ocean", "Dark storm clouds gathering overhead"] {
        let analysis = chain
            .invoke(&strict, &PromptVars::new().insert("item", item))
            .await?;
        println!("{analysis:#?}");
    }

    // 4. Keyed schema with mixed advisory types.
    banner("4. StructuredParser, mixed types");
    let chain = ParseChain::new(
        "mixed",
        PromptTemplate::new(
            "Please analyze the following item and provide a structured review.\n\nItem to analyze: {item}\n\nProvide the following information:\n1. The item's name\n2. The year it was created\n3. Categories it belongs to\n4. A rating from 1-5 (can use decimals)\n5. A brief description (2-3 sentences)\n\n{format_instructions}\n\nBe specific and accurate with the details.",
            ["item"],
        )?,
        StructuredParser::from_response_schemas(vec![
            ResponseSchema::new("name", "The name of the item"),
            ResponseSchema::new("year", "The year of creation (integer)"),
            ResponseSchema::new("categories", "List of relevant categories"),
            ResponseSchema::new("rating", "Numerical rating from 1-5 (float)"),
            ResponseSchema::new("description", "Brief text description"),
        ]),
    );
    let item = "The iPhone 14 Pro is Apple's flagship smartphone released in late 2022. It features \
a 48MP camera, the A16 Bionic chip, and the innovative Dynamic Island. The phone \
comes with iOS 16 and is available in various colors including Deep Purple and Gold.";
    let review = chain
        .invoke(&model.with_temperature(0.2), &PromptVars::new().insert("item", item))
        .await?;
    println!("{review:#?}");

    // 5. Datetime.
    banner("5. DatetimeParser");
    let parser = DatetimeParser::new().with_reference(Local::now().naive_local());
    println!("{}", parser.format_instructions());
    let chain = ParseChain::new(
        "datetime",
        PromptTemplate::new(
            "Answer the users question:\n    Text: {text}\n\n    {format_instructions}\n    ",
            ["text"],
        )?,
        parser,
    );
    let founded = chain
        .invoke(&model.with_temperature(0.2), &PromptVars::new().insert("text", "When was Bitcoin founded?"))
        .await?;
    println!("{founded:#?}");

    // 6. Untyped JSON with an advisory schema.
    banner("6. JsonParser");
    let chain = ParseChain::new(
        "joke",
        PromptTemplate::new("Answer the user query.\n{format_instructions}\n{query}\n", ["query"])?,
        JsonParser::with_schema(Schema::for_type::<Joke>()),
    );
    let joke = chain
        .invoke(&strict, &PromptVars::new().insert("query", "Tell me a joke."))
        .await?;
    println!("{joke:#?}");

    Ok(())
}
