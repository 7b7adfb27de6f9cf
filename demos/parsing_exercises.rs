//! The five parsing exercises, solved, against a live model.
//!
//! Run with: `cargo run --example parsing_exercises`
//! Needs `OPENAI_API_KEY` (environment or `.env`).

#[path = "exercises.rs"]
mod exercises;

use chrono::Local;
use llm_output_parsers::{ChatModel, ModelConfig, PromptVars};
use tracing_subscriber::EnvFilter;

use exercises::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model = ChatModel::from_config(ModelConfig::from_env())?.with_temperature(0.0);

    let review = movie_review()?
        .invoke(&model, &PromptVars::new().insert("review", REVIEW_TEXT))
        .await?;
    banner(1);
    println!("{review:#?}");

    let steps = recipe_steps()?
        .invoke(&model, &PromptVars::new().insert("recipe", RECIPE_TEXT))
        .await?;
    banner(2);
    println!("{steps:#?}");

    let sentiment = product_sentiment()?
        .invoke(&model, &PromptVars::new().insert("review", PRODUCT_REVIEW_TEXT))
        .await?;
    banner(3);
    println!("{sentiment:#?}");

    let notes = meeting_notes()?
        .invoke(&model, &PromptVars::new().insert("notes", NOTES_TEXT))
        .await?;
    banner(4);
    println!("{notes:#?}");

    banner(5);
    let chain = date_extraction(Local::now().naive_local())?;
    for text in DATE_TEXTS {
        let date = chain
            .invoke(&model, &PromptVars::new().insert("text", text))
            .await?;
        println!("Text: {text}");
        println!("Extracted date: {date}");
        println!("Date type: {}", type_name_of(&date));
        println!("---");
    }

    Ok(())
}
