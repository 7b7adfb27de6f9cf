//! The five parsing exercises against canned completions; no network needed.
//!
//! Run with: `cargo run --example mock_exercises`

#[path = "exercises.rs"]
mod exercises;

use std::sync::Arc;

use chrono::NaiveDate;
use llm_output_parsers::{ChatModel, MockBackend, ModelConfig, PromptVars};
use tracing_subscriber::EnvFilter;

use exercises::*;

fn mock_model(responses: &[&str]) -> anyhow::Result<ChatModel> {
    let backend = MockBackend::new(responses.iter().map(|s| s.to_string()).collect());
    Ok(ChatModel::builder(ModelConfig::default())
        .backend(Arc::new(backend))
        .build()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model = mock_model(&[
        "```json\n{\"title\": \"The Matrix\", \"rating\": 9.5, \"main_points\": [\"groundbreaking special effects\", \"deep philosophical themes\", \"latter half drawn out\"]}\n```",
    ])?;
    let review = movie_review()?
        .invoke(&model, &PromptVars::new().insert("review", REVIEW_TEXT))
        .await?;
    banner(1);
    println!("{review:#?}");

    let model = mock_model(&["crack eggs, whisk eggs, heat pan, pour eggs, fold omelette"])?;
    let steps = recipe_steps()?
        .invoke(&model, &PromptVars::new().insert("recipe", RECIPE_TEXT))
        .await?;
    banner(2);
    println!("{steps:#?}");

    let model = mock_model(&[
        "```json\n{\"overall_rating\": \"4\", \"pros\": \"Excellent battery life, tactile keys, easy multi-device pairing\", \"cons\": \"Heavier than expected, no backlighting\", \"sentiment_score\": \"0.6\"}\n```",
    ])?;
    let sentiment = product_sentiment()?
        .invoke(&model, &PromptVars::new().insert("review", PRODUCT_REVIEW_TEXT))
        .await?;
    banner(3);
    println!("{sentiment:#?}");

    let model = mock_model(&[
        r#"{"title": "Project Falcon Weekly Sync", "date": "March 15, 2025", "participants": ["Sarah Johnson", "Mike Chen", "Priya Patel", "Alex Rodriguez"], "action_items": [{"task": "Troubleshoot database migration issues", "assignee": "Mike Chen", "deadline": "Wednesday"}, {"task": "Schedule a review meeting with UX team", "assignee": "Priya Patel", "deadline": "Friday"}, {"task": "Update project documentation with new API endpoints", "assignee": "Alex Rodriguez", "deadline": "next Monday"}], "decisions": ["Approved one-week extension for Phase 2 deliverables", "Selected AWS Lambda for serverless implementation", "Postponed the analytics dashboard to Phase 3"]}"#,
    ])?;
    let notes = meeting_notes()?
        .invoke(&model, &PromptVars::new().insert("notes", NOTES_TEXT))
        .await?;
    banner(4);
    println!("{notes:#?}");

    banner(5);
    // Wednesday, 12 March 2025.
    let reference = NaiveDate::from_ymd_opt(2025, 3, 12)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("invalid reference date"))?;
    let model = mock_model(&[
        "next Tuesday at 2pm",
        "2025-06-15T00:00:00.000000Z",
        "by Vikas' desk by 8am Monday morning",
    ])?;
    let chain = date_extraction(reference)?;
    for text in DATE_TEXTS {
        println!("Text: {text}");
        match chain.invoke(&model, &PromptVars::new().insert("text", text)).await {
            Ok(date) => {
                println!("Extracted date: {date}");
                println!("Date type: {}", type_name_of(&date));
            }
            Err(err) => println!("Extraction failed: {err}"),
        }
        println!("---");
    }

    Ok(())
}
