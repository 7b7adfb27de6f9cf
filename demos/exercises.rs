//! Chains and inputs for the five parsing exercises, shared by the live and
//! offline demos.

use chrono::NaiveDateTime;
use llm_output_parsers::output_parser::Schema;
use llm_output_parsers::{
    CommaSeparatedListParser, DatetimeParser, JsonParser, ParseChain, PromptTemplate,
    RecordParser, ResponseSchema, StructuredParser,
};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
#[allow(dead_code)]
pub struct MovieReview {
    /// The title of the movie
    pub title: String,
    /// Rating out of 10
    pub rating: f64,
    /// Key points from the review
    pub main_points: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[allow(dead_code)]
pub struct ActionItem {
    /// The task to be completed
    pub task: String,
    /// Person assigned to the task
    pub assignee: String,
    /// Deadline for the task completion
    pub deadline: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[allow(dead_code)]
pub struct MeetingNotes {
    /// Meeting title
    pub title: String,
    /// Meeting date
    pub date: String,
    /// List of meeting attendees
    pub participants: Vec<String>,
    /// List of action items from the meeting
    pub action_items: Vec<ActionItem>,
    /// List of decisions made during the meeting
    pub decisions: Vec<String>,
}

pub const REVIEW_TEXT: &str = "I just watched \"The Matrix\" and it blew my mind! This sci-fi masterpiece \
deserves a solid 9.5/10. The special effects were groundbreaking, \
the philosophical themes were deep, and the action sequences were incredible. \
However, some scenes in the latter half felt a bit drawn out.";

pub const RECIPE_TEXT: &str = "To make a basic omelette, crack three eggs into a bowl and whisk them well. \
Heat butter in a non-stick pan over medium heat. Pour the eggs into the pan, \
let them set slightly, add your fillings to one half, then fold the other \
half over. Cook until golden brown on the bottom.";

pub const PRODUCT_REVIEW_TEXT: &str = "I've been using this wireless keyboard for about a month now. The battery life is excellent - \
I've only had to charge it once. The keys have a nice tactile feel and it pairs easily with \
multiple devices. However, it's a bit heavier than I expected and the lack of backlighting \
makes it difficult to use in low light conditions. Overall, it's a good keyboard but has room \
for improvement.";

pub const NOTES_TEXT: &str = "Project Falcon Weekly Sync - March 15, 2025

Attendees: Sarah Johnson, Mike Chen, Priya Patel, Alex Rodriguez

Discussion Points:
- Reviewed sprint progress, currently at 70% completion
- Database migration issues causing delays in the authentication module
- New design mockups received from UX team for mobile app

Action Items:
1. Mike to troubleshoot database migration issues by Wednesday
2. Priya to schedule a review meeting with UX team by Friday
3. Alex to update project documentation with new API endpoints by next Monday

Decisions:
- Approved one-week extension for Phase 2 deliverables
- Selected AWS Lambda for serverless implementation
- Postponed the analytics dashboard to Phase 3";

pub const DATE_TEXTS: [&str; 3] = [
    "Let's schedule our meeting for next Tuesday at 2pm.",
    "The product launch is set for June 15, 2025.",
    "The report is due on Vikas' desk by 8am Monday morning.",
];

pub fn banner(n: u32) {
    println!("\n {} Solution for Exercise {} {}", "#".repeat(50), n, "#".repeat(50));
}

pub fn movie_review() -> anyhow::Result<ParseChain<RecordParser<MovieReview>>> {
    Ok(ParseChain::new(
        "movie-review",
        PromptTemplate::new(
            "Extract structured information from this movie review:\n{review}\n{format_instructions}",
            ["review"],
        )?,
        RecordParser::new(),
    ))
}

pub fn recipe_steps() -> anyhow::Result<ParseChain<CommaSeparatedListParser>> {
    Ok(ParseChain::new(
        "recipe-steps",
        PromptTemplate::new(
            "Convert this recipe description into clear, separated steps:\n{recipe}\n{format_instructions}",
            ["recipe"],
        )?,
        CommaSeparatedListParser::new(),
    ))
}

pub fn product_sentiment() -> anyhow::Result<ParseChain<StructuredParser>> {
    Ok(ParseChain::new(
        "product-sentiment",
        PromptTemplate::new(
            "Analyze the sentiment of this product review:\n{review}\n{format_instructions}",
            ["review"],
        )?,
        StructuredParser::from_response_schemas(vec![
            ResponseSchema::new("overall_rating", "Overall product rating on a scale of 1-5"),
            ResponseSchema::new("pros", "Description of positive aspects of the product"),
            ResponseSchema::new("cons", "Description of negative aspects of the product"),
            ResponseSchema::new(
                "sentiment_score",
                "Sentiment score between -1 (negative) and 1 (positive)",
            ),
        ]),
    ))
}

pub fn meeting_notes() -> anyhow::Result<ParseChain<JsonParser>> {
    Ok(ParseChain::new(
        "meeting-notes",
        PromptTemplate::new(
            "Extract structured meeting information from these notes:\n{notes}\n{format_instructions}",
            ["notes"],
        )?,
        JsonParser::with_schema(Schema::for_type::<MeetingNotes>()),
    ))
}

pub fn date_extraction(reference: NaiveDateTime) -> anyhow::Result<ParseChain<DatetimeParser>> {
    Ok(ParseChain::new(
        "date-extraction",
        PromptTemplate::new(
            "Extract the time mentioned in this text:\n{text}\n{format_instructions}",
            ["text"],
        )?,
        DatetimeParser::new().with_reference(reference),
    ))
}

pub fn type_name_of<T>(_: &T) -> &'static str {
    std::any::type_name::<T>()
}
