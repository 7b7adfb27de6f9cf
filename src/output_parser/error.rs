//! Error types for LLM output parsers.

/// Errors returned by output parsers.
///
/// Parsing is all-or-nothing: every variant means no value was produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// The LLM response was empty or whitespace-only.
    #[error("empty LLM response")]
    EmptyResponse,

    /// No parsing strategy could extract the expected format.
    #[error("could not parse {expected_format} from LLM response: {text}")]
    Unparseable {
        /// The format the parser was trying to extract.
        expected_format: &'static str,
        /// A truncated copy of the cleaned LLM text (max 200 chars).
        text: String,
    },

    /// JSON was extracted and validated but failed to deserialize into the target type.
    #[error("JSON deserialization failed: {reason}")]
    DeserializationFailed {
        /// The serde error message.
        reason: String,
        /// The raw JSON string that failed deserialization (truncated).
        raw_json: String,
    },

    /// A required field declared in the schema is absent.
    #[error("missing required field `{field}`")]
    MissingField {
        /// Path of the missing field, e.g. `action_items[1].assignee`.
        field: String,
    },

    /// The response contains a field the schema does not declare.
    #[error("unexpected field `{field}` not declared in schema")]
    UnknownField {
        /// Path of the undeclared field.
        field: String,
    },

    /// A field is present but holds the wrong JSON type.
    #[error("field `{field}` should be {expected}, found {found}")]
    WrongType {
        /// Path of the offending field.
        field: String,
        /// Expected JSON type (e.g. `"number"`, `"string or null"`).
        expected: String,
        /// JSON type that was actually found.
        found: &'static str,
    },

    /// A field breaks a schema constraint other than presence or type
    /// (a `minimum`, an `enum`, a `oneOf` branch).
    #[error("field `{field}` violates the schema: {reason}")]
    SchemaViolation {
        /// Path of the offending field.
        field: String,
        /// The validator's message.
        reason: String,
    },

    /// The schema document itself is not valid JSON Schema.
    #[error("schema `{schema}` is not valid JSON Schema: {reason}")]
    InvalidSchema {
        /// Name of the schema.
        schema: String,
        /// Why it failed to compile.
        reason: String,
    },

    /// The text is not a well-formed comma-separated list.
    #[error("malformed comma-separated list ({reason}): {text}")]
    MalformedList {
        /// What was wrong with the delimiting.
        reason: String,
        /// A truncated copy of the cleaned text.
        text: String,
    },

    /// The text is not a recognizable date/time expression.
    #[error("could not parse datetime from {text:?}: {reason}")]
    InvalidDatetime {
        /// A truncated copy of the cleaned text.
        text: String,
        /// Why no timestamp could be resolved.
        reason: String,
    },
}

/// Truncate a string to at most `max_len` characters, appending "..." if truncated.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}...", &s[..idx]),
    }
}

/// JSON type name used in [`ParseError::WrongType`] messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
