//! Prompt templates with `{name}` placeholders.
//!
//! Templates are tokenized once at construction, so a malformed template is
//! rejected up front and substituted values are never re-scanned: a value
//! containing `{name}` is inserted literally.

use std::collections::BTreeMap;

use crate::types::PromptVars;

/// Errors from template construction or formatting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("no value supplied for template variable '{name}'")]
    MissingVariable { name: String },

    #[error("malformed template at byte {position}: {reason}")]
    Malformed { position: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A prompt with named placeholders and optional pre-bound values.
///
/// # Example
///
/// ```
/// use llm_output_parsers::{PromptTemplate, PromptVars};
///
/// let template = PromptTemplate::from_template(
///     "Tell me about {topic}.\n{format_instructions}\nJSON looks like {{\"a\": 1}}",
/// )
/// .unwrap()
/// .with_partial("format_instructions", "Answer in one line.");
///
/// let prompt = template.format(&PromptVars::new().insert("topic", "owls")).unwrap();
/// assert_eq!(prompt, "Tell me about owls.\nAnswer in one line.\nJSON looks like {\"a\": 1}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    segments: Vec<Segment>,
    input_variables: Vec<String>,
    partials: BTreeMap<String, String>,
}

impl PromptTemplate {
    /// Build a template with an explicit list of caller-supplied variables.
    pub fn new<I, S>(template: impl Into<String>, input_variables: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let template = template.into();
        let segments = tokenize(&template)?;
        Ok(Self {
            template,
            segments,
            input_variables: input_variables.into_iter().map(Into::into).collect(),
            partials: BTreeMap::new(),
        })
    }

    /// Build a template whose input variables are its placeholders.
    pub fn from_template(template: impl Into<String>) -> Result<Self, TemplateError> {
        let template = template.into();
        let segments = tokenize(&template)?;
        let mut this = Self {
            template,
            segments,
            input_variables: Vec::new(),
            partials: BTreeMap::new(),
        };
        this.input_variables = this.placeholders().into_iter().map(String::from).collect();
        Ok(this)
    }

    /// Bind `name` ahead of time. An invocation value of the same name wins.
    pub fn with_partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.input_variables.retain(|v| *v != name);
        self.partials.insert(name, value.into());
        self
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !seen.contains(&name.as_str()) {
                    seen.push(name);
                }
            }
        }
        seen
    }

    /// Variables the caller is expected to supply (partials excluded).
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    pub fn partial(&self, name: &str) -> Option<&str> {
        self.partials.get(name).map(String::as_str)
    }

    /// The template source as written.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitute every placeholder.
    pub fn format(&self, vars: &PromptVars) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = vars
                        .get(name)
                        .or_else(|| self.partial(name))
                        .ok_or_else(|| TemplateError::MissingVariable { name: name.clone() })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn tokenize(template: &str) -> Result<Vec<Segment>, TemplateError> {
    let malformed = |position: usize, reason: &str| TemplateError::Malformed {
        position,
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err(malformed(pos, "unmatched '}'")),
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, ch)) => name.push(ch),
                        None => return Err(malformed(pos, "unclosed '{'")),
                    }
                }
                if name.is_empty() {
                    return Err(malformed(pos, "empty placeholder"));
                }
                if !is_identifier(&name) {
                    return Err(malformed(pos, &format!("invalid placeholder name '{name}'")));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_basic() {
        let t = PromptTemplate::from_template("Hello {name}, process {input}").unwrap();
        let vars = PromptVars::new().insert("name", "Alice").insert("input", "data");
        assert_eq!(t.format(&vars).unwrap(), "Hello Alice, process data");
    }

    #[test]
    fn test_no_placeholders() {
        let t = PromptTemplate::from_template("static prompt").unwrap();
        assert!(t.placeholders().is_empty());
        assert_eq!(t.format(&PromptVars::new()).unwrap(), "static prompt");
    }

    #[test]
    fn test_escaped_braces() {
        let t = PromptTemplate::from_template("Output format: {{\"result\": {{\"value\": 42}}}}")
            .unwrap();
        assert_eq!(
            t.format(&PromptVars::new()).unwrap(),
            r#"Output format: {"result": {"value": 42}}"#
        );
    }

    #[test]
    fn test_placeholders_in_first_appearance_order() {
        let t = PromptTemplate::from_template("{b} {a} {b} {c}").unwrap();
        assert_eq!(t.placeholders(), vec!["b", "a", "c"]);
        assert_eq!(t.input_variables(), ["b", "a", "c"]);
    }

    #[test]
    fn test_missing_variable() {
        let t = PromptTemplate::from_template("Steps for {dish}").unwrap();
        assert_eq!(
            t.format(&PromptVars::new()).unwrap_err(),
            TemplateError::MissingVariable { name: "dish".into() }
        );
    }

    #[test]
    fn test_partial_and_override() {
        let t = PromptTemplate::from_template("{greeting}, {name}")
            .unwrap()
            .with_partial("greeting", "Hi");
        assert_eq!(t.input_variables(), ["name"]);
        assert_eq!(
            t.format(&PromptVars::new().insert("name", "Bo")).unwrap(),
            "Hi, Bo"
        );
        let vars = PromptVars::new().insert("name", "Bo").insert("greeting", "Yo");
        assert_eq!(t.format(&vars).unwrap(), "Yo, Bo");
    }

    #[test]
    fn test_values_not_rescanned() {
        let t = PromptTemplate::from_template("Review: {review}").unwrap();
        let vars = PromptVars::new().insert("review", "uses {braces} and }} too");
        assert_eq!(t.format(&vars).unwrap(), "Review: uses {braces} and }} too");
    }

    #[test]
    fn test_explicit_input_variables() {
        let t = PromptTemplate::new("Describe {color}", ["color"]).unwrap();
        assert_eq!(t.input_variables(), ["color"]);
        assert_eq!(t.template(), "Describe {color}");
    }

    #[test]
    fn test_malformed_templates() {
        assert_eq!(
            PromptTemplate::from_template("Hello {name").unwrap_err(),
            TemplateError::Malformed { position: 6, reason: "unclosed '{'".into() }
        );
        assert!(matches!(
            PromptTemplate::from_template("a } b"),
            Err(TemplateError::Malformed { position: 2, .. })
        ));
        assert!(matches!(
            PromptTemplate::from_template("empty {} here"),
            Err(TemplateError::Malformed { ref reason, .. }) if reason == "empty placeholder"
        ));
        assert!(matches!(
            PromptTemplate::from_template("{not a name}"),
            Err(TemplateError::Malformed { .. })
        ));
    }

    #[test]
    fn test_multibyte_literal_preserved() {
        let t = PromptTemplate::from_template("café {x} ☕").unwrap();
        assert_eq!(t.format(&PromptVars::new().insert("x", "au lait")).unwrap(), "café au lait ☕");
    }
}
