//! Shared extraction steps for LLM output parsing.
//!
//! Every parser calls [`preprocess`] first. The JSON-shaped parsers
//! (record, keyed schema, untyped JSON) then go through [`extract_json`],
//! which unwraps markdown fences and surrounding prose but never repairs
//! malformed JSON.

use serde_json::Value;

use crate::output_parser::error::{truncate, ParseError};

/// Reasoning-block tag pairs removed before parsing.
const THINK_TAGS: [(&str, &str); 2] = [("<think>", "</think>"), ("<thinking>", "</thinking>")];

/// Strip reasoning blocks and surrounding whitespace.
///
/// Returns [`ParseError::EmptyResponse`] when nothing is left.
pub fn preprocess(text: &str) -> Result<String, ParseError> {
    let cleaned = strip_think_tags(text);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ParseError::EmptyResponse);
    }
    Ok(cleaned.to_string())
}

/// Strip all `<think>...</think>` and `<thinking>...</thinking>` blocks from text.
///
/// An unterminated block swallows the rest of the text.
///
/// # Examples
///
/// ```
/// use llm_output_parsers::output_parser::strip_think_tags;
///
/// assert_eq!(strip_think_tags("<think>reasoning</think>result"), "result");
/// assert_eq!(strip_think_tags("<think>no closing tag"), "");
/// ```
pub fn strip_think_tags(text: &str) -> String {
    let mut result = text.to_string();
    for (open, close) in THINK_TAGS {
        while let Some(start) = result.find(open) {
            match result[start..].find(close) {
                Some(offset) => {
                    let end = start + offset + close.len();
                    result.replace_range(start..end, "");
                }
                None => {
                    result.truncate(start);
                    break;
                }
            }
        }
    }
    result
}

/// Extract the body of the first fenced markdown code block.
///
/// Returns `(language_hint, content)`; the hint is `None` for a bare fence.
///
/// # Examples
///
/// ```
/// use llm_output_parsers::output_parser::extract::extract_code_block;
///
/// let (lang, body) = extract_code_block("Here:\n```json\n{\"a\": 1}\n```").unwrap();
/// assert_eq!(lang, Some("json"));
/// assert_eq!(body, "{\"a\": 1}");
/// ```
pub fn extract_code_block(text: &str) -> Option<(Option<&str>, &str)> {
    let fence = text.find("```")?;
    let after = fence + 3;
    let line_end = after + text[after..].find('\n')?;
    let hint = text[after..line_end].trim();
    let body_start = line_end + 1;
    let close = text[body_start..].find("```")?;
    let body = text[body_start..body_start + close].trim();
    Some(((!hint.is_empty()).then_some(hint), body))
}

/// Find the last top-level region delimited by `open`/`close`.
///
/// Nesting-aware and skips delimiters inside JSON strings. Later regions win
/// because models tend to put the answer after any preamble.
///
/// # Examples
///
/// ```
/// use llm_output_parsers::output_parser::extract::find_bracketed;
///
/// let input = r#"Result: {"a": [1, 2]}"#;
/// assert_eq!(find_bracketed(input, '{', '}'), Some(r#"{"a": [1, 2]}"#));
/// ```
pub fn find_bracketed(text: &str, open: char, close: char) -> Option<&str> {
    let mut best = None;
    let mut scan_from = 0;

    while let Some(offset) = text[scan_from..].find(open) {
        let start = scan_from + offset;
        scan_from = match region_end(&text[start..], open, close) {
            Some(len) => {
                best = Some(&text[start..start + len]);
                start + len
            }
            // An opener that never closes is prose; try the next one.
            None => start + open.len_utf8(),
        };
    }

    best
}

/// Byte length of the balanced region at the start of `text`, which must
/// begin with `open`.
fn region_end(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i + ch.len_utf8());
            }
        }
    }
    None
}

/// Pull a JSON value out of an LLM completion.
///
/// Strategies (in order):
/// 1. The whole cleaned text
/// 2. The body of a fenced code block
/// 3. The last balanced `{...}` region
/// 4. The last balanced `[...]` region
///
/// Candidates that are not valid JSON fail; nothing is repaired.
pub fn extract_json(text: &str) -> Result<Value, ParseError> {
    let cleaned = preprocess(text)?;

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(value);
    }

    if let Some((_, body)) = extract_code_block(&cleaned) {
        return serde_json::from_str(body).map_err(|_| ParseError::Unparseable {
            expected_format: "JSON",
            text: truncate(body, 200),
        });
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let Some(region) = find_bracketed(&cleaned, open, close) {
            if let Ok(value) = serde_json::from_str::<Value>(region) {
                return Ok(value);
            }
        }
    }

    Err(ParseError::Unparseable {
        expected_format: "JSON",
        text: truncate(&cleaned, 200),
    })
}
