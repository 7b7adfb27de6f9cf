//! Comma-separated list extraction from LLM responses.
//!
//! Items are split on `,` and trimmed. An item wrapped in double quotes may
//! contain commas, with `""` standing for a literal quote, the same quoting
//! CSV uses. Anything else that makes the delimiting ambiguous is an error.

use tracing::debug;

use crate::output_parser::error::{truncate, ParseError};
use crate::output_parser::extract::preprocess;
use crate::output_parser::OutputParser;

const LIST_INSTRUCTIONS: &str =
    "Your response should be a list of comma separated values, eg: `foo, bar, baz` or `foo,bar,baz`";

/// Separators models commonly use instead of a comma.
const FOREIGN_SEPARATORS: [char; 3] = [';', '|', '\t'];

/// Parses `a, b, c` into `["a", "b", "c"]`.
///
/// Fails with [`ParseError::MalformedList`] on an unterminated quote, text
/// after a closing quote, an empty item (`a,,b` or a trailing comma), a line
/// break inside an unquoted item, or a single item containing `;`, `|` or a
/// tab (the wrong delimiter was used).
///
/// # Examples
///
/// ```
/// use llm_output_parsers::output_parser::{CommaSeparatedListParser, OutputParser};
///
/// let parser = CommaSeparatedListParser::new();
/// let items = parser.parse(r#"mango, "salt, pepper", papaya"#).unwrap();
/// assert_eq!(items, vec!["mango", "salt, pepper", "papaya"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CommaSeparatedListParser;

impl CommaSeparatedListParser {
    pub fn new() -> Self {
        Self
    }
}

impl OutputParser for CommaSeparatedListParser {
    type Output = Vec<String>;

    fn format_instructions(&self) -> String {
        LIST_INSTRUCTIONS.to_string()
    }

    fn parse(&self, text: &str) -> Result<Vec<String>, ParseError> {
        let cleaned = preprocess(text)?;
        let malformed = |reason: String| ParseError::MalformedList {
            reason,
            text: truncate(&cleaned, 200),
        };

        let items = split_items(&cleaned).map_err(malformed)?;

        if let [only] = items.as_slice() {
            if !cleaned.starts_with('"') {
                if let Some(sep) = only.chars().find(|c| FOREIGN_SEPARATORS.contains(c)) {
                    return Err(malformed(format!("found {sep:?} where ',' was expected")));
                }
            }
        }

        debug!(parser = self.kind(), items = items.len(), "list parsed");
        Ok(items)
    }

    fn kind(&self) -> &'static str {
        "comma-list"
    }
}

/// Split on unquoted commas. The error is a human-readable reason.
fn split_items(text: &str) -> Result<Vec<String>, String> {
    let mut items = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let item = if chars.peek() == Some(&'"') {
            chars.next();
            let mut buf = String::new();
            loop {
                match chars.next() {
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        buf.push('"');
                    }
                    Some('"') => break,
                    Some(c) => buf.push(c),
                    None => return Err("unterminated quoted item".into()),
                }
            }
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            if let Some(&c) = chars.peek() {
                if c != ',' {
                    return Err(format!("unexpected {c:?} after quoted item"));
                }
            }
            buf
        } else {
            let mut buf = String::new();
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                buf.push(c);
                chars.next();
            }
            let trimmed = buf.trim();
            if trimmed.contains('\n') {
                return Err("line break inside an unquoted item".into());
            }
            trimmed.to_string()
        };

        if item.is_empty() {
            return Err(format!("item {} is empty", items.len() + 1));
        }
        items.push(item);

        // Only ',' or end of input can follow an item here.
        if chars.next().is_none() {
            break;
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Vec<String>, ParseError> {
        CommaSeparatedListParser::new().parse(text)
    }

    #[test]
    fn omelette_steps_in_order() {
        let items = parse("crack eggs, whisk eggs, heat pan, pour eggs, fold omelette").unwrap();
        assert_eq!(
            items,
            vec!["crack eggs", "whisk eggs", "heat pan", "pour eggs", "fold omelette"]
        );
    }

    #[test]
    fn no_spaces_after_commas() {
        assert_eq!(parse("foo,bar,baz").unwrap(), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn single_item() {
        assert_eq!(parse("mango").unwrap(), vec!["mango"]);
    }

    #[test]
    fn think_block_stripped() {
        let items = parse("<think>fruits...</think>mango, papaya").unwrap();
        assert_eq!(items, vec!["mango", "papaya"]);
    }

    #[test]
    fn quoted_items_keep_commas_and_quotes() {
        let items = parse(r#""Heat butter, medium heat", "say ""done""", serve"#).unwrap();
        assert_eq!(items, vec!["Heat butter, medium heat", "say \"done\"", "serve"]);
    }

    #[test]
    fn empty_response() {
        assert_eq!(parse("  ").unwrap_err(), ParseError::EmptyResponse);
    }

    #[test]
    fn semicolons_are_wrong_delimiter() {
        let err = parse("crack eggs; whisk eggs; heat pan").unwrap_err();
        assert!(matches!(err, ParseError::MalformedList { ref reason, .. } if reason.contains("';'")));
    }

    #[test]
    fn pipes_are_wrong_delimiter() {
        assert!(matches!(
            parse("a | b | c"),
            Err(ParseError::MalformedList { .. })
        ));
    }

    #[test]
    fn newline_list_rejected() {
        assert!(matches!(
            parse("1. crack eggs\n2. whisk eggs"),
            Err(ParseError::MalformedList { .. })
        ));
    }

    #[test]
    fn empty_item_rejected() {
        assert!(matches!(parse("a,,b"), Err(ParseError::MalformedList { .. })));
        assert!(matches!(parse("a, b,"), Err(ParseError::MalformedList { .. })));
    }

    #[test]
    fn unterminated_quote_rejected() {
        assert!(matches!(
            parse(r#"a, "b, c"#),
            Err(ParseError::MalformedList { ref reason, .. }) if reason == "unterminated quoted item"
        ));
    }

    #[test]
    fn junk_after_quote_rejected() {
        assert!(matches!(
            parse(r#""a"b, c"#),
            Err(ParseError::MalformedList { .. })
        ));
    }

    #[test]
    fn instructions_are_fixed() {
        let parser = CommaSeparatedListParser::new();
        assert_eq!(parser.format_instructions(), parser.format_instructions());
        assert!(parser.format_instructions().contains("`foo, bar, baz`"));
    }
}
