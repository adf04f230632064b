//! Lexical checks on CSS fragments.
//!
//! Built on `cssparser`'s tokenizer. These are not full CSS validators:
//! they only catch the mistakes that would break the generated stylesheet
//! (stray braces, unterminated strings, empty selector list items, property
//! names that are not a single identifier).

use cssparser::{Parser, ParserInput, Token};

/// Checks that `property` is a single CSS identifier, e.g. `padding-left`,
/// `-webkit-box-flex` or `--accent`.
pub fn check_property(property: &str) -> Result<(), String> {
    let mut input = ParserInput::new(property.trim());
    let mut parser = Parser::new(&mut input);

    let valid = parser.expect_ident().is_ok() && parser.expect_exhausted().is_ok();
    if valid {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid CSS property name", property))
    }
}

/// Checks that `selector` is a usable selector list.
///
/// Each comma-separated item must be non-empty, and the text must not
/// contain anything that would end the rule early.
pub fn check_selector(selector: &str) -> Result<(), String> {
    if selector.trim().is_empty() {
        return Err("selector is empty".to_string());
    }

    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);
    let mut item_tokens = 0usize;

    while let Ok(token) = parser.next() {
        let problem = match token {
            Token::Comma => {
                if item_tokens == 0 {
                    Some("empty item in selector list".to_string())
                } else {
                    item_tokens = 0;
                    None
                }
            }
            Token::CurlyBracketBlock
            | Token::CloseCurlyBracket
            | Token::CloseParenthesis
            | Token::CloseSquareBracket
            | Token::Semicolon => Some(format!("unexpected {:?}", token)),
            Token::BadString(_) | Token::BadUrl(_) => Some("unterminated string".to_string()),
            _ => {
                item_tokens += 1;
                None
            }
        };
        if let Some(problem) = problem {
            return Err(format!("invalid selector '{}': {}", selector, problem));
        }
    }

    if item_tokens == 0 {
        return Err(format!("invalid selector '{}': trailing comma", selector));
    }
    Ok(())
}

/// True when `text` is exactly one CSS number token (`42`, `-1`, `0.7`, `1e3`).
pub fn is_number(text: &str) -> bool {
    let mut input = ParserInput::new(text.trim());
    let mut parser = Parser::new(&mut input);

    let numeric = matches!(parser.next(), Ok(Token::Number { .. }));
    numeric && parser.expect_exhausted().is_ok()
}
