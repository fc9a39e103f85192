//! Selector text to [`SelectorList`].

use crate::{NonTSPseudoClass, PseudoElement, SelectorError, SelectorImpl, SelectorList};
use cssparser::{CowRcStr, ParseError, Parser as CssParser, ParserInput, SourceLocation};
use log::trace;
use selectors::parser::{
    ParseRelative, Parser, SelectorList as ParsedList, SelectorParseErrorKind,
};

/// Parser hooks for the `selectors` crate.
pub struct SelectorParser;

impl<'input> Parser<'input> for SelectorParser {
    type Impl = SelectorImpl;
    type Error = SelectorParseErrorKind<'input>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'input>,
    ) -> Result<NonTSPseudoClass, ParseError<'input, SelectorParseErrorKind<'input>>> {
        Err(location.new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name)))
    }

    fn parse_pseudo_element(
        &self,
        location: SourceLocation,
        name: CowRcStr<'input>,
    ) -> Result<PseudoElement, ParseError<'input, SelectorParseErrorKind<'input>>> {
        Err(location.new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name)))
    }
}

/// Parse a comma-separated selector group.
///
/// # Errors
/// [`SelectorError::Empty`] for blank input, [`SelectorError::Unclosed`] when a
/// bracket, parenthesis or string is still open at the end, and
/// [`SelectorError::Invalid`] for anything else the CSS selector grammar rejects.
pub fn parse_selector_list(selector: &str) -> Result<SelectorList, SelectorError> {
    if selector.trim().is_empty() {
        return Err(SelectorError::Empty);
    }
    if let Some((opener, offset)) = unclosed_delimiter(selector) {
        return Err(SelectorError::Unclosed { opener, offset });
    }
    let mut input = ParserInput::new(selector);
    let mut parser = CssParser::new(&mut input);
    let parsed = ParsedList::parse(&SelectorParser, &mut parser, ParseRelative::No)
        .map_err(|error| invalid(&error))?;
    trace!("parsed `{selector}` into {} selector(s)", parsed.0.len());
    Ok(SelectorList {
        text: selector.to_owned(),
        parsed,
    })
}

/// CSS error recovery silently closes brackets, parentheses and strings left
/// open at end of input. Those selectors are rejected here instead.
/// Returns the innermost unclosed opener and its byte offset.
fn unclosed_delimiter(selector: &str) -> Option<(char, usize)> {
    let mut open = Vec::new();
    let mut quote = None::<(char, usize)>;
    let mut chars = selector.char_indices().peekable();
    while let Some((offset, current)) = chars.next() {
        if current == '\\' {
            chars.next();
            continue;
        }
        if let Some((delimiter, _)) = quote {
            if current == delimiter {
                quote = None;
            }
            continue;
        }
        match current {
            '"' | '\'' => quote = Some((current, offset)),
            '[' | '(' => open.push((current, offset)),
            ']' | ')' => {
                let expected = if current == ']' { '[' } else { '(' };
                if open.last().is_some_and(|&(opener, _)| opener == expected) {
                    open.pop();
                }
            }
            '/' if chars.peek().is_some_and(|&(_, next)| next == '*') => {
                chars.next();
                let mut previous = ' ';
                for (_, inner) in chars.by_ref() {
                    if previous == '*' && inner == '/' {
                        break;
                    }
                    previous = inner;
                }
            }
            _ => {}
        }
    }
    quote.or_else(|| open.last().copied())
}

fn invalid(error: &ParseError<'_, SelectorParseErrorKind<'_>>) -> SelectorError {
    SelectorError::Invalid {
        reason: format!("{:?}", error.kind),
        line: error.location.line.saturating_add(1),
        column: error.location.column,
    }
}
