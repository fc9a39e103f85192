//! Anchor lookup. Anchors are resolved fresh on every pass and never cached.

use crate::error::{RelocateError, Result};
use css_selectors::parse_selector_list;
use html::{DOM, NodeId};
use log::trace;

/// First element in document order matching `selector`.
///
/// # Errors
/// `SelectorSyntax` for malformed selectors, `TargetNotFound` when nothing matches.
pub fn resolve(dom: &DOM, selector: &str) -> Result<NodeId> {
    let list = parse_selector_list(selector).map_err(|source| RelocateError::SelectorSyntax {
        selector: selector.to_owned(),
        source,
    })?;
    let anchor = dom
        .query_selector(dom.root(), &list)
        .ok_or_else(|| RelocateError::TargetNotFound {
            selector: selector.to_owned(),
        })?;
    trace!("resolved `{selector}` to {anchor:?}");
    Ok(anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::parse_document;

    #[test]
    fn first_match_in_document_order_wins() {
        let dom = parse_document("<p class=\"x\" id=\"one\"></p><div><p class=\"x\" id=\"two\"></p></div>");
        let anchor = resolve(&dom, ".x").unwrap();
        assert_eq!(dom.attr(anchor, "id"), Some("one"));
    }

    #[test]
    fn malformed_selectors_are_syntax_errors() {
        let dom = parse_document("<p></p>");
        for selector in ["div[data-x", "div >", "p..x", "[data-x=]", "li:hover", ""] {
            let err = resolve(&dom, selector).unwrap_err();
            assert!(
                matches!(err, RelocateError::SelectorSyntax { selector: ref text, .. } if text == selector),
                "{selector:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn pseudo_classes_attribute_operators_and_escapes_resolve() {
        let dom = parse_document(
            "<ul><li id=\"one\" class=\"x\" data-k=\"abc\">a</li><li id=\"two\" class=\"y\">b</li></ul>",
        );
        for selector in [
            "li:first-child",
            "li:not(.y)",
            "[data-k^=ab]",
            "[data-k$=bc]",
            "[data-k*=b]",
            "[class~=x]",
            "li:nth-child(1)",
            "ul > li:nth-of-type(odd)",
            "#one\\:x, li",
        ] {
            let anchor = resolve(&dom, selector).unwrap();
            assert_eq!(dom.attr(anchor, "id"), Some("one"), "{selector}");
        }
        let last = resolve(&dom, "li:last-child").unwrap();
        assert_eq!(dom.attr(last, "id"), Some("two"));
    }

    #[test]
    fn valid_selectors_without_matches_are_not_found() {
        let dom = parse_document("<p></p>");
        assert_eq!(
            resolve(&dom, "#missing"),
            Err(RelocateError::TargetNotFound {
                selector: "#missing".to_owned()
            })
        );
    }
}
