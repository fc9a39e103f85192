//! Matching a parsed [`SelectorList`] against one element.

use crate::{SelectorImpl, SelectorList};
use selectors::matching::{
    IgnoreNthChildForInvalidation, MatchingContext, MatchingMode, NeedsSelectorFlags, QuirksMode,
    matches_selector,
};
use selectors::{Element, NthIndexCache};

/// True when any selector in `list` matches `element`.
pub fn matches_selector_list<E>(list: &SelectorList, element: &E) -> bool
where
    E: Element<Impl = SelectorImpl>,
{
    let mut nth_index_cache = NthIndexCache::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut nth_index_cache,
        QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        IgnoreNthChildForInvalidation::No,
    );

    list.parsed
        .0
        .iter()
        .any(|selector| matches_selector(selector, 0, None, element, &mut context))
}
