use scraper::{ElementRef, Selector};

use crate::text_manipulators::extract_text;

const COMMITTEES_LABEL: &str = "Committee(s):";

// The profile page stacks at most three committee spans under the label.
const MAX_COMMITTEES: usize = 3;

const SEPARATOR: &str = "; ";

fn next_span_sibling(element: ElementRef) -> Option<ElementRef> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "span")
}

/// Collects the committee names that follow the `Committee(s):` label among
/// the given medium-weight label spans, joined with `"; "`.
///
/// Expected layout:
///
/// ```html
/// <span class="font_weight_m">Committee(s):</span>
/// <span class="text_right">
///     <br><span>Finance</span>
///     <br><span>Taxation</span>
/// </span>
/// ```
pub fn scrape_committees<'a>(spans_medium: impl IntoIterator<Item = ElementRef<'a>>) -> String {
    let Some(label) = spans_medium
        .into_iter()
        .find(|span| extract_text(*span) == COMMITTEES_LABEL)
    else {
        return String::new();
    };

    let span_selector = Selector::parse("span").unwrap();
    let Some(first) = next_span_sibling(label).and_then(|answer| answer.select(&span_selector).next())
    else {
        return String::new();
    };

    std::iter::successors(Some(first), |committee| next_span_sibling(*committee))
        .take(MAX_COMMITTEES)
        .map(|committee| extract_text(committee).trim().to_string())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
