//! Selector-set execution: turn a parsed document plus a selector quadruple
//! into raw notice rows.

use scraper::{ElementRef, Html};
use tracing::{debug, trace};

use bulletin_types::{CrawlError, Notice, SelectorSet};
use bulletin_utils::{clean_text, normalize_url, parse_date};

use crate::dom::{find_href, parse_selector, select_first, select_first_in};

/// Run a selector set against a document.
///
/// Rows come back in DOM order. A row is kept only when its title resolves
/// to non-empty normalized text; length bounds, deduplication, and the
/// output cap are the engine's job. Dates that fail to parse and hrefs that
/// fail to absolutize degrade to `None` rather than dropping the row.
pub fn execute_selector_set(
    document: &Html,
    set: &SelectorSet,
    base_url: &str,
) -> Result<Vec<Notice>, CrawlError> {
    let item_selector = parse_selector(&set.item)?;
    let title_selector = parse_selector(&set.title)?;
    let date_selector = parse_selector(&set.date)?;
    let link_selector = parse_selector(&set.link)?;

    let mut notices = Vec::new();

    let mut emit = |item: ElementRef<'_>| {
        let Some(title_element) = select_first(item, &title_selector) else {
            trace!(item = %set.item, "row without title element dropped");
            return;
        };
        let title = clean_text(&title_element.text().collect::<Vec<_>>().join(" "));
        if title.is_empty() {
            trace!(item = %set.item, "row with empty title dropped");
            return;
        }

        let date = select_first(item, &date_selector)
            .map(|e| e.text().collect::<Vec<_>>().join(" "))
            .and_then(|text| parse_date(&text));

        // Prefer the href carried by the title's own anchor; fall back to the
        // configured link selector.
        let link = find_href(title_element)
            .or_else(|| select_first(item, &link_selector).and_then(find_href))
            .and_then(|href| normalize_url(&href, base_url));

        notices.push(Notice::new(title, date, link));
    };

    match &set.container {
        Some(container) => {
            let container_selector = parse_selector(container)?;
            let Some(scope) = select_first_in(document, &container_selector) else {
                debug!(container = %container, "container not found");
                return Ok(Vec::new());
            };
            for item in scope.select(&item_selector) {
                emit(item);
            }
        }
        None => {
            for item in document.select(&item_selector) {
                emit(item);
            }
        }
    }

    Ok(notices)
}
