//! Small scraper helpers shared by the registry, detector, and executor.

use scraper::{ElementRef, Html, Selector};

use bulletin_types::CrawlError;

/// Parse a CSS selector, mapping the opaque parser error to a `CrawlError`.
pub fn parse_selector(raw: &str) -> Result<Selector, CrawlError> {
    Selector::parse(raw).map_err(|e| CrawlError::parse(format!("invalid selector {raw:?}: {e}")))
}

/// Parse a selector that may have been synthesized from page classes;
/// unparseable input is treated as matching nothing.
pub fn parse_selector_lenient(raw: &str) -> Option<Selector> {
    Selector::parse(raw).ok()
}

/// First match of `selector` under `scope`.
pub fn select_first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// First match of `selector` in the whole document.
pub fn select_first_in<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

/// Concatenated, whitespace-collapsed text of an element subtree.
pub fn element_text(element: ElementRef<'_>) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(joined.len());
    let mut last_was_space = true;
    for ch in joined.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Class attribute tokens of an element.
pub fn classes_of(element: ElementRef<'_>) -> Vec<String> {
    element.value().classes().map(str::to_string).collect()
}

/// Lowercased `class` plus `id` text, for indicator matching.
pub fn class_id_text(element: ElementRef<'_>) -> String {
    let mut text = element.value().classes().collect::<Vec<_>>().join(" ");
    if let Some(id) = element.value().id() {
        text.push(' ');
        text.push_str(id);
    }
    text.to_lowercase()
}

/// The parent of a node, as an element.
pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Whether a class or id token is safe to embed in a synthesized selector.
pub fn css_safe(token: &str) -> bool {
    !token.is_empty()
        && !token.starts_with(|c: char| c.is_ascii_digit() || c == '-')
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Selector naming an element: `#id` when available, else `tag.classes`,
/// else the bare tag.
pub fn container_prefix(element: ElementRef<'_>) -> String {
    if let Some(id) = element.value().id() {
        if css_safe(id) {
            return format!("#{id}");
        }
    }
    let tag = element.value().name();
    let classes: Vec<String> = classes_of(element)
        .into_iter()
        .filter(|c| css_safe(c))
        .collect();
    if classes.is_empty() {
        tag.to_string()
    } else {
        format!("{tag}.{}", classes.join("."))
    }
}

/// Resolve an href on the element itself or on its first descendant anchor.
pub fn find_href(element: ElementRef<'_>) -> Option<String> {
    if element.value().name() == "a" {
        return element.value().attr("href").map(str::to_string);
    }
    let anchor = parse_selector_lenient("a")?;
    element
        .select(&anchor)
        .find_map(|a| a.value().attr("href").map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_text_collapses_whitespace() {
        let html = Html::parse_fragment("<li>  모집\n  <span>안내</span>  </li>");
        let li = select_first_in_fragment(&html, "li");
        assert_eq!(element_text(li), "모집 안내");
    }

    #[test]
    fn find_href_checks_self_then_descendants() {
        let html = Html::parse_fragment(r#"<td><a href="/v/1">제목</a></td>"#);
        let td = select_first_in_fragment(&html, "td");
        assert_eq!(find_href(td).as_deref(), Some("/v/1"));

        let html = Html::parse_fragment(r#"<a href="/v/2">제목</a>"#);
        let a = select_first_in_fragment(&html, "a");
        assert_eq!(find_href(a).as_deref(), Some("/v/2"));
    }

    #[test]
    fn css_safe_rejects_awkward_tokens() {
        assert!(css_safe("board-list"));
        assert!(css_safe("notice_item"));
        assert!(!css_safe("md:flex"));
        assert!(!css_safe("3col"));
        assert!(!css_safe(""));
    }

    fn select_first_in_fragment<'a>(html: &'a Html, sel: &str) -> ElementRef<'a> {
        let selector = Selector::parse(sel).unwrap();
        html.select(&selector).next().unwrap()
    }
}
