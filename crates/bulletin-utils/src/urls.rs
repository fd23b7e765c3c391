//! URL validation and absolutization.

use url::Url;

/// Whether the string is an absolute http(s) URL.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
        }
        Err(_) => false,
    }
}

/// Resolve a possibly-relative href against the page URL.
///
/// Absolute http(s) inputs pass through untouched; anything else is joined
/// against `base`. Unresolvable inputs yield `None` rather than a mangled
/// link.
pub fn normalize_url(href: &str, base: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if is_valid_url(href) {
        return Some(href.to_string());
    }

    let base = Url::parse(base).ok()?;
    let joined = base.join(href).ok()?;
    if matches!(joined.scheme(), "http" | "https") {
        Some(joined.to_string())
    } else {
        None
    }
}

/// Lowercased host of a URL, or empty when unparseable.
pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(
            normalize_url("https://x.ac.kr/board/view?id=7", "https://x.ac.kr/board/list"),
            Some("https://x.ac.kr/board/view?id=7".to_string())
        );
    }

    #[test]
    fn relative_urls_join_against_base() {
        assert_eq!(
            normalize_url("/board/view?id=7", "https://x.ac.kr/board/list"),
            Some("https://x.ac.kr/board/view?id=7".to_string())
        );
        assert_eq!(
            normalize_url("n?id=3", "https://x.ac.kr/notice/"),
            Some("https://x.ac.kr/notice/n?id=3".to_string())
        );
    }

    #[test]
    fn javascript_and_empty_hrefs_rejected() {
        assert_eq!(normalize_url("", "https://x.ac.kr/"), None);
        assert_eq!(normalize_url("javascript:void(0)", "https://x.ac.kr/"), None);
    }

    #[test]
    fn validity_requires_scheme_and_host() {
        assert!(is_valid_url("http://snu.ac.kr/notice"));
        assert!(!is_valid_url("/notice"));
        assert!(!is_valid_url("ftp://snu.ac.kr"));
    }

    #[test]
    fn domain_is_lowercased_host() {
        assert_eq!(extract_domain("https://CS.SNU.ac.kr/board"), "cs.snu.ac.kr");
        assert_eq!(extract_domain("not a url"), "");
    }
}
