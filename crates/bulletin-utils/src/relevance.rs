//! Keyword-based relevance classification for notice titles.

/// Keywords that mark a title as a board notice worth keeping.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "공지", "안내", "모집", "전형", "입학", "합격", "발표", "시험", "접수", "마감", "변경",
    "연기", "취소", "선발",
];

/// Keywords that mark promotional content; these always win over the
/// inclusion list.
pub const EXCLUDED_KEYWORDS: &[&str] = &["광고", "홍보", "이벤트", "세미나", "특강"];

/// Classify a title's relevance.
///
/// Exclusions are checked first so promotional postings never pass. With the
/// default keyword set, titles matching neither list are kept, since boards
/// routinely post relevant items without a marker word; a caller-supplied
/// keyword list narrows instead, requiring a hit.
pub fn is_notice_relevant(title: &str, keywords: Option<&[&str]>) -> bool {
    if title.is_empty() {
        return false;
    }

    let title_lower = title.to_lowercase();

    if EXCLUDED_KEYWORDS.iter().any(|k| title_lower.contains(k)) {
        return false;
    }

    match keywords {
        Some(required) => required.iter().any(|k| title_lower.contains(k)),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusions_beat_inclusions() {
        assert!(!is_notice_relevant("신입생 환영 이벤트 공지", None));
        assert!(!is_notice_relevant("취업 특강 안내", Some(&["안내"])));
    }

    #[test]
    fn custom_keyword_list_narrows() {
        assert!(is_notice_relevant("2024학년도 수시모집 합격자 발표", Some(&["발표"])));
        assert!(!is_notice_relevant("도서관 운영시간", Some(&["모집"])));
    }

    #[test]
    fn unmarked_titles_default_to_relevant() {
        assert!(is_notice_relevant("도서관 운영시간", None));
        assert!(!is_notice_relevant("", None));
    }
}
