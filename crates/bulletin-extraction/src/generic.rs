//! The fixed, ordered list of common board patterns.

use bulletin_types::SelectorSet;

/// Generic selector sets tried in order: classic table boards, `ul/li`
/// boards, then `div`-row boards. The registry also uses this list as its
/// lowest-ranked match bucket.
pub fn generic_selector_sets() -> Vec<SelectorSet> {
    vec![
        SelectorSet::new(
            "table tbody tr, .board-table tr",
            "td:nth-child(2) a, td.title a, td.subject a",
            "td:last-child, td.date, td:nth-last-child(2)",
            "a",
        ),
        SelectorSet::new(
            "ul.board-list li, .notice-list li, .list-group-item",
            ".title a, .subject a, a",
            ".date, .regdate, .time",
            "a",
        ),
        SelectorSet::new(
            ".board-item, .notice-item, .item, .row",
            ".title a, .subject a, h3 a, h4 a",
            ".date, .regdate, .time, span:last-child",
            "a",
        ),
    ]
}
