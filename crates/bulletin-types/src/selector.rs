//! Selector sets: the DOM-query quadruple shared by templates and detection.

use serde::{Deserialize, Serialize};

/// CSS selectors locating a notice list and its fields.
///
/// `container` scopes `item` to a subtree; `None` means the document root.
/// The remaining selectors are resolved relative to each matched item. The
/// serialized form matches the registry file schema, where the item selector
/// is stored under the key `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    /// Optional scoping selector for the list container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// Selector for one notice row.
    #[serde(rename = "list")]
    pub item: String,
    /// Selector for the title element within a row.
    pub title: String,
    /// Selector for the date element within a row.
    pub date: String,
    /// Selector for the link element within a row.
    pub link: String,
}

impl SelectorSet {
    /// Build a selector set rooted at the document.
    pub fn new(
        item: impl Into<String>,
        title: impl Into<String>,
        date: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            container: None,
            item: item.into(),
            title: title.into(),
            date: date.into(),
            link: link.into(),
        }
    }

    /// Scope this selector set to a container selector.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_file_round_trip() {
        let json = r#"{
            "list": "table.board tbody tr",
            "title": "td.subject a",
            "date": "td.date",
            "link": "a"
        }"#;
        let set: SelectorSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.item, "table.board tbody tr");
        assert_eq!(set.container, None);

        let back = serde_json::to_value(&set).unwrap();
        assert_eq!(back["list"], "table.board tbody tr");
        assert!(back.get("container").is_none());
    }
}
