//! The persistence interface and its JSON-file implementation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use bulletin_types::Notice;

/// How many recent titles per site the duplicate check looks back over.
pub const DEFAULT_DEDUP_WINDOW: usize = 200;

/// Where extracted notices go.
///
/// `save` returns the count actually written after deduplicating against
/// the most recent titles for the same site, so repeated crawls of an
/// unchanged board write nothing.
#[async_trait]
pub trait NoticeStore: Send + Sync {
    async fn save(&self, notices: &[Notice], site_name: &str) -> anyhow::Result<usize>;
}

/// One persisted row.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredNotice {
    university_name: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    crawled_at: DateTime<Utc>,
}

/// Append-only JSON file store.
///
/// The whole file is rewritten on save, guarded by a mutex so concurrent
/// crawl workers serialize their writes.
pub struct JsonFileStore {
    path: PathBuf,
    dedup_window: usize,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dedup_window: DEFAULT_DEDUP_WINDOW,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_dedup_window(mut self, window: usize) -> Self {
        self.dedup_window = window;
        self
    }

    fn read_all(path: &Path) -> anyhow::Result<Vec<StoredNotice>> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl NoticeStore for JsonFileStore {
    async fn save(&self, notices: &[Notice], site_name: &str) -> anyhow::Result<usize> {
        if notices.is_empty() {
            return Ok(0);
        }

        let _guard = self.write_lock.lock().await;

        let mut stored = Self::read_all(&self.path)?;

        // Recent titles for this site, newest last because the file is
        // append-only.
        let recent_titles: HashSet<&str> = stored
            .iter()
            .filter(|row| row.university_name == site_name)
            .rev()
            .take(self.dedup_window)
            .map(|row| row.title.as_str())
            .collect();

        let now = Utc::now();
        let mut batch_titles = HashSet::new();
        let fresh: Vec<StoredNotice> = notices
            .iter()
            .filter(|notice| {
                !recent_titles.contains(notice.title.as_str())
                    && batch_titles.insert(notice.title.clone())
            })
            .map(|notice| StoredNotice {
                university_name: site_name.to_string(),
                title: notice.title.clone(),
                date: notice.date.clone(),
                link: notice.link.clone(),
                crawled_at: now,
            })
            .collect();

        if fresh.is_empty() {
            debug!(site = site_name, "no new notices");
            return Ok(0);
        }

        let written = fresh.len();
        stored.extend(fresh);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;

        info!(site = site_name, written, "notices saved");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(title: &str) -> Notice {
        Notice::new(title, Some("2024-05-01".to_string()), None)
    }

    #[tokio::test]
    async fn saves_then_deduplicates_on_repeat() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("notices.json"));

        let batch = vec![notice("수강신청 기간 안내"), notice("장학금 신청 공지")];
        assert_eq!(store.save(&batch, "서울대학교").await.unwrap(), 2);
        assert_eq!(store.save(&batch, "서울대학교").await.unwrap(), 0);

        // A different site keeps its own window.
        assert_eq!(store.save(&batch, "연세대학교").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn mixed_batches_write_only_the_new_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("notices.json"));

        store
            .save(&[notice("수강신청 기간 안내")], "서울대학교")
            .await
            .unwrap();
        let written = store
            .save(
                &[notice("수강신청 기간 안내"), notice("기숙사 입사 안내")],
                "서울대학교",
            )
            .await
            .unwrap();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn titles_outside_the_window_can_repeat() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("notices.json")).with_dedup_window(1);

        store.save(&[notice("첫 번째 공지")], "서울대학교").await.unwrap();
        store.save(&[notice("두 번째 공지")], "서울대학교").await.unwrap();
        // The window only covers the latest row, so the oldest title is
        // forgotten and may be written again.
        let written = store.save(&[notice("첫 번째 공지")], "서울대학교").await.unwrap();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn duplicates_within_one_batch_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("notices.json"));

        let written = store
            .save(
                &[notice("같은 제목 공지"), notice("같은 제목 공지")],
                "서울대학교",
            )
            .await
            .unwrap();
        assert_eq!(written, 1);
    }
}
