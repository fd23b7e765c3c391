//! The JSON run report.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use bulletin_extraction::MethodStatsSnapshot;
use bulletin_types::CrawlResult;

/// Outcome of one site's crawl, as it appears in the report.
#[derive(Debug, Clone, Serialize)]
pub struct SiteOutcome {
    pub name: String,
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub notices_found: usize,
    pub notices_saved: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SiteOutcome {
    pub fn from_result(
        name: String,
        url: String,
        result: &CrawlResult,
        notices_saved: usize,
    ) -> Self {
        Self {
            name,
            url,
            success: result.success,
            method: result.method.map(|m| m.tag().to_string()),
            notices_found: result.notices.len(),
            notices_saved,
            error: result.error.clone(),
        }
    }
}

/// Aggregate counters across the run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Totals {
    pub sites: usize,
    pub successes: usize,
    pub failures: usize,
    pub notices_found: usize,
    pub notices_saved: usize,
}

/// The full run report written after every batch.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub totals: Totals,
    pub methods: MethodStatsSnapshot,
    pub sites: Vec<SiteOutcome>,
}

impl RunReport {
    pub fn new(sites: Vec<SiteOutcome>, methods: MethodStatsSnapshot) -> Self {
        let totals = Totals {
            sites: sites.len(),
            successes: sites.iter().filter(|s| s.success).count(),
            failures: sites.iter().filter(|s| !s.success).count(),
            notices_found: sites.iter().map(|s| s.notices_found).sum(),
            notices_saved: sites.iter().map(|s| s.notices_saved).sum(),
        };
        Self {
            generated_at: Utc::now(),
            totals,
            methods,
            sites,
        }
    }

    /// Write the report under `dir` as `report_<timestamp>.json`.
    pub fn write(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let filename = format!(
            "report_{}.json",
            self.generated_at.format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: bool, found: usize, saved: usize) -> SiteOutcome {
        SiteOutcome {
            name: "대학".to_string(),
            url: "https://u.ac.kr".to_string(),
            success,
            method: success.then(|| "auto_detect".to_string()),
            notices_found: found,
            notices_saved: saved,
            error: (!success).then(|| "모든 크롤링 방법 실패".to_string()),
        }
    }

    #[test]
    fn totals_add_up_across_sites() {
        let report = RunReport::new(
            vec![outcome(true, 5, 3), outcome(true, 2, 0), outcome(false, 0, 0)],
            MethodStatsSnapshot::default(),
        );
        assert_eq!(report.totals.sites, 3);
        assert_eq!(report.totals.successes, 2);
        assert_eq!(report.totals.failures, 1);
        assert_eq!(report.totals.notices_found, 7);
        assert_eq!(report.totals.notices_saved, 3);
    }

    #[test]
    fn report_round_trips_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let report = RunReport::new(vec![outcome(true, 4, 4)], MethodStatsSnapshot::default());
        let path = report.write(dir.path()).unwrap();

        let raw = std::fs::read_to_string(path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["totals"]["sites"], 1);
        assert_eq!(parsed["sites"][0]["method"], "auto_detect");
    }
}
