//! The extraction engine: the per-URL strategy cascade.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;
use serde::Serialize;
use tracing::{debug, info, warn};

use bulletin_config::{CompiledPatterns, CrawlerConfig};
use bulletin_fetch::FetchClient;
use bulletin_types::{ConfigError, CrawlError, CrawlResult, ExtractionMethod, Notice};

use crate::detect::PatternDetector;
use crate::selectors::execute_selector_set;
use crate::templates::TemplateRegistry;

/// Failure message when every strategy comes up empty.
pub const ALL_METHODS_FAILED: &str = "모든 크롤링 방법 실패";

/// Confidence threshold for re-detection on a headless-rendered DOM.
const HEADLESS_MIN_CONFIDENCE: f64 = 0.5;

/// Black-box renderer returning the serialized DOM after scripts ran.
///
/// The engine treats rendering as a scoped operation behind this seam; the
/// chromiumoxide adapter implements it, and tests substitute canned HTML.
#[async_trait]
pub trait DomRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, CrawlError>;
}

/// Per-method success counters, shared across concurrent extractions.
#[derive(Debug, Default)]
pub struct MethodStats {
    template: AtomicU64,
    auto_detect: AtomicU64,
    custom: AtomicU64,
    selenium: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of the counters, for the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MethodStatsSnapshot {
    pub template: u64,
    pub auto_detect: u64,
    pub custom: u64,
    pub selenium: u64,
    pub failed: u64,
}

impl MethodStats {
    fn record(&self, method: ExtractionMethod) {
        let counter = match method {
            ExtractionMethod::Template => &self.template,
            ExtractionMethod::AutoDetect => &self.auto_detect,
            ExtractionMethod::Custom => &self.custom,
            ExtractionMethod::Headless => &self.selenium,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MethodStatsSnapshot {
        MethodStatsSnapshot {
            template: self.template.load(Ordering::Relaxed),
            auto_detect: self.auto_detect.load(Ordering::Relaxed),
            custom: self.custom.load(Ordering::Relaxed),
            selenium: self.selenium.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// The per-URL extraction cascade.
///
/// Safe for concurrent use: the HTTP client is shared, the registry is
/// read-mostly, the detector keeps no call state, and the counters are
/// atomic. One call never raises; every fault becomes a failed
/// [`CrawlResult`].
pub struct ExtractionEngine {
    config: CrawlerConfig,
    fetch: FetchClient,
    registry: Arc<TemplateRegistry>,
    detector: PatternDetector,
    renderer: Option<Arc<dyn DomRenderer>>,
    stats: MethodStats,
}

impl ExtractionEngine {
    /// Build the engine. Compiles the pattern set and the HTTP client once;
    /// fails only on unusable configuration.
    pub fn new(config: CrawlerConfig, registry: Arc<TemplateRegistry>) -> Result<Self, ConfigError> {
        let fetch = FetchClient::new(&config.crawler)?;
        let patterns = CompiledPatterns::compile(&config.patterns)?;
        let detector = PatternDetector::new(config.detection.clone(), patterns);
        Ok(Self {
            config,
            fetch,
            registry,
            detector,
            renderer: None,
            stats: MethodStats::default(),
        })
    }

    /// Attach a headless renderer for the fallback step.
    pub fn with_renderer(mut self, renderer: Arc<dyn DomRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// The template registry this engine consults.
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Current per-method counters.
    pub fn stats(&self) -> MethodStatsSnapshot {
        self.stats.snapshot()
    }

    /// Crawl one board URL.
    ///
    /// Cascade: curated template → pattern detection → generic patterns →
    /// headless re-detection (when enabled). Each step is accepted only when
    /// it yields at least `min_notices` validated rows.
    pub async fn extract(&self, url: &str, site_name: &str) -> CrawlResult {
        info!(site = site_name, url, "crawl started");

        let html = match self.fetch.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(site = site_name, error = %e, "page load failed");
                self.stats.record_failure();
                return CrawlResult::failed(e.to_string());
            }
        };

        if let Some((notices, method)) = self.run_static_strategies(&html, url) {
            self.stats.record(method);
            info!(
                site = site_name,
                method = method.tag(),
                count = notices.len(),
                "crawl succeeded"
            );
            return CrawlResult::ok(notices, method);
        }

        if self.config.fallback.use_browser {
            if let Some(renderer) = &self.renderer {
                match renderer.render(url).await {
                    Ok(rendered) => {
                        if let Some(notices) = self.run_rendered_detection(&rendered, url) {
                            self.stats.record(ExtractionMethod::Headless);
                            info!(
                                site = site_name,
                                count = notices.len(),
                                "headless fallback succeeded"
                            );
                            return CrawlResult::ok(notices, ExtractionMethod::Headless);
                        }
                    }
                    Err(e) => warn!(site = site_name, error = %e, "headless render failed"),
                }
            }
        }

        warn!(site = site_name, url, "all strategies failed");
        self.stats.record_failure();
        CrawlResult::failed(ALL_METHODS_FAILED)
    }

    /// Run the static portion of the cascade on a caller-supplied document.
    ///
    /// Deterministic for a fixed document and registry state, and does not
    /// touch the method counters; `extract` is the counting entry point.
    pub fn extract_from_html(&self, html: &str, url: &str) -> CrawlResult {
        match self.run_static_strategies(html, url) {
            Some((notices, method)) => CrawlResult::ok(notices, method),
            None => CrawlResult::failed(ALL_METHODS_FAILED),
        }
    }

    /// Re-run detection on a rendered snapshot at the relaxed threshold.
    ///
    /// Returns validated notices when the relaxed detection pass holds.
    pub fn extract_from_rendered_html(&self, html: &str, url: &str) -> Option<Vec<Notice>> {
        self.run_rendered_detection(html, url)
    }

    fn run_static_strategies(
        &self,
        html: &str,
        url: &str,
    ) -> Option<(Vec<Notice>, ExtractionMethod)> {
        let document = Html::parse_document(html);
        let min_notices = self.config.detection.min_notices;

        // 1. Curated template.
        if let Some(matched) = self.registry.match_document(&document, html, url) {
            match execute_selector_set(&document, &matched.template.selectors, url) {
                Ok(raw) => {
                    let notices = self.validate_notices(raw);
                    if notices.len() >= min_notices {
                        debug!(template = %matched.template.name, "template strategy hit");
                        return Some((notices, ExtractionMethod::Template));
                    }
                    debug!(
                        template = %matched.template.name,
                        "template matched but yielded too few rows"
                    );
                }
                Err(e) => debug!(template = %matched.template.name, error = %e, "template execution failed"),
            }
        }

        // 2. Heuristic detection.
        if let Some(detection) = self.detector.detect(&document) {
            if detection.accepted(self.config.detection.min_confidence) {
                match execute_selector_set(&document, &detection.selectors, url) {
                    Ok(raw) => {
                        let notices = self.validate_notices(raw);
                        if notices.len() >= min_notices {
                            debug!(
                                confidence = detection.confidence,
                                "detection strategy hit"
                            );
                            return Some((notices, ExtractionMethod::AutoDetect));
                        }
                    }
                    Err(e) => debug!(error = %e, "detected selectors failed to execute"),
                }
            } else {
                debug!(
                    confidence = detection.confidence,
                    threshold = self.config.detection.min_confidence,
                    "detection below threshold"
                );
            }
        }

        // 3. Generic board patterns.
        for set in self.registry.generic_sets() {
            match execute_selector_set(&document, &set, url) {
                Ok(raw) => {
                    let notices = self.validate_notices(raw);
                    if notices.len() >= min_notices {
                        debug!(item = %set.item, "generic pattern hit");
                        return Some((notices, ExtractionMethod::Custom));
                    }
                }
                Err(e) => debug!(item = %set.item, error = %e, "generic pattern failed"),
            }
        }

        None
    }

    fn run_rendered_detection(&self, html: &str, url: &str) -> Option<Vec<Notice>> {
        let document = Html::parse_document(html);

        // The configured probe selectors are informational: they tell the
        // log whether the render produced anything list-shaped, but the
        // relaxed re-detection below is authoritative.
        let probe_hits = self
            .config
            .fallback
            .browser_selectors
            .iter()
            .filter_map(|s| crate::dom::parse_selector_lenient(s))
            .filter(|sel| document.select(sel).count() >= self.config.detection.min_notices)
            .count();
        debug!(probe_hits, "rendered DOM probed");

        let detection = self.detector.detect(&document)?;
        if detection.confidence < HEADLESS_MIN_CONFIDENCE {
            debug!(
                confidence = detection.confidence,
                "rendered detection below relaxed threshold"
            );
            return None;
        }

        let raw = execute_selector_set(&document, &detection.selectors, url).ok()?;
        let notices = self.validate_notices(raw);
        if notices.len() >= self.config.detection.min_notices {
            Some(notices)
        } else {
            None
        }
    }

    /// Apply the output invariants: title bounds, exact-title dedup in DOM
    /// order, and the per-site cap.
    fn validate_notices(&self, raw: Vec<Notice>) -> Vec<Notice> {
        let min = self.config.detection.min_title_length;
        let max = self.config.detection.max_title_length;
        let cap = self.config.validation.max_notices_per_university;

        let mut seen = HashSet::new();
        let mut valid = Vec::new();
        for notice in raw {
            if !notice.title_in_bounds(min, max) {
                debug!(title = %notice.title, "row dropped by title bounds");
                continue;
            }
            if !seen.insert(notice.title.clone()) {
                debug!(title = %notice.title, "duplicate title dropped");
                continue;
            }
            valid.push(notice);
            if valid.len() == cap {
                break;
            }
        }
        valid
    }
}
