//! The template registry: curated selector sets keyed by domain or vendor
//! fingerprint, validated against the document before acceptance.

use std::collections::BTreeMap;
use std::path::Path;

use parking_lot::RwLock;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bulletin_types::{ConfigError, SelectorSet, Template, TemplateMatch, TemplateSource};
use bulletin_utils::extract_domain;

use crate::dom::{container_prefix, element_text, find_href, parse_selector_lenient, select_first};
use crate::generic::generic_selector_sets;

/// A template must select at least this many rows to be accepted.
const MIN_TEMPLATE_ITEMS: usize = 3;
/// How many leading rows are probed during validation.
const VALIDATION_SAMPLE: usize = 5;

/// Serialized registry file: three maps keyed by system id, hostname, and
/// custom template name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RegistryFile {
    systems: BTreeMap<String, Template>,
    domains: BTreeMap<String, Template>,
    custom: BTreeMap<String, Template>,
}

/// Process-scoped, read-mostly template catalogue.
///
/// Readers take a shared lock; the only writers are `add_custom` and the
/// explicit `save`, so concurrent extractions never contend in practice.
#[derive(Debug)]
pub struct TemplateRegistry {
    state: RwLock<RegistryFile>,
}

impl TemplateRegistry {
    /// Registry with the built-in vendor systems and domain templates.
    pub fn with_defaults() -> Self {
        Self {
            state: RwLock::new(default_registry()),
        }
    }

    /// Load a registry file, falling back to the built-in defaults when the
    /// file is absent or unreadable. A bad registry file degrades the match
    /// rate but is not a startup failure.
    pub fn load(path: &Path) -> Self {
        let state = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<RegistryFile>(&raw) {
                Ok(file) => {
                    info!(
                        path = %path.display(),
                        systems = file.systems.len(),
                        domains = file.domains.len(),
                        custom = file.custom.len(),
                        "template registry loaded"
                    );
                    file
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "malformed registry file, using defaults");
                    default_registry()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "no registry file, using defaults");
                default_registry()
            }
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Find a validated curated template for this document.
    ///
    /// Ranking: domain (exact, then suffix) → system fingerprint. A
    /// candidate is returned only after it validates against the document,
    /// so a stale template for a redesigned site falls through to the
    /// heuristics instead of extracting noise. The built-in generic board
    /// patterns rank below both and below detection; the engine tries them
    /// via [`TemplateRegistry::generic_sets`].
    pub fn match_document(&self, document: &Html, html: &str, url: &str) -> Option<TemplateMatch> {
        let state = self.state.read();

        if let Some(template) = match_by_domain(&state, url) {
            if validate_template(document, &template.selectors) {
                debug!(template = %template.name, "domain template matched");
                return Some(TemplateMatch {
                    template,
                    source: TemplateSource::Domain,
                });
            }
        }

        if let Some(template) = match_by_system(&state, html, url) {
            if validate_template(document, &template.selectors) {
                debug!(template = %template.name, "system template matched");
                return Some(TemplateMatch {
                    template,
                    source: TemplateSource::System,
                });
            }
        }

        None
    }

    /// The fixed, ordered generic board patterns the registry ships with.
    pub fn generic_sets(&self) -> Vec<SelectorSet> {
        generic_selector_sets()
    }

    /// Append a custom template. Persisting it is a separate, explicit
    /// [`TemplateRegistry::save`].
    pub fn add_custom(&self, name: impl Into<String>, selectors: SelectorSet) {
        let name = name.into();
        let template = Template::for_domain(name.clone(), selectors);
        self.state.write().custom.insert(name, template);
    }

    /// Write the registry to disk.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let state = self.state.read();
        let json = serde_json::to_string_pretty(&*state).map_err(|e| ConfigError::Unwritable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| ConfigError::Unwritable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), "template registry saved");
        Ok(())
    }

    /// Bucket sizes, for the run report.
    pub fn stats(&self) -> RegistryStats {
        let state = self.state.read();
        RegistryStats {
            systems: state.systems.len(),
            domains: state.domains.len(),
            custom: state.custom.len(),
        }
    }

    /// Propose a selector set for a document no template matched, from its
    /// dominant table or list structure.
    pub fn suggest(&self, document: &Html) -> Option<TemplateSuggestion> {
        let mut best: Option<TemplateSuggestion> = None;
        for candidate in suggest_from_tables(document)
            .into_iter()
            .chain(suggest_from_lists(document))
        {
            match &best {
                Some(current) if current.confidence >= candidate.confidence => {}
                _ => best = Some(candidate),
            }
        }
        best
    }
}

/// Registry bucket sizes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RegistryStats {
    pub systems: usize,
    pub domains: usize,
    pub custom: usize,
}

/// A proposed template for an unmatched document.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSuggestion {
    pub selectors: SelectorSet,
    pub confidence: f64,
}

fn match_by_domain(state: &RegistryFile, url: &str) -> Option<Template> {
    let domain = extract_domain(url);
    if domain.is_empty() {
        return None;
    }

    if let Some(template) = state.domains.get(&domain) {
        return Some(template.clone());
    }
    state
        .domains
        .iter()
        .find(|(key, _)| domain.ends_with(key.as_str()))
        .map(|(_, template)| template.clone())
}

fn match_by_system(state: &RegistryFile, html: &str, url: &str) -> Option<Template> {
    let html_lower = html.to_lowercase();
    let url_lower = url.to_lowercase();

    for template in state.systems.values() {
        if template.indicators.is_empty() {
            continue;
        }
        let hits = template
            .indicators
            .iter()
            .filter(|indicator| {
                let needle = indicator.to_lowercase();
                html_lower.contains(&needle) || url_lower.contains(&needle)
            })
            .count();
        // At least half of the fingerprint must be present.
        if hits * 2 >= template.indicators.len() {
            return Some(template.clone());
        }
    }
    None
}

/// Check a selector set against the document before accepting it.
///
/// Requires `MIN_TEMPLATE_ITEMS` rows, and at least half of the first
/// `VALIDATION_SAMPLE` rows must yield a title longer than five characters
/// or, failing that, a resolvable href.
pub(crate) fn validate_template(document: &Html, selectors: &SelectorSet) -> bool {
    let Some(item_selector) = parse_selector_lenient(&selectors.item) else {
        return false;
    };
    let title_selector = parse_selector_lenient(&selectors.title);
    let link_selector = parse_selector_lenient(&selectors.link);

    let items: Vec<ElementRef<'_>> = document.select(&item_selector).collect();
    if items.len() < MIN_TEMPLATE_ITEMS {
        return false;
    }

    let sample = &items[..items.len().min(VALIDATION_SAMPLE)];
    let mut valid = 0usize;
    for item in sample {
        let titled = title_selector
            .as_ref()
            .and_then(|sel| select_first(*item, sel))
            .map(|el| element_text(el).chars().count() > 5)
            .unwrap_or(false);
        if titled {
            valid += 1;
            continue;
        }
        let linked = link_selector
            .as_ref()
            .and_then(|sel| select_first(*item, sel))
            .and_then(find_href)
            .is_some();
        if linked {
            valid += 1;
        }
    }

    valid as f64 >= sample.len() as f64 * 0.5
}

fn suggest_from_tables(document: &Html) -> Option<TemplateSuggestion> {
    let table_selector = parse_selector_lenient("table")?;
    let row_selector = parse_selector_lenient("tbody tr, tr")?;
    let th_selector = parse_selector_lenient("th")?;
    let cell_selector = parse_selector_lenient("td")?;

    for table in document.select(&table_selector) {
        let rows: Vec<ElementRef<'_>> = table.select(&row_selector).collect();
        if rows.len() < 5 {
            continue;
        }

        let has_header = select_first(rows[0], &th_selector).is_some();
        let data_rows = if has_header { &rows[1..] } else { &rows[..] };
        if data_rows.len() < 3 {
            continue;
        }

        let cells: Vec<ElementRef<'_>> = data_rows[0].select(&cell_selector).collect();
        if cells.len() < 2 {
            continue;
        }

        let title_col = cells
            .iter()
            .enumerate()
            .max_by_key(|(_, cell)| element_text(**cell).chars().count())
            .map(|(i, _)| i)
            .unwrap_or(0);
        let date_col = cells.len() - 1;

        let table_prefix = container_prefix(table);
        return Some(TemplateSuggestion {
            selectors: SelectorSet::new(
                format!("{table_prefix} tbody tr"),
                format!(
                    "td:nth-child({n}) a, td:nth-child({n})",
                    n = title_col + 1
                ),
                format!("td:nth-child({})", date_col + 1),
                "a",
            ),
            confidence: 0.8,
        });
    }
    None
}

fn suggest_from_lists(document: &Html) -> Option<TemplateSuggestion> {
    let list_selector = parse_selector_lenient("ul, ol")?;
    let item_selector = parse_selector_lenient("li")?;
    let anchor_selector = parse_selector_lenient("a")?;

    for list in document.select(&list_selector) {
        let items: Vec<ElementRef<'_>> = list.select(&item_selector).collect();
        if items.len() < 5 {
            continue;
        }
        if select_first(items[0], &anchor_selector).is_none() {
            continue;
        }

        let list_prefix = container_prefix(list);
        return Some(TemplateSuggestion {
            selectors: SelectorSet::new(
                format!("{list_prefix} li"),
                "a, .title, .subject",
                ".date, .regdate, .time, span:last-child",
                "a",
            ),
            confidence: 0.7,
        });
    }
    None
}

/// The vendor systems and domain templates the crawler ships with.
fn default_registry() -> RegistryFile {
    let mut systems = BTreeMap::new();
    systems.insert(
        "acapia".to_string(),
        Template::for_system(
            "acapia",
            vec![
                "acapia.co.kr".to_string(),
                "class=\"board_list\"".to_string(),
                "id=\"board_list\"".to_string(),
            ],
            SelectorSet::new(
                "table.board_list tbody tr, .board_list tr",
                "td.title a, td:nth-child(2) a",
                "td.date, td:last-child",
                "a",
            ),
        ),
    );
    systems.insert(
        "jinhakapply".to_string(),
        Template::for_system(
            "jinhakapply",
            vec![
                "jinhakapply.com".to_string(),
                "class=\"bbs-list\"".to_string(),
                "jinhakapply".to_string(),
            ],
            SelectorSet::new(
                "ul.bbs-list li, .notice-list li",
                "a.tit, .title a",
                "span.date, .regdate",
                "a",
            ),
        ),
    );
    systems.insert(
        "kiuri".to_string(),
        Template::for_system(
            "kiuri",
            vec![
                "kiuri.org".to_string(),
                "class=\"board\"".to_string(),
                "kiuri".to_string(),
            ],
            SelectorSet::new("table.board tbody tr", "td.subject a", "td.date", "a"),
        ),
    );
    systems.insert(
        "campus".to_string(),
        Template::for_system(
            "campus",
            vec![
                "campus.ac.kr".to_string(),
                "class=\"bbsListTbl\"".to_string(),
            ],
            SelectorSet::new(
                "table.bbsListTbl tbody tr, .board-table tr",
                "td.subject a, td:nth-child(2) a",
                "td.date, td:last-child",
                "a",
            ),
        ),
    );

    let mut domains = BTreeMap::new();
    domains.insert(
        "snu.ac.kr".to_string(),
        Template::for_domain(
            "snu.ac.kr",
            SelectorSet::new("tbody tr", "td:nth-child(2) a", "td:last-child", "a"),
        ),
    );
    domains.insert(
        "yonsei.ac.kr".to_string(),
        Template::for_domain(
            "yonsei.ac.kr",
            SelectorSet::new(".board-list tr", ".subject a", ".date", "a"),
        ),
    );

    RegistryFile {
        systems,
        domains,
        custom: BTreeMap::new(),
    }
}
