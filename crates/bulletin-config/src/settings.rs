//! Typed settings sections with serde defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use bulletin_types::ConfigError;

/// Root configuration, one section per concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub crawler: FetchSettings,
    pub detection: DetectionSettings,
    pub validation: ValidationSettings,
    pub fallback: FallbackSettings,
    pub browser: BrowserSettings,
    pub patterns: PatternSettings,
}

/// HTTP fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Whole-request timeout in seconds.
    pub timeout: u64,
    pub user_agent: String,
}

/// Pattern-detection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Minimum confidence for accepting a detection on the static DOM.
    pub min_confidence: f64,
    /// Minimum item count for any strategy to count as a hit.
    pub min_notices: usize,
    pub min_title_length: usize,
    pub max_title_length: usize,
    /// Structural-similarity threshold for clustering candidate rows.
    pub similarity_threshold: f64,
}

/// Output-validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub max_notices_per_university: usize,
}

/// Headless-fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    /// Whether the cascade may fall back to a headless render.
    pub use_browser: bool,
    /// Candidate item selectors probed on the rendered DOM before
    /// re-detection.
    pub browser_selectors: Vec<String>,
}

/// Headless browser process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Command-line flags passed to Chrome.
    pub chrome_flags: Vec<String>,
    /// Page-load timeout in seconds.
    pub timeout: u64,
    /// Settle time after navigation, letting scripts populate the board.
    pub render_wait_ms: u64,
}

/// Date regexes and notice keywords used by the heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    pub date_patterns: Vec<String>,
    pub notice_keywords: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            min_confidence: 0.7,
            min_notices: 3,
            min_title_length: 5,
            max_title_length: 500,
            similarity_threshold: 0.8,
        }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            max_notices_per_university: 50,
        }
    }
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            use_browser: false,
            browser_selectors: vec![
                "table tbody tr".to_string(),
                "ul.board-list li".to_string(),
                ".notice-list li".to_string(),
                ".board-item".to_string(),
            ],
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_flags: vec![
                "--headless=new".to_string(),
                "--no-sandbox".to_string(),
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--window-size=1920,1080".to_string(),
            ],
            timeout: 30,
            render_wait_ms: 2000,
        }
    }
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            date_patterns: vec![
                r"\d{4}[-./]\d{1,2}[-./]\d{1,2}".to_string(),
                r"\d{2}[-./]\d{1,2}[-./]\d{1,2}".to_string(),
                r"\d{4}년\s*\d{1,2}월\s*\d{1,2}일".to_string(),
                r"\d{1,2}월\s*\d{1,2}일".to_string(),
                // Year-less MM-DD only counts when it is the whole text,
                // otherwise row numbers and phone fragments light up.
                r"^\d{1,2}[-./]\d{1,2}$".to_string(),
            ],
            notice_keywords: vec![
                "공지".to_string(),
                "안내".to_string(),
                "모집".to_string(),
                "전형".to_string(),
                "입학".to_string(),
                "합격".to_string(),
                "발표".to_string(),
                "시험".to_string(),
                "접수".to_string(),
                "마감".to_string(),
            ],
        }
    }
}

impl CrawlerConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid {
            reason: format!("{path:?}: {e}", path = path.display()),
        })?;
        debug!(path = %path.display(), "configuration loaded");
        config.validate()?;
        Ok(config)
    }

    /// Load from a file when it exists, otherwise fall back to defaults.
    /// Either way, environment overrides are applied last.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Self::default()
        };
        crate::env::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.detection.min_confidence) {
            return Err(ConfigError::Field {
                field: "detection.min_confidence".to_string(),
                reason: "must be within [0, 1]".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.detection.similarity_threshold) {
            return Err(ConfigError::Field {
                field: "detection.similarity_threshold".to_string(),
                reason: "must be within [0, 1]".to_string(),
            });
        }
        if self.detection.min_notices == 0 {
            return Err(ConfigError::Field {
                field: "detection.min_notices".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.detection.min_title_length >= self.detection.max_title_length {
            return Err(ConfigError::Field {
                field: "detection.min_title_length".to_string(),
                reason: "must be below detection.max_title_length".to_string(),
            });
        }
        if self.crawler.timeout == 0 {
            return Err(ConfigError::Field {
                field: "crawler.timeout".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        for pattern in &self.patterns.date_patterns {
            regex::Regex::new(pattern).map_err(|e| ConfigError::Field {
                field: "patterns.date_patterns".to_string(),
                reason: format!("{pattern:?} does not compile: {e}"),
            })?;
        }
        Ok(())
    }
}
