//! Date regexes compiled once at startup.

use regex::Regex;

use bulletin_types::ConfigError;

use crate::settings::PatternSettings;

/// The pattern set shared by the detector and the selector executor.
///
/// Regexes compile exactly once, here; everything downstream sees only the
/// behavioral surface (does this text contain a date, which keywords apply).
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    date_patterns: Vec<Regex>,
    notice_keywords: Vec<String>,
}

impl CompiledPatterns {
    pub fn compile(settings: &PatternSettings) -> Result<Self, ConfigError> {
        let mut date_patterns = Vec::with_capacity(settings.date_patterns.len());
        for pattern in &settings.date_patterns {
            let compiled = Regex::new(pattern).map_err(|e| ConfigError::Field {
                field: "patterns.date_patterns".to_string(),
                reason: format!("{pattern:?} does not compile: {e}"),
            })?;
            date_patterns.push(compiled);
        }
        Ok(Self {
            date_patterns,
            notice_keywords: settings.notice_keywords.clone(),
        })
    }

    /// Whether any configured date pattern occurs in the text.
    pub fn contains_date(&self, text: &str) -> bool {
        self.date_patterns.iter().any(|p| p.is_match(text))
    }

    /// Whether any notice keyword occurs in the (lowercased) text.
    pub fn contains_keyword(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.notice_keywords.iter().any(|k| lower.contains(k))
    }
}

impl Default for CompiledPatterns {
    fn default() -> Self {
        Self::compile(&PatternSettings::default()).expect("default patterns compile")
    }
}
