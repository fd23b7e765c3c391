//! Environment-variable overrides, applied after file loading.

use std::env;
use std::str::FromStr;

use tracing::debug;

use bulletin_types::ConfigError;

use crate::settings::CrawlerConfig;

/// Override individual settings from the process environment.
///
/// Unset variables leave the loaded value alone; a set-but-unparseable value
/// is a startup failure, not a silent fallback.
pub fn apply_env_overrides(config: &mut CrawlerConfig) -> Result<(), ConfigError> {
    override_parsed("CRAWLER_TIMEOUT", &mut config.crawler.timeout)?;
    if let Ok(value) = env::var("CRAWLER_USER_AGENT") {
        debug!(var = "CRAWLER_USER_AGENT", "override from environment");
        config.crawler.user_agent = value;
    }
    override_parsed("DETECTION_MIN_CONFIDENCE", &mut config.detection.min_confidence)?;
    override_parsed("DETECTION_MIN_NOTICES", &mut config.detection.min_notices)?;
    override_parsed(
        "DETECTION_MIN_TITLE_LENGTH",
        &mut config.detection.min_title_length,
    )?;
    override_parsed(
        "DETECTION_MAX_TITLE_LENGTH",
        &mut config.detection.max_title_length,
    )?;
    override_parsed(
        "DETECTION_SIMILARITY_THRESHOLD",
        &mut config.detection.similarity_threshold,
    )?;
    override_parsed(
        "VALIDATION_MAX_NOTICES",
        &mut config.validation.max_notices_per_university,
    )?;
    override_bool("FALLBACK_USE_BROWSER", &mut config.fallback.use_browser)?;
    override_parsed("BROWSER_TIMEOUT", &mut config.browser.timeout)?;
    Ok(())
}

fn override_parsed<T: FromStr>(var: &str, slot: &mut T) -> Result<(), ConfigError>
where
    T::Err: std::fmt::Display,
{
    if let Ok(raw) = env::var(var) {
        let value = raw.parse().map_err(|e| ConfigError::Field {
            field: var.to_string(),
            reason: format!("{raw:?}: {e}"),
        })?;
        debug!(var, value = %raw, "override from environment");
        *slot = value;
    }
    Ok(())
}

fn override_bool(var: &str, slot: &mut bool) -> Result<(), ConfigError> {
    if let Ok(raw) = env::var(var) {
        *slot = match raw.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            other => {
                return Err(ConfigError::Field {
                    field: var.to_string(),
                    reason: format!("invalid boolean: {other:?}"),
                })
            }
        };
        debug!(var, value = %raw, "override from environment");
    }
    Ok(())
}
