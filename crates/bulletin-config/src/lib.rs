//! # Bulletin Config
//!
//! Configuration for the bulletin crawler: typed settings sections with
//! serde defaults, JSON file loading, environment-variable overrides, and
//! the compiled date-pattern set shared by the detector and the selector
//! executor.
//!
//! Loading order: built-in defaults → JSON file (when present) → environment
//! overrides. Validation happens once, at startup; a bad value is the only
//! fault in the system allowed to abort the process.

mod env;
mod patterns;
mod settings;

pub use env::apply_env_overrides;
pub use patterns::CompiledPatterns;
pub use settings::{
    BrowserSettings, CrawlerConfig, DetectionSettings, FallbackSettings, FetchSettings,
    PatternSettings, ValidationSettings,
};
