//! # Bulletin Headless
//!
//! Rendered-DOM snapshots for JavaScript-populated boards. The adapter
//! drives a headless Chrome over CDP, navigates, lets scripts settle, and
//! hands the serialized DOM back to the extraction engine through its
//! [`DomRenderer`] seam. The browser process is shared, access to it is
//! serialized, and pages are released on every exit path.

mod browser;

pub use browser::HeadlessBrowser;

pub use bulletin_extraction::DomRenderer;
