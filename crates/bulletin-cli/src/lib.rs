//! # Bulletin CLI
//!
//! The batch driver: load configuration and a university list, crawl every
//! board through the extraction engine, persist new notices through the
//! store interface, and write a JSON run report. Everything engine-shaped
//! lives in the library crates; this one only wires them together.

pub mod report;
pub mod store;
pub mod universities;

pub use report::{RunReport, SiteOutcome, Totals};
pub use store::{JsonFileStore, NoticeStore};
pub use universities::{load_universities, University};
