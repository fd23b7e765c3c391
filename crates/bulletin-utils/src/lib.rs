//! # Bulletin Utils
//!
//! Shared normalization helpers: text cleanup, date parsing, URL handling,
//! and similarity scoring. Everything here is pure and allocation-light so
//! the extraction engine can call it per row without ceremony.

pub mod date;
pub mod relevance;
pub mod text;
pub mod urls;

pub use date::parse_date;
pub use relevance::is_notice_relevant;
pub use text::{clean_text, token_similarity};
pub use urls::{extract_domain, is_valid_url, normalize_url};
