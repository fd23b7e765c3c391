//! # Bulletin Fetch
//!
//! The shared HTTP layer: one reused `reqwest::Client` with a configurable
//! User-Agent and timeout, plus charset detection for the many university
//! boards still serving EUC-KR. There are no retries here: a failed fetch
//! simply moves the cascade to its next strategy, and retry policy belongs
//! to the batch driver.

mod charset;
mod client;

pub use charset::decode_body;
pub use client::FetchClient;
