//! The shared HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use bulletin_config::FetchSettings;
use bulletin_types::{ConfigError, CrawlError};

use crate::charset::decode_body;

/// Reused HTTP client for board fetches.
///
/// `reqwest::Client` holds the connection pool behind an `Arc`, so this
/// type is cheap to clone and safe to share across concurrent extractions.
/// No per-call state lives here.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    /// Build the client from fetch settings. Fails only at startup.
    pub fn new(settings: &FetchSettings) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .gzip(true)
            .brotli(true)
            .connect_timeout(Duration::from_secs(3))
            .timeout(Duration::from_secs(settings.timeout))
            .build()
            .map_err(|e| ConfigError::Invalid {
                reason: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// Fetch a page and decode it to text.
    ///
    /// Non-2xx responses are fetch failures; the charset comes from the
    /// Content-Type header when present and is sniffed from the body
    /// otherwise.
    pub async fn fetch_html(&self, url: &str) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "non-success response");
            return Err(CrawlError::fetch(format!("HTTP {status} for {url}")));
        }

        let header_charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_charset_param);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CrawlError::fetch(e.to_string()))?;

        let html = decode_body(&bytes, header_charset.as_deref());
        debug!(url, bytes = bytes.len(), chars = html.len(), "page fetched");
        Ok(html)
    }
}

/// Pull the charset parameter out of a Content-Type value.
fn extract_charset_param(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .map(str::trim)
        .find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches('"').to_string())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_param_extraction() {
        assert_eq!(
            extract_charset_param("text/html; charset=EUC-KR"),
            Some("EUC-KR".to_string())
        );
        assert_eq!(
            extract_charset_param("text/html; boundary=x; charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(extract_charset_param("text/html"), None);
    }
}
