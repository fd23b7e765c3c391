//! The shared headless Chrome process.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use bulletin_config::BrowserSettings;
use bulletin_extraction::DomRenderer;
use bulletin_types::CrawlError;

struct BrowserHandle {
    browser: Browser,
    event_loop: JoinHandle<()>,
}

/// One headless Chrome, launched lazily and shared by all crawls.
///
/// The mutex serializes renders against the single browser process. A
/// failed render tears the process down so the next call relaunches from a
/// clean slate rather than reusing a wedged Chrome.
pub struct HeadlessBrowser {
    settings: BrowserSettings,
    handle: Mutex<Option<BrowserHandle>>,
}

impl HeadlessBrowser {
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            handle: Mutex::new(None),
        }
    }

    /// Navigate to a URL and return the DOM serialized after scripts ran.
    pub async fn render_page(&self, url: &str) -> Result<String, CrawlError> {
        let mut slot = self.handle.lock().await;

        let handle = match slot.take() {
            Some(handle) => handle,
            None => self.launch().await?,
        };

        let result = timeout(
            Duration::from_secs(self.settings.timeout),
            self.snapshot(&handle.browser, url),
        )
        .await
        .unwrap_or_else(|_| {
            Err(CrawlError::browser(format!(
                "render timed out after {}s for {url}",
                self.settings.timeout
            )))
        });

        if result.is_ok() {
            *slot = Some(handle);
        } else {
            // Chrome may be wedged; drop it so the next render relaunches.
            teardown(handle).await;
        }

        result
    }

    /// Shut the browser process down, if one is running.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.handle.lock().await.take() {
            teardown(handle).await;
            info!("headless browser shut down");
        }
    }

    async fn launch(&self) -> Result<BrowserHandle, CrawlError> {
        let mut builder = BrowserConfig::builder();
        for flag in &self.settings.chrome_flags {
            builder = builder.arg(flag);
        }
        let config = builder
            .build()
            .map_err(|e| CrawlError::browser(format!("browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CrawlError::browser(format!("launch failed: {e}")))?;

        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!("headless browser launched");
        Ok(BrowserHandle {
            browser,
            event_loop,
        })
    }

    async fn snapshot(&self, browser: &Browser, url: &str) -> Result<String, CrawlError> {
        let page = browser
            .new_page(url)
            .await
            .map_err(|e| CrawlError::browser(format!("navigation failed: {e}")))?;

        let html = self.page_content(&page).await;

        // The page is closed whether or not the snapshot worked.
        if let Err(e) = page.close().await {
            debug!(error = %e, "page close failed");
        }

        html
    }

    async fn page_content(&self, page: &Page) -> Result<String, CrawlError> {
        if let Err(e) = page.wait_for_navigation().await {
            return Err(CrawlError::browser(format!("navigation failed: {e}")));
        }

        // Give scripted boards a moment to populate their rows.
        tokio::time::sleep(Duration::from_millis(self.settings.render_wait_ms)).await;

        let html = page
            .content()
            .await
            .map_err(|e| CrawlError::browser(format!("content failed: {e}")))?;
        debug!(chars = html.len(), "rendered DOM captured");
        Ok(html)
    }
}

async fn teardown(mut handle: BrowserHandle) {
    if let Err(e) = handle.browser.close().await {
        warn!(error = %e, "browser close failed");
    }
    handle.event_loop.abort();
}

impl Drop for HeadlessBrowser {
    fn drop(&mut self) {
        // Best effort: stop the event loop; the process itself exits with
        // its CDP connection.
        if let Ok(mut slot) = self.handle.try_lock() {
            if let Some(handle) = slot.take() {
                handle.event_loop.abort();
            }
        }
    }
}

#[async_trait]
impl DomRenderer for HeadlessBrowser {
    async fn render(&self, url: &str) -> Result<String, CrawlError> {
        self.render_page(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_without_launching_chrome() {
        let browser = HeadlessBrowser::new(BrowserSettings::default());
        assert!(browser.handle.lock().await.is_none());

        // Rendering would require a Chrome binary in the environment:
        // let html = browser.render_page("about:blank").await.unwrap();

        browser.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let browser = HeadlessBrowser::new(BrowserSettings::default());
        browser.shutdown().await;
        browser.shutdown().await;
    }
}
