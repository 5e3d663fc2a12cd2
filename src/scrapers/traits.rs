use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a wait-and-click did not go through
#[derive(Debug, Error)]
pub enum ClickError {
    /// Element never showed up within the timeout
    #[error("element not found or not clickable in time")]
    NotFound,
    /// Something else is covering the element
    #[error("click was intercepted by another element")]
    Intercepted,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The browser capabilities the scraper relies on.
///
/// A session is stateful: `navigate` changes the current page and
/// `query_all` reads whatever that page currently renders.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load a URL and wait for navigation to finish
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Scroll to the very bottom of the current page
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Scroll vertically by `pixels`
    async fn scroll_by(&self, pixels: i64) -> Result<()>;

    /// Wait up to `timeout` for the element at `xpath` to become clickable,
    /// scroll it into view, pause for `settle` and click it
    async fn wait_and_click(
        &self,
        xpath: &str,
        timeout: Duration,
        settle: Duration,
    ) -> Result<(), ClickError>;

    /// Outer HTML of every element matching the CSS `selector`
    async fn query_all(&self, selector: &str) -> Result<Vec<String>>;

    /// Tear the session down
    async fn close(&self) -> Result<()>;
}
