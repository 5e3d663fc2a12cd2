use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::browser::tab::element::Element;
use headless_chrome::util::{Timeout, Wait};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::traits::{BrowserSession, ClickError};

/// Classifies a button as `hidden`, `disabled`, `covered` or `ready`
const BUTTON_STATE_JS: &str = r#"function() {
    const r = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    if (r.width === 0 || r.height === 0 || style.visibility === "hidden" || style.display === "none") {
        return "hidden";
    }
    if (this.disabled || this.getAttribute("aria-disabled") === "true") {
        return "disabled";
    }
    const hit = document.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2);
    return hit !== null && this.contains(hit) ? "ready" : "covered";
}"#;

/// What the page reports about the "load more" button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Hidden,
    Disabled,
    Covered,
    Ready,
}

impl ButtonState {
    pub fn from_js(value: &str) -> Option<Self> {
        match value {
            "hidden" => Some(Self::Hidden),
            "disabled" => Some(Self::Disabled),
            "covered" => Some(Self::Covered),
            "ready" => Some(Self::Ready),
            _ => None,
        }
    }

    /// Visible and enabled, whether or not something is on top of it
    pub fn is_interactable(self) -> bool {
        matches!(self, Self::Covered | Self::Ready)
    }
}

/// Whether to click, given the button's state right before the click
pub fn click_decision(state: Option<ButtonState>) -> Result<(), ClickError> {
    match state {
        Some(ButtonState::Ready) => Ok(()),
        Some(ButtonState::Covered) => Err(ClickError::Intercepted),
        Some(ButtonState::Hidden | ButtonState::Disabled) | None => Err(ClickError::NotFound),
    }
}

fn button_state(element: &Element<'_>) -> Option<ButtonState> {
    let result = element.call_js_fn(BUTTON_STATE_JS, vec![], false).ok()?;
    result
        .value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(ButtonState::from_js)
}

/// Headless Chrome implementation of [`BrowserSession`].
///
/// `headless_chrome` is blocking, so every call is moved onto the blocking
/// thread pool with its own handle to the tab.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// Launch Chrome and open the tab used for the whole run
    pub fn launch(headless: bool) -> Result<Self> {
        info!("Launching Chrome (headless: {})...", headless);

        let options = LaunchOptions::default_builder()
            .headless(headless)
            .window_size(Some((1920, 1080)))
            .idle_browser_timeout(Duration::from_secs(300))
            .args(vec![OsStr::new("--disable-blink-features=AutomationControlled")])
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> Result<T> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || op(&tab))
            .await
            .context("Browser task panicked")?
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Timeout>().is_some() || err.downcast_ref::<NoElementFound>().is_some()
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        let url = url.to_string();
        self.blocking(move |tab| {
            tab.navigate_to(&url)?.wait_until_navigated()?;
            Ok(())
        })
        .await
        .context("Navigation failed")
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.blocking(|tab| {
            tab.evaluate("window.scrollTo(0, document.body.scrollHeight);", false)?;
            Ok(())
        })
        .await
    }

    async fn scroll_by(&self, pixels: i64) -> Result<()> {
        self.blocking(move |tab| {
            tab.evaluate(&format!("window.scrollBy(0, {});", pixels), false)?;
            Ok(())
        })
        .await
    }

    async fn wait_and_click(
        &self,
        xpath: &str,
        timeout: Duration,
        settle: Duration,
    ) -> Result<(), ClickError> {
        let xpath = xpath.to_string();
        let tab = Arc::clone(&self.tab);

        let outcome = tokio::task::spawn_blocking(move || -> Result<(), ClickError> {
            let started = Instant::now();
            let element = match tab.wait_for_xpath_with_custom_timeout(&xpath, timeout) {
                Ok(element) => element,
                Err(e) if is_not_found(&e) => return Err(ClickError::NotFound),
                Err(e) => return Err(ClickError::Other(e)),
            };

            // Present is not enough: wait out the rest of the timeout for it to become usable
            let remaining = timeout.saturating_sub(started.elapsed());
            let waited = Wait::with_timeout(remaining).until(|| {
                button_state(&element).filter(|state| state.is_interactable())
            });
            if waited.is_err() {
                return Err(ClickError::NotFound);
            }

            element.scroll_into_view().map_err(ClickError::Other)?;
            std::thread::sleep(settle);

            click_decision(button_state(&element))?;
            element.click().map_err(ClickError::Other)?;
            Ok(())
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(e) => Err(ClickError::Other(anyhow::Error::new(e).context("Browser task panicked"))),
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<String>> {
        let script = format!(
            "JSON.stringify(Array.from(document.querySelectorAll({})).map(e => e.outerHTML))",
            serde_json::to_string(selector)?
        );

        let raw = self
            .blocking(move |tab| {
                let result = tab.evaluate(&script, false)?;
                Ok(result
                    .value
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_else(|| "[]".to_string()))
            })
            .await?;

        let cards: Vec<String> =
            serde_json::from_str(&raw).context("Card query returned malformed JSON")?;
        debug!("Query '{}' matched {} elements", selector, cards.len());
        Ok(cards)
    }

    async fn close(&self) -> Result<()> {
        info!("Closing the browser...");
        self.blocking(|tab| {
            tab.close(true)?;
            Ok(())
        })
        .await
    }
}
