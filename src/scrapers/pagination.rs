//! "Load more results" expansion for a single search page

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::pacing::{human_sleep, jitter};
use super::traits::{BrowserSession, ClickError};
use crate::config::Pacing;

/// The button booking.com shows under the last loaded result
pub const LOAD_MORE_XPATH: &str = "//button[.//span[contains(text(),'Load more results')]]";

/// Pixels scrolled to get an obstruction out of the way
const INTERCEPT_SCROLL: i64 = 300;

/// Why expansion stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The button disappeared or never became clickable: all results are loaded
    Exhausted,
    /// The attempt cap was hit
    AttemptCap,
    /// Something unexpected went wrong, the page keeps whatever it loaded
    Failed(String),
}

/// Outcome of one expansion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionReport {
    pub clicks: usize,
    pub attempts: usize,
    pub stop: StopReason,
}

/// Settings for [`expand_results`]
#[derive(Debug, Clone)]
pub struct Expansion<'a> {
    pub max_attempts: usize,
    pub wait_timeout: Duration,
    pub pacing: &'a Pacing,
}

/// Click "load more" until the results run out or `max_attempts` is reached.
///
/// Every iteration counts as an attempt, including one whose click was
/// intercepted, so the loop always terminates.
pub async fn expand_results<S>(session: &S, settings: &Expansion<'_>) -> ExpansionReport
where
    S: BrowserSession + ?Sized,
{
    let mut clicks = 0;
    let mut attempts = 0;

    while attempts < settings.max_attempts {
        attempts += 1;
        match try_load_more(session, settings).await {
            Ok(()) => {
                clicks += 1;
                info!("Clicked 'Load more results' (attempt {})", attempts);
                human_sleep(settings.pacing.after_click).await;
            }
            Err(ClickError::NotFound) => {
                info!("Load more results button not found or timed out");
                return ExpansionReport {
                    clicks,
                    attempts,
                    stop: StopReason::Exhausted,
                };
            }
            Err(ClickError::Intercepted) => {
                debug!("Load more results button was intercepted, scrolling and retrying");
                if let Err(e) = session.scroll_by(INTERCEPT_SCROLL).await {
                    debug!("Scroll after intercept failed: {:#}", e);
                }
                human_sleep(settings.pacing.after_intercept).await;
            }
            Err(ClickError::Other(e)) => {
                warn!("Unexpected error while clicking 'Load more': {:#}", e);
                return ExpansionReport {
                    clicks,
                    attempts,
                    stop: StopReason::Failed(format!("{:#}", e)),
                };
            }
        }
    }

    info!("Reached maximum load more attempts ({})", settings.max_attempts);
    ExpansionReport {
        clicks,
        attempts,
        stop: StopReason::AttemptCap,
    }
}

async fn try_load_more<S>(session: &S, settings: &Expansion<'_>) -> Result<(), ClickError>
where
    S: BrowserSession + ?Sized,
{
    session.scroll_to_bottom().await?;
    human_sleep(settings.pacing.short).await;
    session
        .wait_and_click(LOAD_MORE_XPATH, settings.wait_timeout, jitter(settings.pacing.short))
        .await
}
