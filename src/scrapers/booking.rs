use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::card::extract_listing;
use super::pacing::human_sleep;
use super::pagination::{expand_results, Expansion};
use super::traits::BrowserSession;
use super::types::SearchParams;
use crate::config::ScraperConfig;
use crate::models::{Listing, SearchUnit};

/// Every rendered search result
pub const CARD_SELECTOR: &str = "[data-testid='property-card']";

/// Drives the region × price bracket scrape of booking.com search results
pub struct BookingScraper {
    config: ScraperConfig,
}

impl BookingScraper {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// All search units, region-major
    pub fn search_units(&self) -> Vec<SearchUnit> {
        let brackets: Vec<_> = if self.config.price_brackets.is_empty() {
            vec![None]
        } else {
            self.config.price_brackets.iter().copied().map(Some).collect()
        };

        self.config
            .regions
            .iter()
            .flat_map(|region| {
                brackets.iter().map(move |bracket| SearchUnit {
                    region: region.clone(),
                    bracket: *bracket,
                })
            })
            .collect()
    }

    /// Run every search unit and return the raw (possibly duplicated) listings.
    ///
    /// A failing unit is logged and skipped; whatever was collected is always returned.
    pub async fn scrape<S>(&self, session: &S) -> Vec<Listing>
    where
        S: BrowserSession + ?Sized,
    {
        let total = self.config.search_count();
        let per_region = self.config.price_brackets.len().max(1);
        let mut raw = Vec::new();

        for (n, unit) in self.search_units().into_iter().enumerate() {
            info!(
                ">>> Starting search {}/{} (region {}/{}, price range {}/{})",
                n + 1,
                total,
                n / per_region + 1,
                self.config.regions.len(),
                n % per_region + 1,
                per_region
            );

            match self.scrape_unit(session, &unit).await {
                Ok(listings) => raw.extend(listings),
                Err(e) => error!("Search for {} failed: {:#}", unit, e),
            }
            human_sleep(self.config.pacing.between_searches).await;

            if (n + 1) % per_region == 0 {
                info!("--- Finished all price ranges for region: {} ---", unit.region);
                human_sleep(self.config.pacing.between_searches).await;
            }
        }

        info!("Collected {} raw listings (including duplicates)", raw.len());
        raw
    }

    /// Load one search page as far as it goes and extract every card on it
    pub async fn scrape_unit<S>(&self, session: &S, unit: &SearchUnit) -> Result<Vec<Listing>>
    where
        S: BrowserSession + ?Sized,
    {
        info!("--- Scraping {} ---", unit);

        let url = SearchParams::for_unit(unit, &self.config).to_url(&self.config.base_url);
        info!("Navigating to {}", url);
        session.navigate(&url).await?;
        human_sleep(self.config.pacing.after_navigate).await;

        let expansion = Expansion {
            max_attempts: self.config.max_load_more_attempts,
            wait_timeout: self.config.wait_timeout(),
            pacing: &self.config.pacing,
        };
        let report = expand_results(session, &expansion).await;
        info!(
            "Expansion finished after {} clicks ({:?})",
            report.clicks, report.stop
        );
        human_sleep(self.config.pacing.settle).await;

        let cards = session
            .query_all(CARD_SELECTOR)
            .await
            .context("Failed to query property cards")?;
        info!("Found {} property cards for {}", cards.len(), unit);
        if cards.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let listings = extract_cards(cards, self.config.max_workers).await?;
        info!(
            "Processed {} listings in {:.2}s",
            listings.len(),
            started.elapsed().as_secs_f64()
        );

        Ok(listings)
    }
}

/// Extract every card with at most `max_workers` running at once.
///
/// Results come back in card order. A card whose worker dies yields
/// [`Listing::unavailable`].
pub async fn extract_cards(cards: Vec<String>, max_workers: usize) -> Result<Vec<Listing>> {
    extract_cards_with(cards, max_workers, extract_listing).await
}

/// [`extract_cards`] with a custom per-card extractor
pub async fn extract_cards_with<F>(
    cards: Vec<String>,
    max_workers: usize,
    extract: F,
) -> Result<Vec<Listing>>
where
    F: Fn(&str) -> Listing + Send + Sync + 'static,
{
    let extract = Arc::new(extract);
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut join_set = JoinSet::new();
    let mut slots: Vec<Option<Listing>> = vec![None; cards.len()];

    for (idx, html) in cards.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .context("Card worker pool closed")?;
        let extract = Arc::clone(&extract);
        join_set.spawn(async move {
            let _permit = permit;
            (idx, extract(&html))
        });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((idx, listing)) => slots[idx] = Some(listing),
            Err(e) => warn!("Card extraction task failed: {}", e),
        }
    }

    Ok(slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(Listing::unavailable))
        .collect())
}
