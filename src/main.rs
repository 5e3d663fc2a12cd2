use std::time::Instant;
use stay_scout::config::ScraperConfig;
use stay_scout::persist::persist_listings;
use stay_scout::scrapers::{BookingScraper, BrowserSession, ChromeSession};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏨 Stay Scout - booking.com listing scraper");

    let config = ScraperConfig::from_env()?;
    config.validate()?;
    let output_path = config.output_path.clone();
    info!(
        "Searching {} regions x {} price ranges",
        config.regions.len(),
        config.price_brackets.len()
    );

    let started = Instant::now();
    let session = ChromeSession::launch(config.headless)?;
    let scraper = BookingScraper::new(config);

    let raw = scraper.scrape(&session).await;

    if let Err(e) = session.close().await {
        error!("Failed to close the browser: {:#}", e);
    }

    info!(
        "Scraping finished in {:.2}s, collected {} raw listings",
        started.elapsed().as_secs_f64(),
        raw.len()
    );

    let outcome = persist_listings(&raw, &output_path);
    info!("💾 {:?}", outcome);

    Ok(())
}
