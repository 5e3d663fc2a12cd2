//! Scraper and API configuration

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::PriceBracket;

/// Default output file shared by the scraper and the API
pub const DEFAULT_CSV_PATH: &str = "booking_listings.csv";

/// Environment variable naming an optional TOML file for the scraper
pub const CONFIG_ENV: &str = "STAY_SCOUT_CONFIG";

/// Randomized pause ranges in milliseconds, used to throttle the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// After navigating to a search page
    pub after_navigate: (u64, u64),
    /// After scrolling, before waiting on or clicking the button
    pub short: (u64, u64),
    /// After a successful "load more" click
    pub after_click: (u64, u64),
    /// After an intercepted click
    pub after_intercept: (u64, u64),
    /// After the expansion loop, before reading cards
    pub settle: (u64, u64),
    /// After every search unit and every region
    pub between_searches: (u64, u64),
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            after_navigate: (1000, 3000),
            short: (500, 1000),
            after_click: (2000, 3000),
            after_intercept: (1500, 2500),
            settle: (1000, 2000),
            between_searches: (500, 1000),
        }
    }
}

impl Pacing {
    /// No pauses at all
    pub fn none() -> Self {
        Self {
            after_navigate: (0, 0),
            short: (0, 0),
            after_click: (0, 0),
            after_intercept: (0, 0),
            settle: (0, 0),
            between_searches: (0, 0),
        }
    }
}

/// Everything the scraping run needs to know
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Search results page, without query string
    pub base_url: String,
    /// Regions searched, in order
    pub regions: Vec<String>,
    /// Price brackets searched for every region, in order
    pub price_brackets: Vec<PriceBracket>,
    /// Currency code used in the price filter
    pub currency: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub adults: u32,
    pub rooms: u32,
    pub children: u32,
    /// Upper bound on "load more" iterations per search unit
    pub max_load_more_attempts: usize,
    /// Seconds to wait for the "load more" button
    pub wait_timeout_secs: u64,
    /// Concurrent card extraction tasks
    pub max_workers: usize,
    /// Where the deduplicated listings are written
    pub output_path: PathBuf,
    /// Run Chrome without a window
    pub headless: bool,
    pub pacing: Pacing,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.booking.com/searchresults.en-gb.html".to_string(),
            regions: [
                "New South Wales, Australia",
                "Queensland, Australia",
                "Victoria, Australia",
                "South Australia, Australia",
                "Western Australia, Australia",
                "Northern Territory, Australia",
                "Australian Capital Territory, Australia",
                "Tasmania, Australia",
            ]
            .iter()
            .map(|r| r.to_string())
            .collect(),
            // booking.com caps a single query at roughly 1000 results, so
            // each region is split into disjoint price segments
            price_brackets: vec![
                PriceBracket::new(None, Some(175)),
                PriceBracket::new(Some(176), Some(225)),
                PriceBracket::new(Some(226), Some(325)),
                PriceBracket::new(Some(326), None),
            ],
            currency: "AUD".to_string(),
            checkin: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap_or_default(),
            checkout: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap_or_default(),
            adults: 2,
            rooms: 1,
            children: 0,
            max_load_more_attempts: 40,
            wait_timeout_secs: 20,
            max_workers: 30,
            output_path: PathBuf::from(DEFAULT_CSV_PATH),
            headless: true,
            pacing: Pacing::default(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: ScraperConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `STAY_SCOUT_CONFIG` if set, defaults otherwise
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Validate all fields, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.regions.is_empty() {
            errors.push("at least one region is required".to_string());
        }
        if self.checkout <= self.checkin {
            errors.push("checkout must be after checkin".to_string());
        }
        if self.max_workers == 0 {
            errors.push("max_workers must be positive".to_string());
        }
        if self.rooms == 0 || self.adults == 0 {
            errors.push("adults and rooms must be positive".to_string());
        }
        for bracket in &self.price_brackets {
            if let (Some(min), Some(max)) = (bracket.min, bracket.max) {
                if min > max {
                    errors.push(format!("price bracket {}-{} is inverted", min, max));
                }
            }
        }
        let pacing = &self.pacing;
        for (name, (lo, hi)) in [
            ("after_navigate", pacing.after_navigate),
            ("short", pacing.short),
            ("after_click", pacing.after_click),
            ("after_intercept", pacing.after_intercept),
            ("settle", pacing.settle),
            ("between_searches", pacing.between_searches),
        ] {
            if lo > hi {
                errors.push(format!("pacing.{} range is inverted", name));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Invalid configuration:\n  - {}", errors.join("\n  - "))
        }
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    /// Number of search units the run will perform
    pub fn search_count(&self) -> usize {
        self.regions.len() * self.price_brackets.len().max(1)
    }
}

/// Query service settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub csv_path: PathBuf,
    pub listen_addr: SocketAddr,
    /// Maximum rows returned by `/cheapest_listings`
    pub limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            limit: 50,
        }
    }
}

impl ApiConfig {
    /// Defaults, overridden by `LISTINGS_CSV` and `LISTINGS_API_ADDR`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os("LISTINGS_CSV") {
            config.csv_path = PathBuf::from(path);
        }
        if let Ok(addr) = std::env::var("LISTINGS_API_ADDR") {
            config.listen_addr = addr
                .parse()
                .with_context(|| format!("Invalid LISTINGS_API_ADDR '{}'", addr))?;
        }
        Ok(config)
    }
}
