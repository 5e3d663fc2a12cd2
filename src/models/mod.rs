use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for any field that could not be extracted from a card
pub const SENTINEL: &str = "N/A";

/// Column holding the nightly cost, shared by the scraper and the API
pub const COST_COLUMN: &str = "Cost (AUD)";

/// One hotel listing as scraped from a search results card.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Headline Room Type")]
    pub headline_room_type: String,
    #[serde(rename = "Cost (AUD)")]
    pub cost: String,
    #[serde(rename = "Review Score")]
    pub review_score: String,
    #[serde(rename = "# of Reviews")]
    pub num_reviews: String,
}

impl Listing {
    /// Record with every field set to the sentinel
    pub fn unavailable() -> Self {
        Self {
            title: SENTINEL.to_string(),
            address: SENTINEL.to_string(),
            headline_room_type: SENTINEL.to_string(),
            cost: SENTINEL.to_string(),
            review_score: SENTINEL.to_string(),
            num_reviews: SENTINEL.to_string(),
        }
    }

    /// Composite key used for deduplication
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.title, &self.address)
    }
}

/// Nightly price range used to split a region search into segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceBracket {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl PriceBracket {
    pub fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Value of the `nflt` filter parameter, or `None` for an open bracket
    pub fn filter_token(&self, currency: &str) -> Option<String> {
        match (self.min, self.max) {
            (None, None) => None,
            (None, Some(max)) => Some(format!("price={}-min-{}-1", currency, max)),
            (Some(min), None) => Some(format!("price={}-{}-max-1", currency, min)),
            (Some(min), Some(max)) => Some(format!("price={}-{}-{}-1", currency, min, max)),
        }
    }
}

impl fmt::Display for PriceBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (None, None) => write!(f, "no price filter"),
            (None, Some(max)) => write!(f, "up to {}", max),
            (Some(min), None) => write!(f, "{}+", min),
            (Some(min), Some(max)) => write!(f, "{}-{}", min, max),
        }
    }
}

/// A single (region, price bracket) search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchUnit {
    pub region: String,
    pub bracket: Option<PriceBracket>,
}

impl fmt::Display for SearchUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bracket {
            Some(bracket) => write!(f, "{} ({})", self.region, bracket),
            None => write!(f, "{} (no price filter)", self.region),
        }
    }
}
