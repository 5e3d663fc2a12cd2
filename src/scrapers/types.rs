use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ScraperConfig;
use crate::models::{PriceBracket, SearchUnit};

/// Search parameters for one results page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text destination, e.g. "Queensland, Australia"
    pub location: String,
    pub bracket: Option<PriceBracket>,
    pub currency: String,
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
    pub adults: u32,
    pub rooms: u32,
    pub children: u32,
}

impl SearchParams {
    pub fn for_unit(unit: &SearchUnit, config: &ScraperConfig) -> Self {
        Self {
            location: unit.region.clone(),
            bracket: unit.bracket,
            currency: config.currency.clone(),
            checkin: config.checkin,
            checkout: config.checkout,
            adults: config.adults,
            rooms: config.rooms,
            children: config.children,
        }
    }

    /// Full results URL, cheapest first
    pub fn to_url(&self, base_url: &str) -> String {
        let checkin = self.checkin.format("%Y-%m-%d").to_string();
        let checkout = self.checkout.format("%Y-%m-%d").to_string();
        let adults = self.adults.to_string();
        let rooms = self.rooms.to_string();
        let children = self.children.to_string();

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("ss", &self.location)
            .append_pair("lang", "en-gb")
            .append_pair("sb", "1")
            .append_pair("src_elem", "sb")
            .append_pair("dest_id", "")
            .append_pair("dest_type", "")
            .append_pair("checkin", &checkin)
            .append_pair("checkout", &checkout)
            .append_pair("group_adults", &adults)
            .append_pair("no_rooms", &rooms)
            .append_pair("group_children", &children)
            .append_pair("order", "price");

        if let Some(filter) = self.bracket.and_then(|b| b.filter_token(&self.currency)) {
            query.append_pair("nflt", &filter);
        }

        format!("{}?{}", base_url, query.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(bracket: Option<PriceBracket>) -> SearchParams {
        let unit = SearchUnit {
            region: "New South Wales, Australia".to_string(),
            bracket,
        };
        SearchParams::for_unit(&unit, &ScraperConfig::default())
    }

    const BASE: &str = "https://www.booking.com/searchresults.en-gb.html";

    #[test]
    fn url_without_bracket() {
        assert_eq!(
            params(None).to_url(BASE),
            "https://www.booking.com/searchresults.en-gb.html?ss=New+South+Wales%2C+Australia\
             &lang=en-gb&sb=1&src_elem=sb&dest_id=&dest_type=&checkin=2026-02-01\
             &checkout=2026-02-02&group_adults=2&no_rooms=1&group_children=0&order=price"
        );
    }

    #[test]
    fn url_filter_per_bracket_shape() {
        let max_only = params(Some(PriceBracket::new(None, Some(175)))).to_url(BASE);
        assert!(max_only.ends_with("&order=price&nflt=price%3DAUD-min-175-1"));

        let min_only = params(Some(PriceBracket::new(Some(326), None))).to_url(BASE);
        assert!(min_only.ends_with("&nflt=price%3DAUD-326-max-1"));

        let both = params(Some(PriceBracket::new(Some(176), Some(225)))).to_url(BASE);
        assert!(both.ends_with("&nflt=price%3DAUD-176-225-1"));

        let open = params(Some(PriceBracket::default())).to_url(BASE);
        assert!(!open.contains("nflt"));
    }
}
