//! Field extraction for a single search result card

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::models::{Listing, SENTINEL};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("[data-testid='title']"));
static ADDRESS: LazyLock<Selector> = LazyLock::new(|| selector("[data-testid='address']"));
static RECOMMENDED_UNIT: LazyLock<Selector> =
    LazyLock::new(|| selector("div[data-testid='recommended-units'] h4"));
static ROOM_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector("div[data-testid='availability-cta'] .room__title"));
static PRICE: LazyLock<Selector> =
    LazyLock::new(|| selector("[data-testid='price-and-discounted-price']"));
static REVIEW_SCORE: LazyLock<Selector> = LazyLock::new(|| selector("[data-testid='review-score']"));

static COST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\sA-Z]*([\d,]+(?:\.\d+)?)").unwrap());
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([\d,]+)").unwrap());
static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+\.\d+)").unwrap());
static INTEGER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

/// Run one field lookup, substituting the sentinel when it comes back empty-handed
pub fn extract_or_default<F>(lookup: F) -> String
where
    F: FnOnce() -> Option<String>,
{
    lookup().unwrap_or_else(|| SENTINEL.to_string())
}

/// Rendered text of an element, whitespace collapsed
fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector).next().map(text_of)
}

/// The `n`th (1-based) `div` child, like XPath `./div[n]`
fn nth_div_child(element: ElementRef<'_>, n: usize) -> Option<ElementRef<'_>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "div")
        .nth(n.checked_sub(1)?)
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Numeric part of a price such as `AUD 1,234.00`, thousands separators removed
pub fn parse_cost(text: &str) -> Option<String> {
    capture(&COST_RE, text)
        .or_else(|| capture(&DIGITS_RE, text))
        .map(|digits| digits.replace(',', ""))
}

/// Decimal review score, falling back to a whole number
pub fn parse_review_score(text: &str) -> Option<String> {
    capture(&DECIMAL_RE, text).or_else(|| capture(&INTEGER_RE, text))
}

/// Review count such as `1,024 reviews`
pub fn parse_review_count(text: &str) -> Option<String> {
    capture(&DIGITS_RE, text).map(|digits| digits.replace(',', ""))
}

fn headline_room_type(card: ElementRef<'_>) -> Option<String> {
    first_text(card, &RECOMMENDED_UNIT).or_else(|| {
        card.select(&ROOM_TITLE)
            .next()
            .map(|room| text_of(room).trim().to_string())
    })
}

fn review_section(card: ElementRef<'_>) -> (Option<String>, Option<String>) {
    let Some(container) = card.select(&REVIEW_SCORE).next() else {
        return (None, None);
    };

    let score = nth_div_child(container, 1)
        .map(|div| text_of(div).trim().to_string())
        .and_then(|text| parse_review_score(&text));

    let count = nth_div_child(container, 2)
        .and_then(|div| nth_div_child(div, 2))
        .map(|div| text_of(div).trim().to_string())
        .and_then(|text| parse_review_count(&text));

    (score, count)
}

/// Extract a [`Listing`] from the outer HTML of one property card.
///
/// Each field is looked up independently; a missing or unparsable field
/// becomes [`SENTINEL`] without affecting the others.
pub fn extract_listing(card_html: &str) -> Listing {
    let fragment = Html::parse_fragment(card_html);
    let card = fragment.root_element();

    let (review_score, num_reviews) = review_section(card);

    Listing {
        title: extract_or_default(|| first_text(card, &TITLE)),
        address: extract_or_default(|| first_text(card, &ADDRESS)),
        headline_room_type: extract_or_default(|| headline_room_type(card)),
        cost: extract_or_default(|| first_text(card, &PRICE).and_then(|t| parse_cost(&t))),
        review_score: extract_or_default(|| review_score),
        num_reviews: extract_or_default(|| num_reviews),
    }
}
