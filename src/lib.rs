//! Booking.com listing scraper and the cheapest-listings API that serves its output.

pub mod api;
pub mod config;
pub mod models;
pub mod persist;
pub mod scrapers;
