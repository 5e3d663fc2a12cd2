pub mod booking;
pub mod browser;
pub mod card;
pub mod pacing;
pub mod pagination;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use booking::BookingScraper;
pub use browser::ChromeSession;
pub use traits::{BrowserSession, ClickError};
