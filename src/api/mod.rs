//! Query service over the scraped listings file

pub mod handlers;
pub mod query;
pub mod server;
pub mod store;

pub use server::{create_router, run};
pub use store::{StoreError, Table};
