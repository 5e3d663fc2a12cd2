//! Deduplication and CSV output

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::models::Listing;

/// What [`persist_listings`] ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Nothing was collected, no file touched
    Skipped,
    /// Deduplicated listings written to the target
    Saved { path: PathBuf, rows: usize, removed: usize },
    /// Target write failed, raw listings written next to it
    FellBack { path: PathBuf, rows: usize },
    /// Neither write succeeded
    Failed,
}

/// Drop listings whose (Title, Address) was already seen, keeping the first
pub fn dedup_listings(listings: &[Listing]) -> Vec<Listing> {
    let mut seen = HashSet::new();
    listings
        .iter()
        .filter(|listing| seen.insert(listing.dedup_key()))
        .cloned()
        .collect()
}

/// Write listings to `path` with a header row, replacing any existing file
pub fn write_csv(listings: &[Listing], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    for listing in listings {
        wtr.serialize(listing)?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush '{}'", path.display()))?;
    Ok(())
}

/// `booking_listings.csv` -> `booking_listings_raw.csv`
pub fn raw_fallback_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "listings".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}_raw.{}", stem, ext.to_string_lossy()),
        None => format!("{}_raw", stem),
    };
    path.with_file_name(name)
}

/// Deduplicate the raw collection and save it.
///
/// Never fails: problems are logged and, if the deduplicated write fails,
/// the raw collection is written to [`raw_fallback_path`] instead.
pub fn persist_listings(raw: &[Listing], path: &Path) -> PersistOutcome {
    if raw.is_empty() {
        info!("No listings were collected, nothing to save");
        return PersistOutcome::Skipped;
    }

    info!("Deduplicating {} listings...", raw.len());
    let deduped = dedup_listings(raw);
    let removed = raw.len() - deduped.len();
    info!("Removed {} duplicate listings based on Title and Address", removed);

    match write_csv(&deduped, path) {
        Ok(()) => {
            info!(
                "Data saved to {} with {} total listings",
                path.display(),
                deduped.len()
            );
            PersistOutcome::Saved {
                path: path.to_path_buf(),
                rows: deduped.len(),
                removed,
            }
        }
        Err(e) => {
            error!("Error during deduplication or saving: {:#}", e);
            let fallback = raw_fallback_path(path);
            warn!("Saving raw (non-deduplicated) data to {}", fallback.display());
            match write_csv(raw, &fallback) {
                Ok(()) => PersistOutcome::FellBack {
                    path: fallback,
                    rows: raw.len(),
                },
                Err(e) => {
                    error!("Fallback write failed: {:#}", e);
                    PersistOutcome::Failed
                }
            }
        }
    }
}
