use chrono::{DateTime, Utc};
use shared::domain::{Category, Listing};

/// Listings untouched for longer than this are stale.
pub const STALE_AFTER_DAYS: i64 = 180;

/// Age reported for listings that carry no update timestamp.
pub const UNDATED_AGE_DAYS: i64 = 9999;

/// Classifies a listing as of `now`. First matching rule wins:
/// placeholder, missing price, reduced price, staleness.
pub fn classify(listing: &Listing, now: DateTime<Utc>) -> Category {
    if listing.is_placeholder {
        return Category::Placeholder;
    }

    let price = match listing.price {
        Some(price) if price != 0.0 => price,
        _ => return Category::NoPrice,
    };

    let reference_price = listing.reference_price.unwrap_or(price);
    if price < reference_price {
        return Category::PriceReduced;
    }

    if days_since(listing.last_updated, now) > STALE_AFTER_DAYS {
        return Category::Stale;
    }

    Category::Normal
}

/// Whole days elapsed since `timestamp`, floored.
pub fn days_since(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match timestamp {
        Some(timestamp) => (now - timestamp).num_days(),
        None => UNDATED_AGE_DAYS,
    }
}

#[cfg(test)]
#[path = "tests/classify_tests.rs"]
mod tests;
