use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::ListingRecord;

/// Unique identifier of a listing across the whole dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reference(pub String);

impl Reference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display category derived from a listing's raw fields. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Placeholder,
    NoPrice,
    PriceReduced,
    Stale,
    Normal,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Placeholder => "placeholder",
            Category::NoPrice => "no-price",
            Category::PriceReduced => "price-reduced",
            Category::Stale => "stale",
            Category::Normal => "normal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One advertised property banner, normalized from its wire record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub reference: Reference,
    pub branch: String,
    pub price: Option<f64>,
    pub reference_price: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub is_placeholder: bool,
    pub locality: String,
}

impl Listing {
    /// Builds a listing from a wire record. A missing or blank branch falls
    /// back to `fallback_branch`.
    pub fn from_record(record: ListingRecord, fallback_branch: &str) -> Self {
        let branch = record
            .agenzia
            .filter(|branch| !branch.trim().is_empty())
            .unwrap_or_else(|| fallback_branch.to_string());

        Self {
            reference: Reference(record.rif),
            branch,
            price: record.prezzo,
            reference_price: record.prezzo_myagency,
            last_updated: record.timestamp.as_deref().and_then(parse_timestamp),
            is_placeholder: record.segnaposto,
            locality: record.comune.unwrap_or_default(),
        }
    }

    /// Price offered as the starting value when proposing a reduction.
    pub fn current_price(&self) -> f64 {
        self.price
            .filter(|price| *price != 0.0)
            .or(self.reference_price)
            .unwrap_or(0.0)
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
