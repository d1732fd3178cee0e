use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::domain::{Category, Listing, Reference};

use crate::classify::classify;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryFilter {
    #[default]
    All,
    PriceReduced,
    NoPrice,
    Placeholder,
}

impl CategoryFilter {
    pub const ALL: [CategoryFilter; 4] = [
        CategoryFilter::All,
        CategoryFilter::PriceReduced,
        CategoryFilter::NoPrice,
        CategoryFilter::Placeholder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::PriceReduced => "price-reduced",
            CategoryFilter::NoPrice => "no-price",
            CategoryFilter::Placeholder => "placeholder",
        }
    }

    /// Placeholders are matched on the flag itself so the filter stays
    /// independent of classification precedence.
    pub fn matches(self, listing: &Listing, now: DateTime<Utc>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::PriceReduced => classify(listing, now) == Category::PriceReduced,
            CategoryFilter::NoPrice => classify(listing, now) == Category::NoPrice,
            CategoryFilter::Placeholder => listing.is_placeholder,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        CategoryFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str() == value)
            .ok_or_else(|| {
                format!("unknown filter '{value}', expected one of: all, price-reduced, no-price, placeholder")
            })
    }
}

/// What the user is currently looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSelection {
    pub branch: String,
    pub filter: CategoryFilter,
    /// Last reference typed into the search box, trimmed.
    pub search: String,
}

impl ViewSelection {
    pub fn for_branch(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            ..Self::default()
        }
    }
}

/// Stable subsequence of `listings` in the selected branch that pass the
/// selected category filter.
pub fn filter<'a>(
    listings: &'a [Listing],
    selection: &ViewSelection,
    now: DateTime<Utc>,
) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| listing.branch == selection.branch)
        .filter(|listing| selection.filter.matches(listing, now))
        .collect()
}

/// Exact, case-sensitive reference match.
pub fn find_by_reference<'a>(listings: &'a [Listing], reference: &Reference) -> Option<&'a Listing> {
    listings.iter().find(|listing| &listing.reference == reference)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub total: usize,
    pub price_reduced: usize,
    pub no_price: usize,
    pub stale: usize,
    pub placeholder: usize,
}

/// Totals over every listing of `branch`, ignoring the active category filter.
pub fn counts(listings: &[Listing], branch: &str, now: DateTime<Utc>) -> CategoryCounts {
    listings
        .iter()
        .filter(|listing| listing.branch == branch)
        .fold(CategoryCounts::default(), |mut counts, listing| {
            counts.total += 1;
            match classify(listing, now) {
                Category::PriceReduced => counts.price_reduced += 1,
                Category::NoPrice => counts.no_price += 1,
                Category::Stale => counts.stale += 1,
                Category::Placeholder | Category::Normal => {}
            }
            if listing.is_placeholder {
                counts.placeholder += 1;
            }
            counts
        })
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
