use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::domain::{Category, Listing, Reference};

use crate::{
    classify::classify,
    filter::{self, CategoryCounts, CategoryFilter, ViewSelection},
    store::Snapshot,
    workflow::{ActionKind, ActionWorkflow, PendingAction},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRow {
    pub reference: Reference,
    pub price: Option<f64>,
    pub locality: String,
    pub category: Category,
    pub is_placeholder: bool,
    /// Actions the row offers; price updates only for reduced listings.
    pub actions: Vec<ActionKind>,
    pub emphasized: bool,
}

impl ListingRow {
    fn new(listing: &Listing, category: Category, emphasis: Option<&Reference>) -> Self {
        let mut actions = Vec::with_capacity(2);
        if category == Category::PriceReduced {
            actions.push(ActionKind::PriceUpdate);
        }
        actions.push(ActionKind::PlaceholderToggle);

        Self {
            reference: listing.reference.clone(),
            price: listing.price.filter(|price| *price != 0.0),
            locality: listing.locality.clone(),
            category,
            is_placeholder: listing.is_placeholder,
            actions,
            emphasized: emphasis == Some(&listing.reference),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub branches: Vec<String>,
    pub branch: String,
    pub filter: CategoryFilter,
    pub search: String,
    pub rows: Vec<ListingRow>,
    pub counts: CategoryCounts,
    pub emphasized: Option<Reference>,
    pub pending: Option<PendingAction>,
    /// False while a proposal is open or in flight.
    pub actions_enabled: bool,
}

pub fn build(
    snapshot: &Snapshot,
    selection: &ViewSelection,
    workflow: &ActionWorkflow,
    emphasis: Option<&Reference>,
    now: DateTime<Utc>,
) -> ViewModel {
    let branch_listings = snapshot.listings(&selection.branch);
    let rows = filter::filter(branch_listings, selection, now)
        .into_iter()
        .map(|listing| ListingRow::new(listing, classify(listing, now), emphasis))
        .collect();

    ViewModel {
        branches: snapshot.branch_names().map(str::to_string).collect(),
        branch: selection.branch.clone(),
        filter: selection.filter,
        search: selection.search.clone(),
        rows,
        counts: filter::counts(branch_listings, &selection.branch, now),
        emphasized: emphasis.cloned(),
        pending: workflow.pending().cloned(),
        actions_enabled: workflow.is_idle(),
    }
}

#[cfg(test)]
#[path = "tests/view_model_tests.rs"]
mod tests;
