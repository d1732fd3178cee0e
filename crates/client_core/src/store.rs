use std::collections::{BTreeMap, HashSet};

use shared::{
    domain::{Listing, Reference},
    protocol::ListingsPayload,
};
use tracing::{info, warn};

use crate::{
    error::{LoadError, LookupError},
    filter, ListingsService,
};

/// Every listing from one load, partitioned by branch. Per-branch order is the
/// order the service returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    branches: BTreeMap<String, Vec<Listing>>,
}

impl Snapshot {
    /// Groups listings by their own `branch`. For the branch-keyed shape the
    /// map key only stands in for listings that name no branch.
    pub fn from_payload(payload: ListingsPayload, fallback_branch: &str) -> Self {
        let listings: Vec<Listing> = match payload {
            ListingsPayload::Flat(records) => records
                .into_iter()
                .map(|record| Listing::from_record(record, fallback_branch))
                .collect(),
            ListingsPayload::ByBranch(grouped) => grouped
                .into_iter()
                .flat_map(|(branch, records)| {
                    records
                        .into_iter()
                        .map(move |record| Listing::from_record(record, &branch))
                })
                .collect(),
        };

        let mut seen = HashSet::new();
        let mut branches: BTreeMap<String, Vec<Listing>> = BTreeMap::new();
        for listing in listings {
            if listing.reference.as_str().trim().is_empty() {
                warn!(branch = %listing.branch, "skipping listing without reference");
                continue;
            }
            if !seen.insert(listing.reference.clone()) {
                warn!(reference = %listing.reference, "duplicate listing reference in load");
            }
            branches
                .entry(listing.branch.clone())
                .or_default()
                .push(listing);
        }

        Self { branches }
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.branches.values().map(Vec::len).sum()
    }

    pub fn branch_names(&self) -> impl Iterator<Item = &str> {
        self.branches.keys().map(String::as_str)
    }

    pub fn listings(&self, branch: &str) -> &[Listing] {
        self.branches.get(branch).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Searches every branch, in branch-name order.
    pub fn find(&self, reference: &Reference) -> Option<&Listing> {
        self.branches
            .values()
            .find_map(|listings| filter::find_by_reference(listings, reference))
    }
}

pub struct DataStore {
    snapshot: Snapshot,
    fallback_branch: String,
}

impl DataStore {
    pub fn new(fallback_branch: impl Into<String>) -> Self {
        Self {
            snapshot: Snapshot::default(),
            fallback_branch: fallback_branch.into(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn fallback_branch(&self) -> &str {
        &self.fallback_branch
    }

    /// Fetches everything and swaps the snapshot in one step. On failure the
    /// previous snapshot is kept as is.
    pub async fn load<S>(&mut self, service: &S) -> Result<&Snapshot, LoadError>
    where
        S: ListingsService + ?Sized,
    {
        let payload = service.fetch_listings().await?;
        let snapshot = Snapshot::from_payload(payload, &self.fallback_branch);
        info!(
            listings = snapshot.len(),
            branches = snapshot.branches.len(),
            "listings loaded"
        );
        self.snapshot = snapshot;
        Ok(&self.snapshot)
    }

    /// Remote point lookup. Independent of the held snapshot.
    pub async fn lookup<S>(
        &self,
        service: &S,
        reference: &Reference,
    ) -> Result<Option<Listing>, LookupError>
    where
        S: ListingsService + ?Sized,
    {
        let record = service.lookup(reference).await?;
        Ok(record.map(|record| Listing::from_record(record, &self.fallback_branch)))
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
