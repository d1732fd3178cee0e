use std::time::Duration;

use async_trait::async_trait;
use shared::{
    domain::Reference,
    protocol::{ListingRecord, ListingsPayload},
};

pub mod app;
pub mod classify;
pub mod error;
pub mod filter;
pub mod store;
pub mod transport;
pub mod view_model;
pub mod workflow;

pub use app::{Dashboard, Notice, NoticeLevel, Resolution, ResolutionReport};
pub use classify::classify;
pub use error::{
    LoadError, LookupError, MutationError, TransportSetupError, ValidationError, WorkflowError,
};
pub use filter::{CategoryCounts, CategoryFilter, ViewSelection};
pub use store::{DataStore, Snapshot};
pub use transport::HttpListingsService;
pub use view_model::{ListingRow, ViewModel};
pub use workflow::{
    ActionKind, ActionWorkflow, Mutation, PendingAction, ProposedChange, WorkflowState,
};

/// Timeout applied to every request against the listings service.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Branch assigned to listings that do not name one.
pub const DEFAULT_FALLBACK_BRANCH: &str = "portogruaro";

/// Remote listings service. Implementations own transport concerns
/// (timeouts, decoding); callers only see the per-operation error channel.
#[async_trait]
pub trait ListingsService: Send + Sync {
    async fn fetch_listings(&self) -> Result<ListingsPayload, LoadError>;

    /// `Ok(None)` for a well-formed "not found"; `Err` only for transport failures.
    async fn lookup(&self, reference: &Reference) -> Result<Option<ListingRecord>, LookupError>;

    async fn lower_price(&self, reference: &Reference, new_price: f64) -> Result<(), MutationError>;

    async fn set_placeholder(
        &self,
        reference: &Reference,
        placeholder: bool,
    ) -> Result<(), MutationError>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;
