//! Application state and the user intents that mutate it.
//!
//! [`Dashboard`] is the single owner of the snapshot, the view selection and
//! the pending-action slot. Every intent takes `&mut self`, so at most one
//! of them runs at a time and mutations never overlap.

use std::time::Duration;

use chrono::{DateTime, Utc};
use shared::domain::Reference;
use tracing::{info, warn};

use crate::{
    error::{LoadError, MutationError, WorkflowError},
    filter::{CategoryFilter, ViewSelection},
    store::{DataStore, Snapshot},
    view_model::{self, ViewModel},
    workflow::{ActionKind, ActionWorkflow, Mutation, PendingAction, WorkflowState},
    ListingsService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient status message with a suggested display duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub display_for: Duration,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>, millis: u64) -> Self {
        Self {
            level,
            message: message.into(),
            display_for: Duration::from_millis(millis),
        }
    }

    fn info(message: impl Into<String>, millis: u64) -> Self {
        Self::new(NoticeLevel::Info, message, millis)
    }

    fn success(message: impl Into<String>, millis: u64) -> Self {
        Self::new(NoticeLevel::Success, message, millis)
    }

    fn error(message: impl Into<String>, millis: u64) -> Self {
        Self::new(NoticeLevel::Error, message, millis)
    }
}

/// How the user closed a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Cancel,
    /// `edited_price` is the text typed for a price update, if any.
    Confirm { edited_price: Option<String> },
}

/// What a resolved proposal actually did. `None` means the step never ran.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionReport {
    pub mutation: Option<Result<(), MutationError>>,
    pub reload: Option<Result<(), LoadError>>,
}

impl ResolutionReport {
    fn nothing() -> Self {
        Self {
            mutation: None,
            reload: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.mutation, Some(Ok(())))
    }
}

pub struct Dashboard<S> {
    service: S,
    store: DataStore,
    selection: ViewSelection,
    workflow: ActionWorkflow,
    emphasis: Option<Reference>,
    notices: Vec<Notice>,
}

impl<S: ListingsService> Dashboard<S> {
    pub fn new(service: S, fallback_branch: &str, initial_branch: &str) -> Self {
        Self {
            service,
            store: DataStore::new(fallback_branch),
            selection: ViewSelection::for_branch(initial_branch),
            workflow: ActionWorkflow::new(),
            emphasis: None,
            notices: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    pub fn selection(&self) -> &ViewSelection {
        &self.selection
    }

    pub fn workflow_state(&self) -> &WorkflowState {
        self.workflow.state()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.workflow.pending()
    }

    pub fn view_model(&self, now: DateTime<Utc>) -> ViewModel {
        view_model::build(
            self.store.snapshot(),
            &self.selection,
            &self.workflow,
            self.emphasis.as_ref(),
            now,
        )
    }

    /// Drains queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Reloads the snapshot from the service.
    pub async fn refresh(&mut self) -> Result<(), LoadError> {
        self.emphasis = None;
        match self.store.load(&self.service).await {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!("listings load failed: {err}");
                self.notices
                    .push(Notice::error(format!("Loading failed: {err}"), 3500));
                Err(err)
            }
        }
    }

    pub fn select_branch(&mut self, branch: impl Into<String>) {
        self.selection.branch = branch.into();
        self.emphasis = None;
    }

    pub fn select_category_filter(&mut self, filter: CategoryFilter) {
        self.selection.filter = filter;
        self.emphasis = None;
    }

    /// Looks a reference up remotely; on a hit, switches to its branch and
    /// emphasises it. Returns whether the listing was found.
    pub async fn search_by_reference(&mut self, text: &str) -> bool {
        let text = text.trim();
        self.selection.search = text.to_string();
        if text.is_empty() {
            self.notices.push(Notice::info("Enter a reference", 2000));
            return false;
        }

        let reference = Reference::new(text);
        match self.store.lookup(&self.service, &reference).await {
            Ok(Some(listing)) => {
                info!(reference = %reference, branch = %listing.branch, "reference found");
                self.selection.branch = listing.branch;
                self.emphasis = Some(listing.reference);
                self.notices
                    .push(Notice::success(format!("Found reference {reference}"), 2000));
                true
            }
            Ok(None) => {
                self.notices.push(Notice::info(
                    format!("No listing with reference {reference}"),
                    3000,
                ));
                false
            }
            Err(err) => {
                warn!("{err}");
                self.notices
                    .push(Notice::error(format!("Search failed: {}", err.reason), 3500));
                false
            }
        }
    }

    /// Opens a confirmation for `kind` on a listing of the held snapshot.
    /// Returns the proposal, or `None` when it could not be opened.
    pub fn propose_action(&mut self, kind: ActionKind, reference: &Reference) -> Option<PendingAction> {
        let Some(listing) = self.store.snapshot().find(reference) else {
            self.notices
                .push(Notice::error(format!("Unknown reference {reference}"), 3000));
            return None;
        };

        match self.workflow.propose(kind, listing) {
            Ok(action) => Some(action),
            Err(err) => {
                self.notices.push(Notice::error(busy_message(&err), 2000));
                None
            }
        }
    }

    /// Cancels or confirms the open proposal. A confirmation issues exactly one
    /// mutation and then exactly one reload, whatever the mutation's outcome.
    pub async fn resolve_proposal(&mut self, resolution: Resolution) -> ResolutionReport {
        let edited_price = match resolution {
            Resolution::Cancel => {
                self.workflow.cancel();
                return ResolutionReport::nothing();
            }
            Resolution::Confirm { edited_price } => edited_price,
        };

        let mutation = match self.workflow.confirm(edited_price.as_deref()) {
            Ok(mutation) => mutation,
            Err(WorkflowError::Validation(err)) => {
                self.notices
                    .push(Notice::error(format!("Enter a valid price: {err}"), 2000));
                return ResolutionReport::nothing();
            }
            Err(err) => {
                self.notices.push(Notice::error(busy_message(&err), 2000));
                return ResolutionReport::nothing();
            }
        };

        let outcome = self.apply(&mutation).await;
        // Reload on every outcome; a failed reload gets a notice of its own
        // and never reopens the proposal.
        let reload = self.refresh().await;
        self.workflow.settle();

        ResolutionReport {
            mutation: Some(outcome),
            reload: Some(reload),
        }
    }

    async fn apply(&mut self, mutation: &Mutation) -> Result<(), MutationError> {
        let (progress, progress_ms, done, done_ms) = match mutation {
            Mutation::LowerPrice { .. } => ("Updating price...", 2000, "Price updated", 2200),
            Mutation::SetPlaceholder { .. } => {
                ("Updating placeholder...", 1500, "Placeholder updated", 2000)
            }
        };
        self.notices.push(Notice::info(progress, progress_ms));

        let outcome = match mutation {
            Mutation::LowerPrice {
                reference,
                new_price,
            } => self.service.lower_price(reference, *new_price).await,
            Mutation::SetPlaceholder {
                reference,
                placeholder,
            } => self.service.set_placeholder(reference, *placeholder).await,
        };

        match &outcome {
            Ok(()) => {
                info!(reference = %mutation.reference(), "mutation applied");
                self.notices.push(Notice::success(done, done_ms));
            }
            Err(MutationError::Rejected(reason)) => {
                warn!(reference = %mutation.reference(), "mutation rejected: {reason}");
                self.notices
                    .push(Notice::error(format!("Update rejected: {reason}"), 3000));
            }
            Err(MutationError::Transport(reason)) => {
                warn!(reference = %mutation.reference(), "mutation failed: {reason}");
                self.notices
                    .push(Notice::error(format!("Network error: {reason}"), 3000));
            }
        }
        outcome
    }
}

fn busy_message(err: &WorkflowError) -> String {
    match err {
        WorkflowError::Busy => "Another action is in progress".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
