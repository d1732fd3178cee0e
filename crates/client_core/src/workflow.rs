//! Two-phase action state machine: propose, then confirm or cancel.
//!
//! The machine itself performs no I/O. [`ActionWorkflow::confirm`] hands back
//! the single [`Mutation`] to issue and parks the action in
//! [`WorkflowState::InFlight`] until [`ActionWorkflow::settle`] is called once
//! the mutation and the trailing reload have both completed.

use std::{fmt, str::FromStr};

use serde::Serialize;
use shared::domain::{Listing, Reference};
use tracing::debug;

use crate::error::{ValidationError, WorkflowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    PriceUpdate,
    PlaceholderToggle,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::PriceUpdate => "price-update",
            ActionKind::PlaceholderToggle => "placeholder-toggle",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "price-update" => Ok(ActionKind::PriceUpdate),
            "placeholder-toggle" => Ok(ActionKind::PlaceholderToggle),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// Kind-specific payload of a proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProposedChange {
    /// `current_price` pre-fills the editable value.
    PriceUpdate { current_price: f64 },
    PlaceholderToggle { placeholder: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingAction {
    pub target: Reference,
    pub change: ProposedChange,
}

impl PendingAction {
    pub fn for_listing(kind: ActionKind, listing: &Listing) -> Self {
        let change = match kind {
            ActionKind::PriceUpdate => ProposedChange::PriceUpdate {
                current_price: listing.current_price(),
            },
            ActionKind::PlaceholderToggle => ProposedChange::PlaceholderToggle {
                placeholder: !listing.is_placeholder,
            },
        };
        Self {
            target: listing.reference.clone(),
            change,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self.change {
            ProposedChange::PriceUpdate { .. } => ActionKind::PriceUpdate,
            ProposedChange::PlaceholderToggle { .. } => ActionKind::PlaceholderToggle,
        }
    }
}

/// The one remote call a confirmed proposal turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    LowerPrice { reference: Reference, new_price: f64 },
    SetPlaceholder { reference: Reference, placeholder: bool },
}

impl Mutation {
    pub fn reference(&self) -> &Reference {
        match self {
            Mutation::LowerPrice { reference, .. } | Mutation::SetPlaceholder { reference, .. } => {
                reference
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum WorkflowState {
    #[default]
    Idle,
    Proposed(PendingAction),
    InFlight(PendingAction),
}

#[derive(Debug, Default)]
pub struct ActionWorkflow {
    state: WorkflowState,
}

impl ActionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, WorkflowState::Idle)
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        match &self.state {
            WorkflowState::Idle => None,
            WorkflowState::Proposed(action) | WorkflowState::InFlight(action) => Some(action),
        }
    }

    /// Opens a proposal. Rejected unless the machine is idle.
    pub fn propose(
        &mut self,
        kind: ActionKind,
        listing: &Listing,
    ) -> Result<PendingAction, WorkflowError> {
        if !self.is_idle() {
            return Err(WorkflowError::Busy);
        }

        let action = PendingAction::for_listing(kind, listing);
        debug!(reference = %action.target, kind = %kind, "action proposed");
        self.state = WorkflowState::Proposed(action.clone());
        Ok(action)
    }

    /// Confirms the open proposal. `edited_price` replaces the pre-filled
    /// price of a price update; it is ignored for placeholder toggles.
    /// Validation failures leave the proposal open.
    pub fn confirm(&mut self, edited_price: Option<&str>) -> Result<Mutation, WorkflowError> {
        let action = match &self.state {
            WorkflowState::Proposed(action) => action,
            WorkflowState::InFlight(_) => return Err(WorkflowError::Busy),
            WorkflowState::Idle => return Err(WorkflowError::NothingPending),
        };

        let mutation = match action.change {
            ProposedChange::PriceUpdate { current_price } => Mutation::LowerPrice {
                reference: action.target.clone(),
                new_price: validate_price(edited_price, current_price)?,
            },
            ProposedChange::PlaceholderToggle { placeholder } => Mutation::SetPlaceholder {
                reference: action.target.clone(),
                placeholder,
            },
        };

        let action = action.clone();
        debug!(reference = %action.target, "action confirmed");
        self.state = WorkflowState::InFlight(action);
        Ok(mutation)
    }

    /// Drops the open proposal. Returns `false` when there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        if let WorkflowState::Proposed(action) = &self.state {
            debug!(reference = %action.target, "action cancelled");
            self.state = WorkflowState::Idle;
            true
        } else {
            false
        }
    }

    /// Returns an in-flight action to idle.
    pub fn settle(&mut self) {
        if let WorkflowState::InFlight(action) = &self.state {
            debug!(reference = %action.target, "action settled");
            self.state = WorkflowState::Idle;
        }
    }
}

/// Parses an edited price. `None` means the field was left untouched and
/// `prefilled` is used; a blank edit is rejected.
pub fn validate_price(edited: Option<&str>, prefilled: f64) -> Result<f64, ValidationError> {
    let price = match edited.map(str::trim) {
        None => prefilled,
        Some("") => return Err(ValidationError::Empty),
        Some(text) => text
            .parse::<f64>()
            .map_err(|_| ValidationError::NotANumber(text.to_string()))?,
    };

    if !price.is_finite() || price <= 0.0 {
        return Err(ValidationError::NonPositivePrice);
    }
    Ok(price)
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
