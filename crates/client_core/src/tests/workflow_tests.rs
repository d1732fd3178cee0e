use super::*;
use crate::support::listing;

fn reduced() -> Listing {
    let mut item = listing("A1", "caorle", Some(100.0));
    item.reference_price = Some(120.0);
    item
}

#[test]
fn price_proposal_prefills_current_price() {
    let mut workflow = ActionWorkflow::new();
    let action = workflow
        .propose(ActionKind::PriceUpdate, &reduced())
        .expect("propose");

    assert_eq!(
        action.change,
        ProposedChange::PriceUpdate {
            current_price: 100.0
        }
    );
    assert!(matches!(workflow.state(), WorkflowState::Proposed(_)));
}

#[test]
fn placeholder_proposal_carries_inverted_flag() {
    let mut workflow = ActionWorkflow::new();
    let mut item = reduced();
    item.is_placeholder = true;
    let action = workflow
        .propose(ActionKind::PlaceholderToggle, &item)
        .expect("propose");
    assert_eq!(
        action.change,
        ProposedChange::PlaceholderToggle { placeholder: false }
    );
}

#[test]
fn zero_price_keeps_proposal_open() {
    let mut workflow = ActionWorkflow::new();
    workflow
        .propose(ActionKind::PriceUpdate, &reduced())
        .expect("propose");

    let err = workflow.confirm(Some("0")).expect_err("must reject");

    assert_eq!(
        err,
        WorkflowError::Validation(ValidationError::NonPositivePrice)
    );
    assert!(matches!(workflow.state(), WorkflowState::Proposed(_)));
}

#[test]
fn non_numeric_price_keeps_proposal_open() {
    let mut workflow = ActionWorkflow::new();
    workflow
        .propose(ActionKind::PriceUpdate, &reduced())
        .expect("propose");

    let err = workflow.confirm(Some("ninety")).expect_err("must reject");

    assert_eq!(
        err,
        WorkflowError::Validation(ValidationError::NotANumber("ninety".into()))
    );
    assert!(matches!(workflow.state(), WorkflowState::Proposed(_)));
}

#[test]
fn confirm_moves_to_in_flight_with_single_mutation() {
    let mut workflow = ActionWorkflow::new();
    workflow
        .propose(ActionKind::PriceUpdate, &reduced())
        .expect("propose");

    let mutation = workflow.confirm(Some(" 95000 ")).expect("confirm");

    assert_eq!(
        mutation,
        Mutation::LowerPrice {
            reference: Reference::new("A1"),
            new_price: 95_000.0,
        }
    );
    assert!(matches!(workflow.state(), WorkflowState::InFlight(_)));
}

#[test]
fn blank_edit_keeps_proposal_open() {
    let mut workflow = ActionWorkflow::new();
    workflow
        .propose(ActionKind::PriceUpdate, &reduced())
        .expect("propose");

    for blank in ["", "   "] {
        let err = workflow.confirm(Some(blank)).expect_err("must reject");
        assert_eq!(err, WorkflowError::Validation(ValidationError::Empty));
        assert!(matches!(workflow.state(), WorkflowState::Proposed(_)));
    }
}

#[test]
fn untouched_price_confirms_prefilled_value() {
    let mut workflow = ActionWorkflow::new();
    workflow
        .propose(ActionKind::PriceUpdate, &reduced())
        .expect("propose");

    let mutation = workflow.confirm(None).expect("confirm");

    assert_eq!(
        mutation,
        Mutation::LowerPrice {
            reference: Reference::new("A1"),
            new_price: 100.0,
        }
    );
}

#[test]
fn proposals_are_rejected_while_not_idle() {
    let mut workflow = ActionWorkflow::new();
    let other = listing("B2", "caorle", Some(10.0));
    workflow
        .propose(ActionKind::PlaceholderToggle, &reduced())
        .expect("propose");

    assert_eq!(
        workflow.propose(ActionKind::PriceUpdate, &other),
        Err(WorkflowError::Busy)
    );

    workflow.confirm(None).expect("confirm");
    assert_eq!(
        workflow.propose(ActionKind::PriceUpdate, &other),
        Err(WorkflowError::Busy)
    );
    assert_eq!(workflow.confirm(None), Err(WorkflowError::Busy));
    assert_eq!(workflow.pending().map(|a| a.target.as_str()), Some("A1"));
}

#[test]
fn cancel_is_only_legal_from_proposed() {
    let mut workflow = ActionWorkflow::new();
    assert!(!workflow.cancel());

    workflow
        .propose(ActionKind::PlaceholderToggle, &reduced())
        .expect("propose");
    assert!(workflow.cancel());
    assert!(workflow.is_idle());

    workflow
        .propose(ActionKind::PlaceholderToggle, &reduced())
        .expect("propose");
    workflow.confirm(None).expect("confirm");
    assert!(!workflow.cancel());
    assert!(matches!(workflow.state(), WorkflowState::InFlight(_)));

    workflow.settle();
    assert!(workflow.is_idle());
}

#[test]
fn confirm_without_proposal_is_rejected() {
    let mut workflow = ActionWorkflow::new();
    assert_eq!(workflow.confirm(None), Err(WorkflowError::NothingPending));
}

#[test]
fn validate_price_rejects_non_finite_values() {
    assert_eq!(
        validate_price(Some("inf"), 1.0),
        Err(ValidationError::NonPositivePrice)
    );
    assert_eq!(
        validate_price(Some("-5"), 1.0),
        Err(ValidationError::NonPositivePrice)
    );
    assert_eq!(validate_price(None, 0.0), Err(ValidationError::NonPositivePrice));
    assert_eq!(validate_price(Some("12.5"), 0.0), Ok(12.5));
}
