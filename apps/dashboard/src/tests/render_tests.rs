use std::time::Duration;

use super::*;
use client_core::{CategoryCounts, CategoryFilter};
use shared::domain::{Category, Reference};

fn row(reference: &str, category: Category, emphasized: bool) -> ListingRow {
    ListingRow {
        reference: Reference::new(reference),
        price: Some(150_000.0),
        locality: "Caorle".into(),
        category,
        is_placeholder: false,
        actions: vec![ActionKind::PriceUpdate, ActionKind::PlaceholderToggle],
        emphasized,
    }
}

fn view(rows: Vec<ListingRow>) -> ViewModel {
    ViewModel {
        branches: vec!["bibione".into(), "caorle".into()],
        branch: "caorle".into(),
        filter: CategoryFilter::All,
        search: String::new(),
        rows,
        counts: CategoryCounts {
            total: 2,
            price_reduced: 1,
            ..CategoryCounts::default()
        },
        emphasized: None,
        pending: None,
        actions_enabled: true,
    }
}

#[test]
fn formats_prices_with_italian_grouping() {
    assert_eq!(format_price(150_000.0), "150.000");
    assert_eq!(format_price(999.0), "999");
    assert_eq!(format_price(1_234_567.0), "1.234.567");
    assert_eq!(format_price(1_234.5), "1.234,5");
    assert_eq!(format_price(0.0), "0");
}

#[test]
fn renders_counts_rows_and_emphasis() {
    let text = render_view(&view(vec![
        row("A1", Category::PriceReduced, false),
        row("A2", Category::Normal, true),
    ]));

    assert!(text.contains("Branch: caorle  (available: bibione, caorle)  Filter: all"));
    assert!(text.contains("Total 2 | Price reduced 1 | No price 0"));
    let a2 = text
        .lines()
        .find(|line| line.contains("A2"))
        .expect("row for A2");
    assert!(a2.starts_with(">>"));
    assert!(a2.contains("150.000"));
    assert!(a2.contains("CAORLE"));
    assert!(a2.contains("[lower-price] [mark placeholder]"));
}

#[test]
fn echoes_last_search_only_when_present() {
    assert!(!render_view(&view(Vec::new())).contains("Search:"));

    let mut model = view(vec![row("A2", Category::Normal, true)]);
    model.search = "A2".into();
    assert!(render_view(&model).contains("Search: A2"));
}

#[test]
fn hides_actions_while_a_proposal_is_open() {
    let mut model = view(vec![row("A1", Category::PriceReduced, false)]);
    model.actions_enabled = false;
    let text = render_view(&model);
    assert!(!text.contains("[lower-price]"));
}

#[test]
fn empty_view_says_so() {
    let text = render_view(&view(Vec::new()));
    assert!(text.ends_with(EMPTY_VIEW));
}

#[test]
fn describes_proposals() {
    let price = PendingAction {
        target: Reference::new("A1"),
        change: ProposedChange::PriceUpdate {
            current_price: 100_000.0,
        },
    };
    assert_eq!(
        describe_proposal(&price),
        "Reference A1\nCurrent price: € 100.000"
    );

    let toggle = PendingAction {
        target: Reference::new("A1"),
        change: ProposedChange::PlaceholderToggle { placeholder: true },
    };
    assert!(describe_proposal(&toggle).ends_with("Set placeholder: YES"));
}

#[test]
fn notices_are_tagged_by_level() {
    let notice = Notice {
        level: NoticeLevel::Error,
        message: "Network error: request timed out".into(),
        display_for: Duration::from_secs(3),
    };
    assert_eq!(
        render_notice(&notice),
        "[error] Network error: request timed out"
    );
}
