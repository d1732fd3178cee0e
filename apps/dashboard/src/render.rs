use client_core::{
    ActionKind, ListingRow, Notice, NoticeLevel, PendingAction, ProposedChange, ViewModel,
};

const EMPTY_VIEW: &str = "No banners in this view";

pub fn render_view(view: &ViewModel) -> String {
    let mut lines = Vec::with_capacity(view.rows.len() + 4);

    lines.push(format!(
        "Branch: {}  (available: {})  Filter: {}",
        view.branch,
        if view.branches.is_empty() {
            "none".to_string()
        } else {
            view.branches.join(", ")
        },
        view.filter
    ));
    lines.push(format!(
        "Total {} | Price reduced {} | No price {} | Stale {} | Placeholders {}",
        view.counts.total,
        view.counts.price_reduced,
        view.counts.no_price,
        view.counts.stale,
        view.counts.placeholder
    ));
    if !view.search.is_empty() {
        lines.push(format!("Search: {}", view.search));
    }
    if let Some(pending) = &view.pending {
        lines.push(format!("Pending: {} on {}", pending.kind(), pending.target));
    }
    lines.push(String::new());

    if view.rows.is_empty() {
        lines.push(EMPTY_VIEW.to_string());
    } else {
        lines.extend(
            view.rows
                .iter()
                .map(|row| render_row(row, view.actions_enabled)),
        );
    }

    lines.join("\n")
}

fn render_row(row: &ListingRow, actions_enabled: bool) -> String {
    let marker = if row.emphasized { ">>" } else { "  " };
    let price = row.price.map(format_price).unwrap_or_else(|| "-".into());
    let actions = if actions_enabled {
        row.actions
            .iter()
            .map(|kind| format!("[{}]", action_label(*kind, row.is_placeholder)))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        String::new()
    };

    format!(
        "{marker} Rif. {:<10} € {:>12}  {:<20} {:<14} {actions}",
        row.reference.as_str(),
        price,
        row.locality.to_uppercase(),
        row.category.as_str(),
    )
    .trim_end()
    .to_string()
}

fn action_label(kind: ActionKind, is_placeholder: bool) -> &'static str {
    match kind {
        ActionKind::PriceUpdate => "lower-price",
        ActionKind::PlaceholderToggle if is_placeholder => "remove placeholder",
        ActionKind::PlaceholderToggle => "mark placeholder",
    }
}

pub fn describe_proposal(action: &PendingAction) -> String {
    match action.change {
        ProposedChange::PriceUpdate { current_price } => format!(
            "Reference {}\nCurrent price: € {}",
            action.target,
            format_price(current_price)
        ),
        ProposedChange::PlaceholderToggle { placeholder } => format!(
            "Reference {}\nSet placeholder: {}",
            action.target,
            if placeholder { "YES" } else { "NO" }
        ),
    }
}

pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.message)
}

/// Italian-style grouping: `150000` → `150.000`, `1234.5` → `1.234,5`.
pub fn format_price(value: f64) -> String {
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let whole = rounded.trunc() as u64;
    let fraction = format!("{:.3}", rounded.fract());
    let fraction = fraction.trim_start_matches("0.").trim_end_matches('0');

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if value < 0.0 && (whole > 0 || !fraction.is_empty()) {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if !fraction.is_empty() {
        grouped.push(',');
        grouped.push_str(fraction);
    }
    grouped
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
