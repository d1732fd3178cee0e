use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ActionKind, CategoryFilter, Dashboard, HttpListingsService, ListingsService, NoticeLevel,
    Resolution, ResolutionReport, WorkflowState,
};
use shared::domain::Reference;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Review advertised property banners and apply price/placeholder updates")]
struct Cli {
    /// Settings file; defaults to ./dashboard.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the listings service base url.
    #[arg(long)]
    service_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the banners of one branch.
    List {
        #[arg(long)]
        branch: Option<String>,
        #[arg(long, default_value = "all")]
        filter: CategoryFilter,
    },
    /// Find a banner by reference and show its branch.
    Find { reference: String },
    /// Lower the price of a banner.
    LowerPrice {
        reference: String,
        /// New price; prompted for when omitted.
        #[arg(long)]
        price: Option<String>,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Flip the placeholder flag of a banner.
    TogglePlaceholder {
        reference: String,
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.service_url {
        settings.service_url = url;
    }
    tracing::debug!(service_url = %settings.service_url, "settings loaded");

    let service = HttpListingsService::new(&settings.service_url, settings.request_timeout())
        .context("failed to set up listings service")?;
    let mut dashboard = Dashboard::new(
        service,
        &settings.fallback_branch,
        settings.initial_branch(),
    );

    match cli.command {
        Command::List { branch, filter } => {
            load(&mut dashboard).await?;
            if let Some(branch) = branch {
                dashboard.select_branch(branch);
            }
            dashboard.select_category_filter(filter);
            show(&dashboard);
        }
        Command::Find { reference } => {
            load(&mut dashboard).await?;
            let found = dashboard.search_by_reference(&reference).await;
            flush_notices(&mut dashboard);
            if !found {
                bail!("reference '{}' not found", reference.trim());
            }
            show(&dashboard);
        }
        Command::LowerPrice {
            reference,
            price,
            yes,
        } => {
            load(&mut dashboard).await?;
            let reference = Reference::new(reference.trim());
            let report =
                run_action(&mut dashboard, ActionKind::PriceUpdate, &reference, price, yes).await?;
            finish_action(&mut dashboard, &reference, report)?;
        }
        Command::TogglePlaceholder { reference, yes } => {
            load(&mut dashboard).await?;
            let reference = Reference::new(reference.trim());
            let report =
                run_action(&mut dashboard, ActionKind::PlaceholderToggle, &reference, None, yes)
                    .await?;
            finish_action(&mut dashboard, &reference, report)?;
        }
    }

    Ok(())
}

async fn load<S: ListingsService>(dashboard: &mut Dashboard<S>) -> Result<()> {
    let outcome = dashboard.refresh().await;
    flush_notices(dashboard);
    outcome.context("could not load listings")
}

/// Proposes, prompts and resolves one action. Returns `None` when the user
/// cancelled.
async fn run_action<S: ListingsService>(
    dashboard: &mut Dashboard<S>,
    kind: ActionKind,
    reference: &Reference,
    price: Option<String>,
    assume_yes: bool,
) -> Result<Option<ResolutionReport>> {
    let Some(action) = dashboard.propose_action(kind, reference) else {
        flush_notices(dashboard);
        bail!("cannot start {kind} on '{reference}'");
    };
    println!("{}", render::describe_proposal(&action));

    loop {
        let edited_price = match (kind, &price) {
            (ActionKind::PriceUpdate, Some(price)) => Some(price.clone()),
            (ActionKind::PriceUpdate, None) => {
                let answer = prompt("New price (no separators, empty keeps current): ")?;
                (!answer.is_empty()).then_some(answer)
            }
            (ActionKind::PlaceholderToggle, _) => None,
        };

        if !assume_yes && !confirm("Apply this change? [y/N] ")? {
            dashboard.resolve_proposal(Resolution::Cancel).await;
            println!("Cancelled.");
            return Ok(None);
        }

        let report = dashboard
            .resolve_proposal(Resolution::Confirm { edited_price })
            .await;
        flush_notices(dashboard);

        if !matches!(dashboard.workflow_state(), WorkflowState::Proposed(_)) {
            return Ok(Some(report));
        }
        // Still proposed: the price did not validate.
        if price.is_some() {
            dashboard.resolve_proposal(Resolution::Cancel).await;
            bail!("invalid price");
        }
    }
}

fn finish_action<S: ListingsService>(
    dashboard: &mut Dashboard<S>,
    reference: &Reference,
    report: Option<ResolutionReport>,
) -> Result<()> {
    let Some(report) = report else {
        return Ok(());
    };

    if let Some(branch) = dashboard
        .snapshot()
        .find(reference)
        .map(|listing| listing.branch.clone())
    {
        dashboard.select_branch(branch);
    }
    show(dashboard);

    if !report.succeeded() {
        bail!("update of '{reference}' did not go through");
    }
    Ok(())
}

fn show<S: ListingsService>(dashboard: &Dashboard<S>) {
    println!("{}", render::render_view(&dashboard.view_model(chrono::Utc::now())));
}

fn flush_notices<S: ListingsService>(dashboard: &mut Dashboard<S>) {
    for notice in dashboard.take_notices() {
        let line = render::render_notice(&notice);
        if notice.level == NoticeLevel::Error {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut answer = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read from stdin")?;
    if read == 0 {
        bail!("stdin closed");
    }
    Ok(answer.trim().to_string())
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(question)?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}
