//! The `convert` and `rates` commands.

use crate::convert::{Conversion, RateConverter};
use crate::dataset::{DatasetStore, SortDirection, SortKey, sort_entities};
use crate::history::{self, ConversionHistory};
use crate::market::PricedEntity;
use crate::rates::{RateProvider, RateSnapshot, currency_name};
use crate::ui;
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub amount: f64,
    pub from: String,
    /// One or more target currencies; each produces a history entry.
    pub targets: Vec<String>,
    /// Optional path to export the session history as CSV.
    pub export: Option<PathBuf>,
}

/// Fetches rates, performs the requested conversions and prints them.
pub async fn run_convert(
    rate_provider: &(dyn RateProvider + Send + Sync),
    base_currency: &str,
    max_history: Option<usize>,
    request: &ConvertRequest,
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rates...");
    let fetched = rate_provider.fetch_rates(base_currency).await;
    spinner.finish_and_clear();

    let mut converter = RateConverter::new(base_currency);
    converter.load_rates(fetched);
    if converter.is_demo() {
        ui::print_demo_warning();
    }

    let mut history =
        ConversionHistory::with_capacity(max_history.unwrap_or(history::DEFAULT_CAPACITY));
    let mut conversions = Vec::with_capacity(request.targets.len());
    for target in &request.targets {
        let conversion = converter.convert(request.amount, &request.from, target)?;
        info!(
            amount = conversion.amount,
            from = %conversion.from,
            to = %conversion.to,
            rate = conversion.rate_used,
            "Converted"
        );
        history.record(conversion.clone());
        conversions.push(conversion);
    }

    println!("{}", display_conversions(&conversions));
    println!(
        "{}",
        ui::style_text(
            &format!("Updated {}", converter.snapshot().fetched_at.format("%H:%M")),
            ui::StyleType::Subtle
        )
    );

    if let Some(path) = &request.export {
        std::fs::write(path, history.to_csv())
            .with_context(|| format!("Failed to export history to {}", path.display()))?;
        println!("Exported {} conversion(s) to {}", history.len(), path.display());
    }

    Ok(())
}

fn display_conversions(conversions: &[Conversion]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Amount"),
        ui::header_cell("Converted"),
        ui::header_cell("Rate"),
    ]);

    for c in conversions {
        table.add_row(vec![
            Cell::new(format!("{} ({})", c.from, currency_name(&c.from))),
            Cell::new(format!("{} ({})", c.to, currency_name(&c.to))),
            ui::numeric_cell(&ui::format_amount(c.amount)),
            ui::numeric_cell(&ui::format_amount(c.converted)),
            ui::numeric_cell(&ui::format_rate(c.rate_used)),
        ]);
    }

    table.to_string()
}

/// Fetches the rate table for `base` and lists it, base row first, the rest
/// ordered by code. `search` runs through the same filter contract as the
/// prices view.
pub async fn run_rates(
    rate_provider: &(dyn RateProvider + Send + Sync),
    base_currency: &str,
    search: Option<&str>,
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rates...");
    let fetched = rate_provider.fetch_rates(base_currency).await;
    spinner.finish_and_clear();

    let mut converter = RateConverter::new(base_currency);
    converter.load_rates(fetched);
    if converter.is_demo() {
        ui::print_demo_warning();
    }

    let rows = rate_rows(converter.snapshot(), search.unwrap_or(""));
    println!("{}", display_rates(converter.base_currency(), &rows));
    println!(
        "{}",
        ui::style_text(
            &format!(
                "{} currencies • Updated {}",
                rows.len(),
                converter.snapshot().fetched_at.format("%H:%M")
            ),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

/// Projects a rate snapshot into priced rows (code, currency name, rate) and
/// filters them through the shared dataset contract. The base currency leads
/// at its implicit rate of 1.0.
fn rate_rows(snapshot: &RateSnapshot, search: &str) -> Vec<PricedEntity> {
    let mut entities = vec![PricedEntity::new(
        &snapshot.base,
        currency_name(&snapshot.base),
        1.0,
    )];
    let others: Vec<PricedEntity> = snapshot
        .rates
        .iter()
        .filter(|(code, _)| !code.eq_ignore_ascii_case(&snapshot.base))
        .map(|(code, rate)| PricedEntity::new(code, currency_name(code), *rate))
        .collect();
    entities.extend(sort_entities(
        others,
        SortKey::Symbol,
        SortDirection::Ascending,
    ));

    let mut store = DatasetStore::new();
    store.load(entities);
    store.filter(search)
}

fn display_rates(base: &str, rows: &[PricedEntity]) -> String {
    if rows.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per 1 {base})")),
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.symbol),
            Cell::new(&row.display_name),
            ui::numeric_cell(&ui::format_rate(row.price)),
        ]);
    }

    table.to_string()
}
