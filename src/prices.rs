//! The `prices` command: fetch the market snapshot, query it, render a table.

use crate::convert::RateConverter;
use crate::dataset::{DatasetStore, SortDirection, SortKey};
use crate::market::{MarketDataProvider, PricedEntity};
use crate::rates::RateProvider;
use crate::ui;
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;

/// Reference unit the market snapshot is priced in.
const DATASET_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Default)]
pub struct PricesQuery {
    pub search: Option<String>,
    pub sort: Option<SortKey>,
    pub direction: SortDirection,
    /// Display currency; `None` keeps the dataset's reference unit.
    pub currency: Option<String>,
}

/// One renderable view over the snapshot.
pub struct PriceBoard {
    pub rows: Vec<PricedEntity>,
    pub currency: String,
    pub total_count: usize,
    pub demo_rates: bool,
    pub fetched_at: DateTime<Utc>,
}

impl PriceBoard {
    pub fn display_as_table(&self) -> String {
        if self.rows.is_empty() {
            return "No results found.".to_string();
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Name"),
            ui::header_cell(&format!("Price ({})", self.currency)),
            ui::header_cell(&format!("Market Cap ({})", self.currency)),
            ui::header_cell("24h"),
        ]);

        for row in &self.rows {
            let market_cap = row
                .market_cap
                .map_or("N/A".to_string(), ui::format_amount);
            table.add_row(vec![
                Cell::new(&row.symbol),
                Cell::new(&row.display_name),
                ui::numeric_cell(&ui::format_rate(row.price)),
                ui::numeric_cell(&market_cap),
                ui::change_cell(row.change_pct),
            ]);
        }

        let footer = format!(
            "{} of {} assets • Updated {}",
            self.rows.len(),
            self.total_count,
            self.fetched_at.format("%H:%M")
        );

        format!(
            "{}\n{}",
            table,
            ui::style_text(&footer, ui::StyleType::Subtle)
        )
    }
}

/// Fetches markets (and rates when a display currency is requested), runs the
/// query through the store and prints the result.
pub async fn generate_and_display_prices(
    market_provider: &(dyn MarketDataProvider + Send + Sync),
    rate_provider: &(dyn RateProvider + Send + Sync),
    query: &PricesQuery,
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching market data...");
    let board = build_price_board(market_provider, rate_provider, query).await;
    spinner.finish_and_clear();
    let board = board?;

    if board.demo_rates {
        ui::print_demo_warning();
    }
    println!("{}", board.display_as_table());
    Ok(())
}

async fn build_price_board(
    market_provider: &(dyn MarketDataProvider + Send + Sync),
    rate_provider: &(dyn RateProvider + Send + Sync),
    query: &PricesQuery,
) -> Result<PriceBoard> {
    let target = query
        .currency
        .as_deref()
        .unwrap_or(DATASET_CURRENCY)
        .to_uppercase();

    // One fetch per collaborator; rates only when a conversion is needed
    let (entities, rates) = if target == DATASET_CURRENCY {
        (market_provider.fetch_markets().await?, None)
    } else {
        let (entities, rates) = futures::join!(
            market_provider.fetch_markets(),
            rate_provider.fetch_rates(DATASET_CURRENCY)
        );
        (entities?, Some(rates))
    };

    let mut store = DatasetStore::new();
    store.load(entities);
    let total_count = store.len();

    let sort = query.sort.map(|key| (key, query.direction));
    let mut rows = store.select(query.search.as_deref().unwrap_or(""), sort);

    let mut demo_rates = false;
    if let Some(rates) = rates {
        let mut converter = RateConverter::new(DATASET_CURRENCY);
        converter.load_rates(rates);
        demo_rates = converter.is_demo();

        let rate = converter.rate(DATASET_CURRENCY, &target);
        for row in &mut rows {
            row.price *= rate;
            row.market_cap = row.market_cap.map(|cap| cap * rate);
        }
    }

    Ok(PriceBoard {
        rows,
        currency: target,
        total_count,
        demo_rates,
        fetched_at: Utc::now(),
    })
}
