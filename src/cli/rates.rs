use super::{convert, ui};
use crate::core::config::AppConfig;
use crate::core::engine::FETCH_ERROR_LABEL;
use crate::core::{ConversionPair, RateProvider, RateTable};
use anyhow::{Result, bail};
use comfy_table::{Cell, CellAlignment, Color, Table};

/// Lists every available currency with its rate against the base.
///
/// The currencies of the default pair are marked, the way a selector would
/// preselect them.
pub fn build_rates_table(rates: &RateTable, pair: &ConversionPair) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {}", rates.base())),
        ui::header_cell("Default"),
    ]);

    for code in rates.currencies() {
        let marker = if code == pair.from {
            Cell::new("from").fg(Color::Green)
        } else if code == pair.to {
            Cell::new("to").fg(Color::Green)
        } else {
            Cell::new("")
        };
        let rate = rates.get(code).map_or_else(String::new, |r| r.to_string());
        table.add_row(vec![
            Cell::new(code),
            Cell::new(rate).set_alignment(CellAlignment::Right),
            marker,
        ]);
    }
    table
}

pub async fn run(provider: &dyn RateProvider, config: &AppConfig) -> Result<()> {
    let rates = match convert::fetch_with_spinner(provider, &config.base_currency).await {
        Ok(rates) => rates,
        Err(e) => bail!("{FETCH_ERROR_LABEL}: {e}"),
    };
    let pair = ConversionPair::new(config.pair.from.clone(), config.pair.to.clone());

    println!(
        "\n{} {}",
        ui::style_text("Currencies:", ui::StyleType::Title),
        rates.len()
    );
    println!("{}", build_rates_table(&rates, &pair));
    if let Some(updated) = rates.updated_at() {
        println!(
            "{}",
            ui::style_text(
                &format!("Last updated {}", updated.format("%Y-%m-%d %H:%M UTC")),
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}
