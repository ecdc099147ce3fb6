use crate::core::{ConversionEngine, RateStatus, Side};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right aligned amount cell; an empty field is shown as a dim dash.
pub fn amount_cell(text: &str) -> Cell {
    if text.is_empty() {
        Cell::new("-")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right)
    } else {
        Cell::new(text).set_alignment(CellAlignment::Right)
    }
}

/// Creates a spinner shown while rates are being fetched.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Renders both amount fields, the comparison label and the rate status.
pub fn render_converter(engine: &ConversionEngine, focus: Side) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![header_cell(""), header_cell("Currency"), header_cell("Amount")]);

    for (index, side) in [Side::First, Side::Second].into_iter().enumerate() {
        let marker = if side == focus { ">" } else { " " };
        table.add_row(vec![
            Cell::new(format!("{marker}{}", index + 1)),
            Cell::new(engine.pair().code(side)).add_attribute(Attribute::Bold),
            amount_cell(engine.amounts().get(side)),
        ]);
    }

    let label = match engine.status() {
        RateStatus::Failed(_) => style_text(engine.label(), StyleType::Error),
        _ => style_text(engine.label(), StyleType::Label),
    };

    let status = match (engine.status(), engine.rates().updated_at()) {
        (RateStatus::Loading, _) => style_text("Loading rates...", StyleType::Subtle),
        (RateStatus::Failed(reason), _) => style_text(reason, StyleType::Subtle),
        (RateStatus::Ready, Some(updated)) => style_text(
            &format!(
                "Rates for {} updated {}",
                engine.rates().base(),
                updated.format("%Y-%m-%d %H:%M UTC")
            ),
            StyleType::Subtle,
        ),
        (RateStatus::Ready, None) => style_text(
            &format!("Rates for {}", engine.rates().base()),
            StyleType::Subtle,
        ),
    };

    format!("{table}\n{label}\n{status}")
}
