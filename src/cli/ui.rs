use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use csv::StringRecord;

/// Defines different styles for text elements.
pub enum StyleType {
    Success,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Success => style(text).green(),
        StyleType::Warning => style(text).yellow().bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Console line for a cycle whose values were all fetched.
pub fn print_cycle_summary(summary: &str) {
    println!("{}", style_text(summary, StyleType::Success));
}

/// Console line for a cycle that was skipped.
pub fn print_cycle_skipped(missing: &[&str]) {
    let text = format!(
        "⚠️ Failed to fetch some data ({}), skipping...",
        missing.join(", ")
    );
    println!("{}", style_text(&text, StyleType::Warning));
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Renders ledger rows; every column after the time is right aligned.
pub fn ledger_table(header: &StringRecord, rows: &[StringRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.iter().map(header_cell).collect::<Vec<_>>());

    for row in rows {
        table.add_row(
            row.iter()
                .enumerate()
                .map(|(i, value)| {
                    if i == 0 {
                        Cell::new(value)
                    } else {
                        Cell::new(value).set_alignment(CellAlignment::Right)
                    }
                })
                .collect::<Vec<_>>(),
        );
    }
    table
}
