//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use upflow_core::TransactionDto;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Table of transactions, debits in red
pub fn transactions_table(rows: &[TransactionDto]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Id", "Settled", "Value"]);

    for row in rows {
        let value = Cell::new(format!("{:.2}", row.value)).fg(if row.value.is_sign_negative() {
            Color::Red
        } else {
            Color::Green
        });
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(row.settled_at.format("%Y-%m-%d %H:%M")),
            value,
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    #[test]
    fn test_transactions_table_rows() {
        let rows = vec![
            TransactionDto {
                id: 1,
                value: Decimal::new(-1250, 2),
                settled_at: Utc.with_ymd_and_hms(2024, 2, 3, 10, 15, 0).unwrap(),
            },
            TransactionDto {
                id: 2,
                value: Decimal::new(4000, 2),
                settled_at: Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).unwrap(),
            },
        ];

        let rendered = transactions_table(&rows).to_string();
        assert!(rendered.contains("-12.50"));
        assert!(rendered.contains("40.00"));
        assert!(rendered.contains("2024-02-03 10:15"));
    }
}
