//! Row parsing: the 50-way split and per-column typed coercion.

use crate::cell::{Cell, Decimal};
use crate::schema::{ColumnType, TableId, ROW_WIDTH};

/// A fully-typed row: exactly `ROW_WIDTH` cells in schema order.
pub type Row = [Cell; ROW_WIDTH];

/// Parses a raw 50-field payload into a typed `Row` for the given table.
///
/// Returns `None` if the field count is not exactly `ROW_WIDTH` .
/// Individual unparseable cells coerce to the type's zero/empty value —
/// no single bad cell drops the whole row.
pub fn parse_row(table: TableId, payload: &str) -> Option<Row> {
    let fields: Vec<&str> = payload.split(',').collect();
    if fields.len() != ROW_WIDTH {
        return None;
    }
    let schema = table.schema();
    let mut row: Row = std::array::from_fn(|_| Cell::Null);
    for (i, field) in fields.iter().enumerate() {
        row[i] = parse_cell(schema[i].1, field);
    }
    Some(row)
}

fn parse_cell(ty: ColumnType, raw: &str) -> Cell {
    match ty {
        ColumnType::Text => Cell::Text(raw.to_string()),
        ColumnType::Int => match raw.trim().parse::<i64>() {
            Ok(v) => Cell::Int(v),
            Err(_) => Cell::Int(0),
        },
        ColumnType::Decimal => match Decimal::parse(raw) {
            Some(d) => Cell::Decimal(d),
            None => Cell::Decimal(Decimal::ZERO),
        },
        ColumnType::Timestamp => match raw.trim().parse::<i64>() {
            Ok(v) => Cell::Timestamp(v),
            Err(_) => Cell::Timestamp(0),
        },
    }
}

/// Renders a row back to its 50-field CSV payload, for round-trip
/// testing and the reference data generator.
pub fn format_row(row: &Row) -> String {
    row.iter()
        .map(std::string::ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order_fields() -> Vec<String> {
        let mut fields = vec![
            "ORD1".to_string(),
            "AAPL".to_string(),
            "Buy".to_string(),
            "150.25".to_string(),
            "100".to_string(),
            "1705312205123".to_string(),
            "Active".to_string(),
        ];
        while fields.len() < ROW_WIDTH {
            fields.push(String::new());
        }
        fields
    }

    #[test]
    fn parses_exact_width_payload() {
        let payload = sample_order_fields().join(",");
        let row = parse_row(TableId::OrderBook, &payload).unwrap();
        assert_eq!(row[0], Cell::Text("ORD1".to_string()));
        assert_eq!(row[1], Cell::Text("AAPL".to_string()));
        assert_eq!(row[3], Cell::Decimal(Decimal::parse("150.25").unwrap()));
        assert_eq!(row[4], Cell::Int(100));
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(parse_row(TableId::OrderBook, "only,three,fields").is_none());
    }

    #[test]
    fn unparseable_numeric_cell_coerces_to_zero_not_drop() {
        let mut fields = sample_order_fields();
        fields[4] = "not-a-number".to_string();
        let payload = fields.join(",");
        let row = parse_row(TableId::OrderBook, &payload).unwrap();
        assert_eq!(row[4], Cell::Int(0));
    }

    #[test]
    fn round_trips_typed_fields() {
        let payload = sample_order_fields().join(",");
        let row = parse_row(TableId::OrderBook, &payload).unwrap();
        let formatted = format_row(&row);
        let reparsed = parse_row(TableId::OrderBook, &formatted).unwrap();
        assert_eq!(row, reparsed);
    }
}
