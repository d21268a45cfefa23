use std::collections::HashMap;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::domain::DqvError;

/// One parsed record: lower-cased column name to field value. `None` marks a
/// field that was empty or the literal string "null".
pub type Row = HashMap<String, Option<String>>;

/// Parse result of one CSV file. `columns` is the header in first-occurrence
/// order with duplicates removed; `skipped` counts data lines that were
/// dropped because their field count did not match the header.
#[derive(Debug, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub skipped: usize,
}

/// Parse comma-delimited text with a header line.
///
/// The format is deliberately primitive: no quoting, no embedded commas,
/// every field trimmed. Header names are lower-cased; when the header holds
/// duplicates the later column wins on lookup. Data lines whose field count
/// differs from the header are dropped without error.
pub fn parse_csv(text: &str) -> Result<Table, DqvError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();
    if headers.is_empty() {
        return Ok(Table::default());
    }

    let mut columns: Vec<String> = Vec::with_capacity(headers.len());
    for name in headers.iter() {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        if record.len() != headers.len() {
            skipped += 1;
            continue;
        }
        let mut row: Row = HashMap::with_capacity(columns.len());
        for (name, field) in headers.iter().zip(record.iter()) {
            // Insertion order makes the later duplicate win.
            row.insert(name.clone(), normalize_field(field));
        }
        rows.push(row);
    }

    if skipped > 0 {
        debug!("Dropped {skipped} rows with mismatching field count");
    }

    Ok(Table {
        columns,
        rows,
        skipped,
    })
}

// Values are kept verbatim as strings; only the null markers are folded.
fn normalize_field(field: &str) -> Option<String> {
    if field.is_empty() || field == "null" {
        None
    } else {
        Some(field.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_empty_table() {
        let table = parse_csv("").unwrap();
        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
        assert_eq!(table.skipped, 0);
    }

    #[test]
    fn header_only_gives_no_rows() {
        let table = parse_csv("a,b,c").unwrap();
        assert_eq!(table.columns, vec!["a", "b", "c"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn empty_and_null_fields_become_none() {
        let table = parse_csv("a,b\n1,\n2,x").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["a"], Some("1".to_string()));
        assert_eq!(table.rows[0]["b"], None);
        assert_eq!(table.rows[1]["a"], Some("2".to_string()));
        assert_eq!(table.rows[1]["b"], Some("x".to_string()));
    }

    #[test]
    fn literal_null_is_case_sensitive() {
        let table = parse_csv("a,b\nnull,NULL").unwrap();
        assert_eq!(table.rows[0]["a"], None);
        assert_eq!(table.rows[0]["b"], Some("NULL".to_string()));
    }

    #[test]
    fn wrong_field_count_drops_row() {
        let table = parse_csv("a,b\n1,2,3").unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.skipped, 1);

        let table = parse_csv("a,b\n1\n1,2").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.skipped, 1);
    }

    #[test]
    fn headers_are_trimmed_and_lowercased() {
        let table = parse_csv(" Name , AGE \nalice,30").unwrap();
        assert_eq!(table.columns, vec!["name", "age"]);
        assert_eq!(table.rows[0]["name"], Some("alice".to_string()));
        assert_eq!(table.rows[0]["age"], Some("30".to_string()));
    }

    #[test]
    fn values_are_trimmed_but_not_coerced() {
        let table = parse_csv("a\n  42  ").unwrap();
        assert_eq!(table.rows[0]["a"], Some("42".to_string()));
    }

    #[test]
    fn later_duplicate_header_wins() {
        let table = parse_csv("a,a\n1,2").unwrap();
        assert_eq!(table.columns, vec!["a"]);
        assert_eq!(table.rows[0]["a"], Some("2".to_string()));
    }

    #[test]
    fn quotes_are_plain_characters() {
        // "x,y" splits on the comma like any other field.
        let table = parse_csv("a,b,c\n\"x,y\",z").unwrap();
        assert_eq!(table.rows[0]["a"], Some("\"x".to_string()));
        assert_eq!(table.rows[0]["b"], Some("y\"".to_string()));
        assert_eq!(table.rows[0]["c"], Some("z".to_string()));
        assert_eq!(table.skipped, 0);
    }
}
