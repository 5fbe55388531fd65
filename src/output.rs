use crate::error::ExportError;
use crate::types::Row;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Write report rows as CSV, headers taken from the row type. Returns the
/// number of data rows written.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<usize, ExportError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    finish(wtr, path)?;
    Ok(rows.len())
}

/// Column order for a raw export: every header in first-seen order.
pub fn raw_headers(rows: &[&Row]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for name in row.keys() {
            if !headers.contains(name) {
                headers.push(name.clone());
            }
        }
    }
    headers
}

/// Write sheet rows back out as CSV, keeping the sheet's header names and
/// order. Cells a row lacks are written empty.
pub fn write_rows_csv(path: &Path, rows: &[&Row]) -> Result<usize, ExportError> {
    let headers = raw_headers(rows);
    let mut wtr = csv::Writer::from_path(path)?;
    if !headers.is_empty() {
        wtr.write_record(&headers)?;
    }
    for row in rows {
        wtr.write_record(
            headers
                .iter()
                .map(|name| row.get(name).map_or("", String::as_str)),
        )?;
    }
    finish(wtr, path)?;
    Ok(rows.len())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|source| io_error(path, source))
}

fn finish(mut wtr: csv::Writer<std::fs::File>, path: &Path) -> Result<(), ExportError> {
    wtr.flush().map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Markdown table of the first `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BreakdownRow;

    fn sample() -> Vec<BreakdownRow> {
        vec![
            BreakdownRow {
                category: "Live".to_string(),
                count: 3,
                share: "75.0%".to_string(),
            },
            BreakdownRow {
                category: "Posted".to_string(),
                count: 1,
                share: "25.0%".to_string(),
            },
        ]
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_markdown_preview() {
        let table = render_table(&sample(), 1);
        assert!(table.contains("| Category |"));
        assert!(table.contains("Live"));
        assert!(!table.contains("Posted"));
        assert_eq!(render_table::<BreakdownRow>(&[], 5), "(no rows)");
    }

    #[test]
    fn writes_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("breakdown.csv");
        let json_path = dir.path().join("breakdown.json");
        assert_eq!(write_csv(&csv_path, &sample()).unwrap(), 2);
        write_json(&json_path, &sample()).unwrap();

        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv_text.starts_with("Category,Count,Share\n"));
        assert!(csv_text.contains("Live,3,75.0%"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json[0]["Count"], 3);
    }

    #[test]
    fn raw_rows_keep_sheet_column_order() {
        let first = row(&[("Client", "Acme"), (" reporting CM", "Sam"), ("Total leads dialled", "1,000")]);
        let second = row(&[("Client", "Globex"), ("Bot Name", "SMS Blast")]);
        assert_eq!(
            raw_headers(&[&first, &second]),
            vec!["Client", " reporting CM", "Total leads dialled", "Bot Name"]
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campaign_data.csv");
        assert_eq!(write_rows_csv(&path, &[&first, &second]).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Client, reporting CM,Total leads dialled,Bot Name");
        assert_eq!(lines[1], "Acme,Sam,\"1,000\",");
        assert_eq!(lines[2], "Globex,,,SMS Blast");
    }

    #[test]
    fn empty_export_writes_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert_eq!(write_rows_csv(&path, &[]).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn unwritable_path_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("snapshot.json");
        let err = write_json(&path, &sample()).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
