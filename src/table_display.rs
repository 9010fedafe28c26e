use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;
use std::io::Write;
use std::path::Path;

use crate::data::cell_format::{plain_text, CellContent, FormatContext};
use crate::data::columns::ColumnDescriptor;
use crate::data::record_view::RecordView;

/// Grid as a comfy-table, using the same compact cell formatting as the TUI.
/// `columns` must already be in display order; `frozen` marks pinned headers.
pub fn build_print_table(columns: &[ColumnDescriptor], view: &RecordView, frozen: &[String]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(columns.iter().map(|col| {
        let cell = Cell::new(&col.display_label).add_attribute(Attribute::Bold);
        if frozen.contains(&col.id) {
            cell.fg(Color::Blue)
        } else {
            cell
        }
    }));

    for record in view.rows() {
        table.add_row(columns.iter().map(|col| match col.format(record.get(&col.id), FormatContext::Grid) {
            CellContent::Badge { display, .. } => Cell::new(display).add_attribute(Attribute::Bold),
            other => Cell::new(other.display(FormatContext::Grid)),
        }));
    }

    table
}

pub fn display_grid(columns: &[ColumnDescriptor], view: &RecordView, frozen: &[String]) {
    if view.is_empty() {
        println!("{}", "No results.".yellow());
        return;
    }
    println!("{}", build_print_table(columns, view, frozen));
    println!("\n{}", format!("{} rows", view.row_count()).green());
}

/// Write the view's rows as CSV with untruncated values; returns the row count
pub fn export_to_csv<W: Write>(writer: W, columns: &[ColumnDescriptor], view: &RecordView) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(columns.iter().map(|c| c.id.as_str()))?;

    let mut rows = 0;
    for record in view.rows() {
        wtr.write_record(
            columns
                .iter()
                .map(|col| record.get(&col.id).map(plain_text).unwrap_or_default()),
        )?;
        rows += 1;
    }

    wtr.flush()?;
    Ok(rows)
}

pub fn export_to_csv_file(path: &Path, columns: &[ColumnDescriptor], view: &RecordView) -> Result<usize> {
    let file = std::fs::File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let rows = export_to_csv(file, columns, view)?;
    tracing::info!(target: "table", "Exported {} rows to {}", rows, path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::synthesize_columns;
    use crate::data::record::Record;
    use serde_json::json;
    use std::sync::Arc;

    fn view() -> RecordView {
        RecordView::new(Arc::new(vec![
            Record::from_json("r1", json!({"Name": "Ann", "Tags": ["a", "b"], "Meta": {"k": 1}})),
            Record::from_json("r2", json!({"Name": "A very long candidate name", "Tags": null})),
        ]))
    }

    #[test]
    fn test_csv_has_full_values() {
        let cols = synthesize_columns(&["Meta".to_string(), "Name".to_string(), "Tags".to_string()]);
        let mut out = Vec::new();
        let rows = export_to_csv(&mut out, &cols, &view()).unwrap();
        assert_eq!(rows, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Meta,Name,Tags");
        assert_eq!(lines[1], r#""{""k"":1}",Ann,"a, b""#);
        assert_eq!(lines[2], ",A very long candidate name,");
    }

    #[test]
    fn test_print_table_truncates() {
        let cols = synthesize_columns(&["Name".to_string()]);
        let rendered = build_print_table(&cols, &view(), &[]).to_string();
        assert!(rendered.contains("A very long can..."));
    }
}
