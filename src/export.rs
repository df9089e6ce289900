//! Export of the currently displayed selection.
//!
//! Both exporters materialize the same thing the table view shows: the
//! visible columns, over the match set when a filter is active and all
//! rows otherwise.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use rust_xlsxwriter::Workbook as XlsxWorkbook;
use tracing::info;

use crate::table::Table;

pub const CSV_FILENAME: &str = "export.csv";
pub const XLSX_FILENAME: &str = "export.xlsx";

/// Write the selection as RFC4180-style CSV: every field quoted,
/// embedded quotes doubled, CRLF row endings.
pub fn write_csv(table: &Table, rows: &[usize], cols: &[usize], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    let header: Vec<&str> = cols
        .iter()
        .map(|&c| table.headers().get(c).map(String::as_str).unwrap_or(""))
        .collect();
    csv_writer
        .write_record(&header)
        .map_err(to_io_error)?;

    for &row in rows {
        let record: Vec<&str> = cols.iter().map(|&c| table.cell(row, c)).collect();
        csv_writer.write_record(&record).map_err(to_io_error)?;
    }
    csv_writer.flush()?;
    info!(rows = rows.len(), cols = cols.len(), path = %path.display(), "csv export written");
    Ok(())
}

/// Write the selection as an XLSX workbook with a single sheet named
/// "Export".
pub fn write_xlsx(table: &Table, rows: &[usize], cols: &[usize], path: &Path) -> io::Result<()> {
    let mut workbook = XlsxWorkbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Export").map_err(to_io_error)?;

    for (out_col, &c) in cols.iter().enumerate() {
        let name = table.headers().get(c).map(String::as_str).unwrap_or("");
        sheet
            .write_string(0, out_col as u16, name)
            .map_err(to_io_error)?;
    }
    for (out_row, &row) in rows.iter().enumerate() {
        for (out_col, &c) in cols.iter().enumerate() {
            sheet
                .write_string(out_row as u32 + 1, out_col as u16, table.cell(row, c))
                .map_err(to_io_error)?;
        }
    }

    workbook.save(path).map_err(to_io_error)?;
    info!(rows = rows.len(), cols = cols.len(), path = %path.display(), "xlsx export written");
    Ok(())
}

fn to_io_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::Workbook;
    use tempfile::TempDir;

    fn sample() -> Table {
        Table::new(
            vec!["Name".into(), "Age".into(), "Note".into()],
            vec![
                vec!["Ann".into(), "30".into(), "likes \"quotes\"".into()],
                vec!["Bo".into(), "41".into(), "plain".into()],
            ],
        )
    }

    #[test]
    fn test_csv_quoting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let t = sample();
        write_csv(&t, &[0, 1], &[0, 1, 2], &path).unwrap();

        let content = std::fs::read(&path).unwrap();
        let content = String::from_utf8(content).unwrap();
        let lines: Vec<&str> = content.split("\r\n").collect();
        assert_eq!(lines[0], "\"Name\",\"Age\",\"Note\"");
        assert_eq!(lines[1], "\"Ann\",\"30\",\"likes \"\"quotes\"\"\"");
        assert_eq!(lines[2], "\"Bo\",\"41\",\"plain\"");
    }

    #[test]
    fn test_csv_respects_row_and_column_selection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let t = sample();
        // only row 1, only columns Name and Note
        write_csv(&t, &[1], &[0, 2], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Bo\",\"plain\""));
        assert!(!content.contains("Ann"));
        assert!(!content.contains("41"));
    }

    #[test]
    fn test_csv_roundtrip_through_loader() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");
        let t = sample();
        write_csv(&t, &[0, 1], &[0, 1, 2], &path).unwrap();

        let mut wb = Workbook::open(&path, None).unwrap();
        let reloaded = wb.sheet("Sheet1").unwrap();
        assert_eq!(reloaded.headers(), t.headers());
        assert_eq!(reloaded.row_count(), t.row_count());
        for row in 0..t.row_count() {
            for col in 0..t.col_count() {
                assert_eq!(reloaded.cell(row, col), t.cell(row, col));
            }
        }
    }

    #[test]
    fn test_xlsx_roundtrip_through_loader() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.xlsx");
        let t = sample();
        write_xlsx(&t, &[0, 1], &[0, 1], &path).unwrap();

        let mut wb = Workbook::open(&path, None).unwrap();
        assert_eq!(wb.sheet_names(), ["Export"]);
        let reloaded = wb.sheet("Export").unwrap();
        assert_eq!(reloaded.headers(), ["Name", "Age"]);
        assert_eq!(reloaded.cell(0, 0), "Ann");
        assert_eq!(reloaded.cell(1, 1), "41");
    }
}
