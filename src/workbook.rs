use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use tracing::info;

use crate::normalize::{normalize_cell, normalize_str};
use crate::table::Table;

/// Detected file format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Excel,
    Csv,
    Tsv,
}

impl FileFormat {
    /// Detect format from file extension. Unknown extensions are read
    /// as comma-delimited text.
    fn from_extension(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => FileFormat::Excel,
            "tsv" => FileFormat::Tsv,
            _ => FileFormat::Csv,
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            FileFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

enum Source {
    Excel(Sheets<BufReader<File>>),
    Delimited { delimiter: u8 },
}

/// An opened spreadsheet file: a set of named sheets, each decodable
/// into a [`Table`]. Delimited text files present as a single sheet.
pub struct Workbook {
    path: PathBuf,
    source: Source,
    sheet_names: Vec<String>,
}

impl Workbook {
    pub fn open(path: &Path, delimiter: Option<u8>) -> io::Result<Self> {
        let format = FileFormat::from_extension(path);
        info!(path = %path.display(), ?format, "opening workbook");

        match format {
            FileFormat::Excel => {
                let workbook = open_workbook_auto(path).map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidData, format!("Unable to read file: {}", e))
                })?;
                let sheet_names = workbook.sheet_names().to_vec();
                if sheet_names.is_empty() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "No sheets found in file.",
                    ));
                }
                Ok(Self {
                    path: path.to_path_buf(),
                    source: Source::Excel(workbook),
                    sheet_names,
                })
            }
            FileFormat::Csv | FileFormat::Tsv => {
                // fail fast on unreadable paths
                File::open(path)?;
                Ok(Self {
                    path: path.to_path_buf(),
                    source: Source::Delimited {
                        delimiter: delimiter.unwrap_or_else(|| format.delimiter()),
                    },
                    sheet_names: vec!["Sheet1".to_string()],
                })
            }
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Decode one sheet into headers + rows, normalizing every cell.
    /// A sheet with no rows, or whose first row is blank, yields the
    /// explicit empty table rather than an error.
    pub fn sheet(&mut self, name: &str) -> io::Result<Table> {
        let table = match &mut self.source {
            Source::Excel(workbook) => {
                let range = workbook.worksheet_range(name).map_err(|e| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Failed to read sheet '{}': {}", name, e),
                    )
                })?;
                sheet_from_range(&range)
            }
            Source::Delimited { delimiter } => read_delimited(&self.path, *delimiter)?,
        };
        info!(
            sheet = name,
            rows = table.row_count(),
            cols = table.col_count(),
            "sheet decoded"
        );
        Ok(table)
    }
}

fn sheet_from_range(range: &calamine::Range<Data>) -> Table {
    let mut rows_iter = range.rows();
    let header_row = match rows_iter.next() {
        Some(r) => r,
        None => return Table::empty(),
    };
    if header_row.iter().all(|c| matches!(c, Data::Empty)) {
        return Table::empty();
    }

    let headers: Vec<String> = header_row.iter().map(normalize_cell).collect();
    let rows: Vec<Vec<String>> = rows_iter
        .map(|row| row.iter().map(normalize_cell).collect())
        .collect();
    Table::new(headers, rows)
}

fn read_delimited(path: &Path, delimiter: u8) -> io::Result<Table> {
    let file = File::open(path)?;
    let reader = BufReader::with_capacity(1 << 20, file); // 1 MB

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let headers: Vec<String> = match records.next() {
        Some(first) => {
            let record = first.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            record.iter().map(|s| s.to_string()).collect()
        }
        None => return Ok(Table::empty()),
    };
    if headers.iter().all(|h| h.is_empty()) {
        return Ok(Table::empty());
    }

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        rows.push(record.iter().map(normalize_str).collect());
    }
    Ok(Table::new(headers, rows))
}
