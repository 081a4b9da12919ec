//! # Data Provider - Tabular Files as Row-Records
//!
//! Thin adapter exposing spreadsheet contents as row-records for data-driven
//! journeys. Parsing itself is delegated to two existing libraries and this
//! module only dispatches and reshapes:
//!
//! - workbook formats (`.xlsx`, `.xls`, `.xlsb`, `.ods`) via `calamine`
//! - `.csv` via the `csv` crate, presented as a single pseudo-sheet named
//!   after the file stem
//!
//! The first row is the header row; every following row becomes one record
//! mapping column name to cell value. A typical harness reads one record per
//! city-pair/date input and resolves one journey from each via
//! `ParamContext::from_record`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::ProviderError;

/// One spreadsheet row, keyed by column name.
pub type Record = HashMap<String, Value>;

enum Format {
    Csv,
    Workbook,
}

fn detect_format(path: &Path) -> Result<Format, ProviderError> {
    if !path.exists() {
        return Err(ProviderError::FileNotFound(path.to_path_buf()));
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => Ok(Format::Csv),
        Some("xlsx") | Some("xls") | Some("xlsb") | Some("ods") => Ok(Format::Workbook),
        _ => Err(ProviderError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn pseudo_sheet_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sheet")
        .to_string()
}

fn data_to_value(data: &Data) -> Value {
    match data {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => Value::from(*f),
        Data::DateTime(dt) => Value::from(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => Value::String(e.to_string()),
    }
}

/// Reads all data rows of a file, mapping column names to cell values.
///
/// `sheet` selects a workbook sheet by name; `None` reads the first sheet.
/// For CSV files the only valid sheet name is the file stem.
pub fn read_rows(
    path: impl AsRef<Path>,
    sheet: Option<&str>,
) -> Result<Vec<Record>, ProviderError> {
    let path = path.as_ref();
    let rows = match detect_format(path)? {
        Format::Csv => {
            check_csv_sheet(path, sheet)?;
            let mut reader = csv::Reader::from_path(path)?;
            let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
            let mut rows = Vec::new();
            for record in reader.records() {
                let record = record?;
                let mut row = Record::new();
                for (i, header) in headers.iter().enumerate() {
                    let cell = record.get(i).unwrap_or_default();
                    row.insert(header.clone(), Value::String(cell.to_string()));
                }
                rows.push(row);
            }
            rows
        }
        Format::Workbook => {
            let range = workbook_range(path, sheet)?;
            let mut iter = range.rows();
            let headers: Vec<String> = match iter.next() {
                Some(header_row) => header_row
                    .iter()
                    .map(|cell| match cell {
                        Data::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                None => return Ok(Vec::new()),
            };
            iter.map(|cells| {
                headers
                    .iter()
                    .zip(cells.iter())
                    .map(|(header, cell)| (header.clone(), data_to_value(cell)))
                    .collect()
            })
            .collect()
        }
    };
    info!(path = %path.display(), rows = rows.len(), "tabular rows read");
    Ok(rows)
}

/// Lists the sheet names of a file. CSV files expose one pseudo-sheet.
pub fn list_sheets(path: impl AsRef<Path>) -> Result<Vec<String>, ProviderError> {
    let path = path.as_ref();
    match detect_format(path)? {
        Format::Csv => Ok(vec![pseudo_sheet_name(path)]),
        Format::Workbook => {
            let workbook = open_workbook_auto(path)?;
            Ok(workbook.sheet_names())
        }
    }
}

/// Reads a single cell value. `row` and `col` are 1-based and the header
/// row counts as row 1, matching the spreadsheet view.
pub fn read_cell(
    path: impl AsRef<Path>,
    row: u32,
    col: u32,
    sheet: Option<&str>,
) -> Result<Value, ProviderError> {
    let path = path.as_ref();
    if row == 0 || col == 0 {
        return Err(ProviderError::CellOutOfRange { row, col });
    }
    match detect_format(path)? {
        Format::Csv => {
            check_csv_sheet(path, sheet)?;
            let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
            for (i, record) in reader.records().enumerate() {
                if i as u32 + 1 == row {
                    let record = record?;
                    return record
                        .get(col as usize - 1)
                        .map(|cell| Value::String(cell.to_string()))
                        .ok_or(ProviderError::CellOutOfRange { row, col });
                }
            }
            Err(ProviderError::CellOutOfRange { row, col })
        }
        Format::Workbook => {
            let range = workbook_range(path, sheet)?;
            range
                .rows()
                .nth(row as usize - 1)
                .and_then(|cells| cells.get(col as usize - 1))
                .map(data_to_value)
                .ok_or(ProviderError::CellOutOfRange { row, col })
        }
    }
}

/// Checks that the file's header row matches the expected column names.
///
/// Order-insensitive set comparison, as a data-driven harness cares about
/// presence, not position.
pub fn validate_columns(
    path: impl AsRef<Path>,
    expected: &[&str],
) -> Result<bool, ProviderError> {
    let path = path.as_ref();
    let actual: Vec<String> = match detect_format(path)? {
        Format::Csv => {
            let mut reader = csv::Reader::from_path(path)?;
            reader.headers()?.iter().map(str::to_string).collect()
        }
        Format::Workbook => {
            let range = workbook_range(path, None)?;
            match range.rows().next() {
                Some(cells) => cells.iter().map(|c| c.to_string()).collect(),
                None => Vec::new(),
            }
        }
    };

    let actual_set: HashSet<&str> = actual.iter().map(String::as_str).collect();
    let expected_set: HashSet<&str> = expected.iter().copied().collect();
    let matches = actual_set == expected_set;
    if !matches {
        warn!(
            path = %path.display(),
            expected = ?expected,
            actual = ?actual,
            "column structure mismatch"
        );
    }
    Ok(matches)
}

fn check_csv_sheet(path: &Path, sheet: Option<&str>) -> Result<(), ProviderError> {
    if let Some(requested) = sheet {
        let available = pseudo_sheet_name(path);
        if requested != available {
            return Err(ProviderError::UnknownSheet {
                requested: requested.to_string(),
                available,
            });
        }
    }
    Ok(())
}

fn workbook_range(
    path: &Path,
    sheet: Option<&str>,
) -> Result<calamine::Range<Data>, ProviderError> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(requested) => {
            if !names.iter().any(|n| n == requested) {
                return Err(ProviderError::UnknownSheet {
                    requested: requested.to_string(),
                    available: names.join(", "),
                });
            }
            requested.to_string()
        }
        None => names
            .first()
            .cloned()
            .ok_or_else(|| ProviderError::UnknownSheet {
                requested: "<first>".to_string(),
                available: String::new(),
            })?,
    };
    Ok(workbook.worksheet_range(&name)?)
}
