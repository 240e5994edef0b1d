//! Reads uploaded bytes into header-keyed records.
//!
//! `.csv` uploads go through the `csv` reader; everything else is handed to calamine,
//! which detects xlsx/xlsm/xlsb/xls/ods from the content. Only the first sheet of a
//! workbook is read.
//!
//! In both cases the first non-empty row is the header, fully empty rows are skipped,
//! and empty cells are left out of the record.

use crate::error::IngestError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashMap;
use std::io::Cursor;

/// One data row: trimmed header -> non-empty cell text.
pub type Record = HashMap<String, String>;

/// Parses an upload into records, in row order.
///
/// An unreadable file fails with `ParseFailure`; a readable file without data rows
/// yields an empty vector.
pub fn read_records(file_name: &str, bytes: &[u8]) -> Result<Vec<Record>, IngestError> {
    let rows = if is_csv(file_name) {
        read_csv_rows(bytes)?
    } else {
        read_workbook_rows(bytes)?
    };
    Ok(records_from_rows(rows))
}

fn is_csv(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".csv")
}

fn read_csv_rows(bytes: &[u8]) -> Result<Vec<Vec<Option<String>>>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::ParseFailure(e.to_string()))?;
        rows.push(record.iter().map(non_empty).collect());
    }
    Ok(rows)
}

fn read_workbook_rows(bytes: &[u8]) -> Result<Vec<Vec<Option<String>>>, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IngestError::ParseFailure(e.to_string()))?;

    let sheet = match workbook.sheet_names().first() {
        Some(name) => name.clone(),
        None => return Err(IngestError::ParseFailure("workbook has no sheets".to_string())),
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| IngestError::ParseFailure(format!("sheet '{}': {}", sheet, e)))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_text).collect())
        .collect())
}

fn non_empty(cell: &str) -> Option<String> {
    let cell = cell.trim();
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Whole floats lose their fractional part so `9.0` in a `Class` column reads as `9`.
fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => non_empty(s),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Some((*f as i64).to_string())
        }
        other => non_empty(&other.to_string()),
    }
}

fn records_from_rows(rows: Vec<Vec<Option<String>>>) -> Vec<Record> {
    let mut rows = rows
        .into_iter()
        .filter(|row| row.iter().any(Option::is_some));

    let header: Vec<Option<String>> = match rows.next() {
        Some(header) => header,
        None => return Vec::new(),
    };

    rows.map(|row| {
        let mut record = Record::new();
        for (column, cell) in header.iter().zip(row) {
            if let (Some(column), Some(cell)) = (column, cell) {
                record.entry(column.clone()).or_insert(cell);
            }
        }
        record
    })
    .collect()
}
