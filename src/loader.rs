use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::LoadError;
use crate::models::RawTable;
use crate::normalize::format_date;

pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xlsm" | "xls" | "ods" => read_xlsx(path, sheet),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

pub fn read_csv(path: &Path) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        if cells.len() < headers.len() {
            cells.resize(headers.len(), String::new());
        }
        rows.push(cells);
    }

    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(RawTable::new(headers, rows))
}

/// Reads the named sheet, or the first one when no name is given.
pub fn read_xlsx(path: &Path, sheet: Option<&str>) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|candidate| candidate == name) {
                return Err(LoadError::SheetNotFound(name.to_string()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LoadError::SheetNotFound("first sheet".to_string()))??,
    };

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|cell| cell_to_string(cell).trim().to_string())
            .collect(),
        None => return Ok(RawTable::default()),
    };

    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(RawTable::new(headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => format!("{}", f),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR({:?})", e),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => format_date(value.date()),
            None => dt.to_string(),
        },
        Data::DateTimeIso(s) => iso_to_date_text(s),
        Data::DurationIso(s) => s.clone(),
    }
}

fn iso_to_date_text(value: &str) -> String {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map(format_date)
        .unwrap_or_else(|_| value.to_string())
}
