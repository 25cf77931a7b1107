//! Local workbook reader (xlsx, xls, ods)

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};
use serde_json::{Value, json};

/// Read every row of a worksheet (the first one when unnamed)
pub fn read_workbook_values(path: &Path, worksheet: Option<&str>) -> Result<Vec<Vec<Value>>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet_name = match worksheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .with_context(|| format!("Workbook has no sheets: {}", path.display()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_value).collect())
        .collect())
}

/// Convert a workbook cell to the JSON scalar a spreadsheet API would report
pub fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => json!(*i),
        Data::Float(f) => {
            // Whole numbers come back without a fractional part
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                json!(*f as i64)
            } else {
                json!(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => serial_to_text(dt.as_f64())
            .map(Value::String)
            .unwrap_or_else(|| json!(dt.as_f64())),
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) => Value::Null,
    }
}

/// Render an Excel serial date as `YYYY/MM/DD[ HH:MM:SS]`
fn serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let dt = epoch.checked_add_signed(Duration::milliseconds(millis))?;

    if serial.fract() == 0.0 {
        Some(dt.format("%Y/%m/%d").to_string())
    } else {
        Some(dt.format("%Y/%m/%d %H:%M:%S").to_string())
    }
}
