use crate::error::TransformError;
use crate::structs::{Row, Table, Value};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use std::collections::HashSet;

/// Name of the column normalized to timestamps.
pub const DATE_COLUMN: &str = "Date";

// Two-digit-year formats come first: `%Y` would happily read "22" as year 22.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m-%d-%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Cleans a freshly extracted table.
///
/// Steps, in order:
/// 1. drop exact duplicate rows, keeping the first occurrence
/// 2. drop rows holding a missing value in any column
/// 3. parse the `Date` column (when present) into timestamps, then drop rows
///    that became duplicates because their dates were spelled differently
///
/// Running it on its own output returns the same table.
///
/// # Errors
///
/// Returns `TransformError::Parse` for the first `Date` value that is not a
/// recognizable date; no partial table is returned.
pub fn transform_data(table: Table) -> Result<Table, TransformError> {
    info!("Starting data transformation");
    let (columns, rows) = table.into_rows();

    let initial_count = rows.len();
    let rows = drop_duplicates(rows);
    info!(
        "Removed {} duplicate records",
        initial_count - rows.len()
    );

    let rows = drop_missing(rows);
    info!(
        "Data shape after dropping missing values: ({}, {})",
        rows.len(),
        columns.len()
    );

    let rows = match columns.iter().position(|c| c == DATE_COLUMN) {
        Some(index) => {
            let rows = normalize_dates(rows, index)?;
            info!("Converted '{}' column to datetime", DATE_COLUMN);
            // Different spellings of one date are duplicates once parsed.
            let parsed_count = rows.len();
            let rows = drop_duplicates(rows);
            info!(
                "Removed {} duplicate records after date conversion",
                parsed_count - rows.len()
            );
            rows
        }
        None => {
            debug!("No '{}' column, skipping date conversion", DATE_COLUMN);
            rows
        }
    };

    let table = Table::new(columns, rows)?;
    let (n_rows, n_cols) = table.shape();
    info!("Data shape after transformation: ({}, {})", n_rows, n_cols);
    Ok(table)
}

fn drop_duplicates(rows: Vec<Row>) -> Vec<Row> {
    let mut seen: HashSet<Row> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect()
}

fn drop_missing(mut rows: Vec<Row>) -> Vec<Row> {
    rows.retain(|row| !row.iter().any(Value::is_null));
    rows
}

fn normalize_dates(mut rows: Vec<Row>, index: usize) -> Result<Vec<Row>, TransformError> {
    for (i, row) in rows.iter_mut().enumerate() {
        let parsed = to_timestamp(&row[index]).ok_or_else(|| TransformError::Parse {
            row: i + 1,
            column: DATE_COLUMN.to_string(),
            value: row[index].to_string(),
        })?;
        row[index] = Value::Timestamp(parsed);
    }
    Ok(rows)
}

fn to_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Timestamp(t) => Some(*t),
        Value::Text(s) => parse_date(s),
        Value::Integer(i) => parse_date(&i.to_string()),
        _ => None,
    }
}

/// Parses the date spellings found in sales exports.
///
/// Date-only inputs become midnight timestamps, so `2022-01-01` and
/// `01/01/2022` compare equal.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year = s[0..4].parse().ok()?;
        let month = s[4..6].parse().ok()?;
        let day = s[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0);
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
