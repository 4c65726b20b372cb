use crate::error::LoadError;
use crate::structs::{Row, Table, Value};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use std::collections::HashSet;
use std::path::Path;

/// Cell contents treated as missing values.
const NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "<NA>",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
}

/// Reads a UTF-8 CSV file with a header row into a [`Table`].
///
/// Column types are inferred from the file contents: a column whose present
/// cells are all integers becomes `Integer`, all numbers `Float`, all
/// `True`/`False` `Boolean`, and anything else stays `Text`. Missing-value
/// markers (see `NA_VALUES`) become [`Value::Null`].
///
/// # Errors
///
/// Returns `LoadError` if the file does not exist or cannot be read, if a
/// record is ragged or not valid UTF-8, if there is no header line, or if a
/// column name is repeated.
pub fn extract_data(file_path: &Path) -> Result<Table, LoadError> {
    info!("Extracting data from {}", file_path.display());

    if !file_path.exists() {
        return Err(LoadError::NotFound(file_path.to_path_buf()));
    }
    let malformed = |source: csv::Error| {
        if source.is_io_error() {
            LoadError::Unreadable {
                path: file_path.to_path_buf(),
                source: source.into(),
            }
        } else {
            LoadError::Malformed {
                path: file_path.to_path_buf(),
                source,
            }
        }
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(file_path)
        .map_err(malformed)?;

    let headers = reader.headers().map_err(malformed)?.clone();
    if headers.is_empty() {
        return Err(LoadError::Empty(file_path.to_path_buf()));
    }
    let columns = column_names(&headers)?;
    debug!("Header has {} columns: {:?}", columns.len(), columns);

    let mut raw: Vec<StringRecord> = Vec::new();
    for record in reader.records() {
        raw.push(record.map_err(malformed)?);
    }

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|i| infer_kind(raw.iter().map(|r| r.get(i).unwrap_or(""))))
        .collect();
    debug!("Inferred column kinds: {:?}", kinds);

    let rows: Vec<Row> = raw
        .iter()
        .map(|record| {
            kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| parse_cell(record.get(i).unwrap_or(""), *kind))
                .collect()
        })
        .collect();

    let table = Table::new(columns, rows)?;

    info!("Extracted {} records", table.len());
    Ok(table)
}

/// Names blank header cells `Unnamed: <index>` and rejects repeated names.
fn column_names(headers: &StringRecord) -> Result<Vec<String>, LoadError> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let name = if name.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name.to_string()
            };
            if !seen.insert(name.clone()) {
                return Err(LoadError::DuplicateColumn(name));
            }
            Ok(name)
        })
        .collect()
}

fn is_missing(cell: &str) -> bool {
    NA_VALUES.contains(&cell.trim())
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut integer = true;
    let mut float = true;
    let mut boolean = true;

    for cell in cells.filter(|c| !is_missing(c)) {
        let cell = cell.trim();
        integer = integer && cell.parse::<i64>().is_ok();
        float = float && cell.parse::<f64>().is_ok();
        boolean = boolean && parse_bool(cell).is_some();
        if !(integer || float || boolean) {
            return ColumnKind::Text;
        }
    }

    if integer {
        ColumnKind::Integer
    } else if float {
        ColumnKind::Float
    } else if boolean {
        ColumnKind::Boolean
    } else {
        ColumnKind::Text
    }
}

fn parse_cell(cell: &str, kind: ColumnKind) -> Value {
    if is_missing(cell) {
        return Value::Null;
    }
    let trimmed = cell.trim();
    // Inference guarantees the parse succeeds for every present cell.
    match kind {
        ColumnKind::Integer => trimmed
            .parse()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(cell.to_string())),
        ColumnKind::Float => trimmed
            .parse()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Text(cell.to_string())),
        ColumnKind::Boolean => parse_bool(trimmed)
            .map(Value::Boolean)
            .unwrap_or_else(|| Value::Text(cell.to_string())),
        ColumnKind::Text => Value::Text(cell.to_string()),
    }
}
