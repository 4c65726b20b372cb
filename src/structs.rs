use chrono::{Local, NaiveDateTime, NaiveTime};
use log::{LevelFilter, Log, Metadata, Record as LogRecord, SetLoggerError};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::ShapeError;

/// Simple logger implementation
pub struct SimpleLogger;

static LOGGER: SimpleLogger = SimpleLogger;

impl SimpleLogger {
    /// Installs the process logger at the given level. Fails if a logger is already set.
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &LogRecord) {
        if !self.enabled(record.metadata()) {
            return;
        }
        println!(
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            record.target(),
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// A single table cell.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell, used for summing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) => 2,
            Value::Float(_) => 3,
            Value::Text(_) => 4,
            Value::Timestamp(_) => 5,
        }
    }
}

// Floats compare by bit pattern so that equality, ordering and hashing agree.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Timestamp(t) => t.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(t) if t.time() == NaiveTime::MIN => {
                write!(f, "{}", t.format("%Y-%m-%d"))
            }
            Value::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

pub type Row = Vec<Value>;

/// Rows of values under a fixed, ordered set of column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Builds a table, rejecting any row whose width differs from the header.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self, ShapeError> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ShapeError {
                row: index + 1,
                expected: columns.len(),
                found: row.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn into_rows(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    #[test]
    fn values_render_in_natural_form() {
        let midnight = NaiveDate::from_ymd_opt(2022, 4, 30)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let afternoon = midnight + chrono::Duration::hours(15);

        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Boolean(false).to_string(), "False");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Float(10.0).to_string(), "10.0");
        assert_eq!(Value::Float(647.62).to_string(), "647.62");
        assert_eq!(Value::Timestamp(midnight).to_string(), "2022-04-30");
        assert_eq!(
            Value::Timestamp(afternoon).to_string(),
            "2022-04-30 15:00:00"
        );
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Value::Float(1.5), Value::Float(1.5));
        assert_ne!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::Text("1".into()), Value::Integer(1));

        let rows: HashSet<Row> = [
            vec![Value::Text("Set".into()), Value::Float(2.5)],
            vec![Value::Text("Set".into()), Value::Float(2.5)],
        ]
        .into_iter()
        .collect();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::new(
            vec!["SKU".into(), "Amount".into()],
            vec![vec![Value::Text("A".into())]],
        )
        .unwrap_err();
        assert_eq!((err.row, err.expected, err.found), (1, 2, 1));
    }

    #[test]
    fn reports_shape_and_column_lookup() {
        let table = Table::new(
            vec!["SKU".into(), "Amount".into()],
            vec![vec![Value::Text("A".into()), Value::Integer(3)]],
        )
        .unwrap();
        assert_eq!(table.shape(), (1, 2));
        assert_eq!(table.column_index("Amount"), Some(1));
        assert_eq!(table.column_index("Date"), None);
    }
}
