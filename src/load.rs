use crate::error::PublishError;
use crate::storage::ObjectStore;
use crate::structs::Table;
use chrono::{Local, NaiveDateTime};
use csv::Writer;
use log::info;
use std::io::Write;
use std::{fs, fs::File, path::Path};

pub const OBJECT_KEY_PREFIX: &str = "cleaned_sales_data";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Where a table ended up after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub bucket: String,
    pub key: String,
    pub bytes: usize,
}

/// Serializes a table as CSV: one header row, then one line per row.
///
/// Values are written in their natural textual form with standard quoting.
/// No index column is emitted.
///
/// # Errors
/// Returns error if the writer fails.
pub fn write_table<W: Write>(table: &Table, out: W) -> Result<(), PublishError> {
    let mut writer = Writer::from_writer(out);

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

/// Serializes a table into an in-memory CSV body for an upload.
///
/// # Arguments
/// * `table` - Cleaned table to serialize
///
/// # Returns
/// Returns the UTF-8 CSV bytes: header row plus one line per row.
///
/// # Errors
/// Returns error if CSV serialization fails.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>, PublishError> {
    let mut buffer = Vec::new();
    write_table(table, &mut buffer)?;
    Ok(buffer)
}

/// Writes the cleaned table to a local CSV file, creating parent directories.
///
/// # Errors
/// Returns error if the file cannot be created or written to.
pub fn write_csv(table: &Table, output_path: &Path) -> Result<(), PublishError> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(output_path)?;
    write_table(table, file)?;
    info!("Saved cleaned data to {}", output_path.display());
    Ok(())
}

/// `cleaned_sales_data_YYYYMMDD_HHMMSS.csv` for the given moment.
pub fn object_key(at: NaiveDateTime) -> String {
    format!("{}_{}.csv", OBJECT_KEY_PREFIX, at.format("%Y%m%d_%H%M%S"))
}

/// Object key for a run starting now, in local time.
///
/// # Returns
/// Returns `cleaned_sales_data_YYYYMMDD_HHMMSS.csv`. Runs started in
/// different seconds get different keys.
pub fn object_key_now() -> String {
    object_key(Local::now().naive_local())
}

/// Uploads the table as a single CSV object.
///
/// # Arguments
/// * `table` - Cleaned table to publish
/// * `store` - Object store receiving the write
/// * `bucket` - Destination bucket name
/// * `key` - Object key, usually from [`object_key_now`]
///
/// # Returns
/// Returns a `PublishReceipt` with the destination and body size.
///
/// # Errors
/// Returns `PublishError` if serialization fails or the store rejects the
/// write. There are no retries: the first failure is returned.
pub fn upload_table(
    table: &Table,
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<PublishReceipt, PublishError> {
    info!("Uploading {} to bucket {}", key, bucket);
    let body = to_csv_bytes(table)?;

    store.put_object(bucket, key, &body, CSV_CONTENT_TYPE)?;

    info!("Upload successful ({} bytes)", body.len());
    Ok(PublishReceipt {
        bucket: bucket.to_string(),
        key: key.to_string(),
        bytes: body.len(),
    })
}
