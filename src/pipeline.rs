use crate::analyze::{SummaryReport, analyze_data};
use crate::error::Result;
use crate::extract::extract_data;
use crate::load::{PublishReceipt, upload_table, write_csv};
use crate::storage::ObjectStore;
use crate::transform::transform_data;
use log::info;
use std::path::PathBuf;

/// Inputs of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_file: PathBuf,
    pub bucket: String,
    pub key: String,
    /// Optional local copy of the cleaned table.
    pub processed_output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub extracted_rows: usize,
    /// (rows, columns) of the cleaned table
    pub cleaned_shape: (usize, usize),
    pub receipt: PublishReceipt,
    pub report: SummaryReport,
}

/// Extract, transform, upload, then analyze. Stops at the first failing stage.
pub fn run_pipeline(options: &RunOptions, store: &dyn ObjectStore) -> Result<RunSummary> {
    let raw = extract_data(&options.input_file)?;
    let extracted_rows = raw.len();

    let cleaned = transform_data(raw)?;

    if let Some(path) = &options.processed_output {
        write_csv(&cleaned, path)?;
    }
    let receipt = upload_table(&cleaned, store, &options.bucket, &options.key)?;
    let report = analyze_data(&cleaned)?;

    info!("ETL pipeline executed successfully");
    Ok(RunSummary {
        extracted_rows,
        cleaned_shape: cleaned.shape(),
        receipt,
        report,
    })
}
