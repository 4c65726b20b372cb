pub mod analyze;
pub mod config;
pub mod error;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod storage;
pub mod structs;
pub mod transform;

// Re-export public API
pub use analyze::{SummaryReport, analyze_data};
pub use config::{Credentials, Settings};
pub use error::{
    ConfigError, LoadError, PipelineError, PublishError, ReportError, Result, TransformError,
};
pub use extract::extract_data;
pub use load::{PublishReceipt, object_key, object_key_now, to_csv_bytes, upload_table, write_csv};
pub use pipeline::{RunOptions, RunSummary, run_pipeline};
pub use storage::{LocalStore, ObjectStore, S3Store};
pub use structs::{Row, SimpleLogger, Table, Value};
pub use transform::{parse_date, transform_data};
