use std::path::PathBuf;

/// A row whose width does not match the table header.
#[derive(Debug, thiserror::Error)]
#[error("Row {row} has {found} values but the table has {expected} columns")]
pub struct ShapeError {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

/// Failures while reading the source file into a table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Source file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Source file {} has no header row", .0.display())]
    Empty(PathBuf),
    #[error("Column '{0}' appears more than once in the header")]
    DuplicateColumn(String),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Cannot parse {column} value '{value}' in row {row} as a date")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("CSV serialization failed: {0}")]
    Serialize(#[from] csv::Error),
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Destination not found: {0}")]
    DestinationNotFound(String),
    #[error("Object store rejected the write with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Amount value '{value}' in row {row} is not numeric")]
    NonNumeric { row: usize, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),
    #[error("Invalid value '{value}' for {var}")]
    Invalid { var: &'static str, value: String },
    #[error("Cannot load env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
    #[error("Logger already installed: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Any failure that ends a pipeline run, tagged by the stage it came from.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Config Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Load Error: {0}")]
    Load(#[from] LoadError),
    #[error("Transform Error: {0}")]
    Transform(#[from] TransformError),
    #[error("Publish Error: {0}")]
    Publish(#[from] PublishError),
    #[error("Report Error: {0}")]
    Report(#[from] ReportError),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Config(_) => "configuration",
            PipelineError::Load(_) => "extract",
            PipelineError::Transform(_) => "transform",
            PipelineError::Publish(_) => "upload",
            PipelineError::Report(_) => "analysis",
        }
    }

    /// Process exit code for this failure kind. Zero is reserved for success.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Config(_) => 2,
            PipelineError::Load(_) => 3,
            PipelineError::Transform(_) => 4,
            PipelineError::Publish(_) => 5,
            PipelineError::Report(_) => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
