use clap::Parser;
use log::{LevelFilter, debug, error, info};
use sales_etl::{
    ConfigError, LocalStore, PipelineError, RunOptions, RunSummary, S3Store, Settings,
    SimpleLogger, object_key_now, run_pipeline,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Raw sales CSV to clean
    #[arg(short, long, default_value = "data/raw/Amazon Sale Report.csv")]
    input_file: PathBuf,

    /// Dotenv file with LOG_LEVEL, S3_BUCKET_NAME and AWS credentials (optional)
    #[arg(long, default_value = "config/.env")]
    env_file: PathBuf,

    /// Destination bucket (overrides S3_BUCKET_NAME)
    #[arg(short, long)]
    bucket: Option<String>,

    /// Object key (defaults to cleaned_sales_data_<timestamp>.csv)
    #[arg(short, long)]
    key: Option<String>,

    /// Also write the cleaned CSV to this local path
    #[arg(long)]
    processed_output: Option<PathBuf>,

    /// Publish into <dir>/<bucket>/ instead of S3
    #[arg(long)]
    local_store: Option<PathBuf>,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> ExitCode {
    let total_start = Instant::now();
    let args = Args::parse();

    match run(&args) {
        Ok(summary) => {
            info!(
                "Published s3://{}/{} | {} rows extracted, {:?} after cleaning",
                summary.receipt.bucket,
                summary.receipt.key,
                summary.extracted_rows,
                summary.cleaned_shape
            );
            debug!("Total runtime: {:.2?}", total_start.elapsed());
            ExitCode::SUCCESS
        }
        Err(err) => {
            if log::max_level() == LevelFilter::Off {
                eprintln!("ETL pipeline failed during {}: {}", err.stage(), err);
            }
            error!("ETL pipeline failed during {}: {}", err.stage(), err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(args: &Args) -> Result<RunSummary, PipelineError> {
    // Settings are read once, before any stage runs
    let settings = Settings::load(&args.env_file)?;
    let level = if args.debug {
        LevelFilter::Debug
    } else {
        settings.log_level
    };
    SimpleLogger::init(level).map_err(ConfigError::from)?;
    debug!("Settings: {:?}", settings);

    let bucket = match &args.bucket {
        Some(bucket) => bucket.clone(),
        None => settings.bucket()?.to_string(),
    };
    let options = RunOptions {
        input_file: args.input_file.clone(),
        bucket,
        key: args.key.clone().unwrap_or_else(object_key_now),
        processed_output: args.processed_output.clone(),
    };
    debug!("Run options: {:?}", options);

    let processing_start = Instant::now();
    let summary = match &args.local_store {
        Some(root) => {
            let store = LocalStore::new(root);
            store.create_bucket(&options.bucket)?;
            run_pipeline(&options, &store)?
        }
        None => {
            let store = S3Store::new(
                settings.credentials()?,
                &settings.region,
                settings.endpoint.as_deref(),
            )?;
            run_pipeline(&options, &store)?
        }
    };
    debug!("Pipeline stages took {:.2?}", processing_start.elapsed());

    Ok(summary)
}
