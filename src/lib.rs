// Training ETL - Core Library
// Validation, staging and idempotent loading of learning-activity attempts

pub mod config;
pub mod data_quality;
pub mod db;
pub mod deduplication;
pub mod error;
pub mod fetch;
pub mod fields;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod staging;

// Re-export commonly used types
pub use config::{Cli, Command, ProjectPaths, RunArgs};
pub use data_quality::{
    RawRecord, RecordValidator, RejectionReport, ValidatedRecord, ValidationSession,
    ValidationStatistics,
};
pub use db::{
    bulk_append, existing_keys, get_all_records, open_store, setup_database, verify_count,
};
pub use deduplication::{DedupKey, DedupLoader, DedupPlan, LoadOutcome};
pub use error::{FetchError, FieldError, LoadError, ReportError, StagingError};
pub use fetch::{ApiClient, HttpFetcher, SourceFetcher, TimeWindow};
pub use fields::{
    validate_attempt_type, validate_date, validate_is_correct, validate_user_id, AttemptType,
};
pub use logging::{init_logging, LogConfig, LogLevel};
pub use parser::{
    extract_passback_fields, parse_passback_params, validate_passback_params_dict,
    PassbackFields, PassbackParams,
};
pub use pipeline::{EtlRun, RunSummary};
pub use report::{FileReportWriter, ReportWriter};
pub use staging::{read_staging, write_staging, STAGING_FILE_NAME};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
