// Staging artifact - seven-column CSV between validation and load
//
// One header row, one row per ValidatedRecord. `is_correct` null is an empty
// cell; `created_at` is always written with six fractional digits.

use crate::data_quality::ValidatedRecord;
use crate::error::StagingError;
use std::path::Path;

pub const STAGING_FILE_NAME: &str = "training_data.csv";

pub const STAGING_COLUMNS: [&str; 7] = [
    "user_id",
    "oauth_consumer_key",
    "lis_result_sourcedid",
    "lis_outcome_service_url",
    "is_correct",
    "attempt_type",
    "created_at",
];

pub fn write_staging(path: &Path, records: &[ValidatedRecord]) -> Result<(), StagingError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(STAGING_COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    Ok(())
}

pub fn read_staging(path: &Path) -> Result<Vec<ValidatedRecord>, StagingError> {
    let mut rdr = csv::Reader::from_path(path)?;

    let headers = rdr.headers()?.clone();
    if headers.iter().ne(STAGING_COLUMNS.iter().copied()) {
        return Err(StagingError::Header {
            expected: STAGING_COLUMNS.join(","),
            actual: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: ValidatedRecord = result?;
        records.push(record);
    }

    Ok(records)
}
