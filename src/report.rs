// Rejection report - flat, append-only, human-readable log of rejected records

use crate::data_quality::RejectionReport;
use crate::error::ReportError;
use chrono::{Local, NaiveDate};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const SEPARATOR_WIDTH: usize = 50;

/// Sink for a run's rejected records.
pub trait ReportWriter {
    fn write_rejections(&mut self, rejected: &[RejectionReport]) -> Result<(), ReportError>;
}

/// `errors_YYYYMMDD.txt`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("errors_{}.txt", date.format("%Y%m%d"))
}

/// Render one run's block of the report.
pub fn render_rejections(run_id: &str, rejected: &[RejectionReport]) -> Result<String, ReportError> {
    let mut out = String::new();
    out.push_str(&format!("REJECTED RECORDS (run {})\n", run_id));
    out.push_str(&format!("Total records with errors: {}\n", rejected.len()));

    for item in rejected {
        let record = serde_json::to_string(&item.original_record)?;
        out.push_str(&format!("Record: {}\n", record));
        for reason in &item.reasons {
            out.push_str(&format!("  - {}\n", reason));
        }
        out.push_str(&"-".repeat(SEPARATOR_WIDTH));
        out.push('\n');
    }

    Ok(out)
}

/// Appends each run's block to a file; earlier runs are never rewritten.
pub struct FileReportWriter {
    path: PathBuf,
    run_id: String,
}

impl FileReportWriter {
    pub fn new(path: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        FileReportWriter {
            path: path.into(),
            run_id: run_id.into(),
        }
    }

    /// Today's report file inside `dir`.
    pub fn in_dir(dir: &Path, run_id: impl Into<String>) -> Self {
        let name = report_file_name(Local::now().date_naive());
        Self::new(dir.join(name), run_id)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportWriter for FileReportWriter {
    fn write_rejections(&mut self, rejected: &[RejectionReport]) -> Result<(), ReportError> {
        let block = render_rejections(&self.run_id, rejected)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(block.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use serde_json::json;

    fn rejection() -> RejectionReport {
        let original_record = match json!({"lti_user_id": "abc", "attempt_type": "run"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        RejectionReport {
            original_record,
            reasons: vec![
                FieldError::new("user_id", "Invalid user_id format: abc"),
                FieldError::new("date", "date is empty"),
            ],
        }
    }

    #[test]
    fn test_report_file_name() {
        let date = NaiveDate::from_ymd_opt(2023, 4, 4).unwrap();
        assert_eq!(report_file_name(date), "errors_20230404.txt");
    }

    #[test]
    fn test_render_rejections() {
        let text = render_rejections("run-1", &[rejection()]).unwrap();

        assert!(text.starts_with("REJECTED RECORDS (run run-1)\n"));
        assert!(text.contains("Total records with errors: 1\n"));
        assert!(text.contains("Record: {"));
        assert!(text.contains("  - user_id: Invalid user_id format: abc\n"));
        assert!(text.contains("  - created_at: date is empty\n"));
        assert!(text.ends_with(&format!("{}\n", "-".repeat(50))));
    }

    #[test]
    fn test_file_writer_appends_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.txt");

        FileReportWriter::new(&path, "first")
            .write_rejections(&[rejection()])
            .unwrap();
        FileReportWriter::new(&path, "second")
            .write_rejections(&[])
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("(run first)"));
        assert!(text.contains("(run second)"));
        assert!(text.contains("Total records with errors: 0"));
    }
}
