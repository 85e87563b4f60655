// One ETL run: fetch -> validate -> report -> stage -> dedup-load
//
// A fetch failure aborts the run before validation. A load failure only aborts
// the load: the rejection report and the staging file stay on disk.

use crate::data_quality::{RecordValidator, ValidationSession};
use crate::db::open_store;
use crate::deduplication::{DedupLoader, LoadOutcome};
use crate::error::LoadError;
use crate::fetch::{SourceFetcher, TimeWindow};
use crate::report::ReportWriter;
use crate::staging::write_staging;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, info_span, warn};

/// Counts every run reports, whether or not the load succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub fetched: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub skipped_duplicates: usize,
    pub inserted: usize,
    pub total_rows: Option<i64>,
    pub load_error: Option<String>,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.load_error.is_none()
    }

    pub fn log(&self) {
        info!(
            run_id = %self.run_id,
            fetched = self.fetched,
            accepted = self.accepted,
            rejected = self.rejected,
            skipped_duplicates = self.skipped_duplicates,
            inserted = self.inserted,
            total_rows = ?self.total_rows,
            load_failed = self.load_error.is_some(),
            "Run summary"
        );
    }
}

pub struct EtlRun {
    pub run_id: String,
    pub fetcher: Box<dyn SourceFetcher>,
    pub validator: RecordValidator,
    pub loader: DedupLoader,
    pub report: Box<dyn ReportWriter>,
    pub staging_path: PathBuf,
    pub db_path: PathBuf,
}

impl EtlRun {
    pub fn run(&mut self, window: &TimeWindow) -> Result<RunSummary> {
        let span = info_span!("etl_run", run_id = %self.run_id);
        let _enter = span.enter();

        let raw = self
            .fetcher
            .fetch(window)
            .context("Fetching records from the statistics API failed")?;

        let mut session = ValidationSession::new();
        let accepted = self.validator.process_records(&raw, &mut session);

        session
            .save_errors(self.report.as_mut())
            .context("Failed to write rejection report")?;

        let mut summary = RunSummary {
            run_id: self.run_id.clone(),
            fetched: raw.len(),
            accepted: accepted.len(),
            rejected: session.rejected.len(),
            ..RunSummary::default()
        };

        if accepted.is_empty() {
            info!("No valid records to stage");
            summary.log();
            return Ok(summary);
        }

        write_staging(&self.staging_path, &accepted).with_context(|| {
            format!("Failed to write staging file {}", self.staging_path.display())
        })?;
        info!(records = accepted.len(), path = %self.staging_path.display(), "Staging file written");

        match self.load_staged() {
            Ok(outcome) => {
                summary.inserted = outcome.inserted;
                summary.skipped_duplicates = outcome.skipped_duplicates;
                summary.total_rows = Some(outcome.total_rows);

                if let Err(e) = std::fs::remove_file(&self.staging_path) {
                    warn!(error = %e, "Could not remove staging file");
                } else {
                    info!(path = %self.staging_path.display(), "Staging file removed");
                }
            }
            Err(e) => {
                error!(error = %e, path = %self.staging_path.display(), "Load failed; staging file kept");
                summary.load_error = Some(e.to_string());
            }
        }

        summary.log();
        Ok(summary)
    }

    fn load_staged(&self) -> Result<LoadOutcome, LoadError> {
        let mut conn = open_store(&self.db_path)?;
        self.loader.load_staging(&mut conn, &self.staging_path)
    }
}
