// ✅ Record Validator - accept/reject decision per raw record
//
// Runs every field check against the same record, independently, and either
// builds a ValidatedRecord or files a RejectionReport. Run-scoped state lives in
// ValidationSession, one per run, passed in by reference.

use crate::error::{FieldError, ReportError};
use crate::fields::{
    self, timestamp_serde, validate_attempt_type, validate_date, validate_is_correct,
    validate_user_id, AttemptType,
};
use crate::parser::{extract_passback_fields, parse_passback_params};
use crate::report::ReportWriter;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Untyped record as returned by the statistics API.
pub type RawRecord = serde_json::Map<String, Value>;

// Raw record keys
pub const KEY_USER_ID: &str = "lti_user_id";
pub const KEY_CREATED_AT: &str = "created_at";
pub const KEY_ATTEMPT_TYPE: &str = "attempt_type";
pub const KEY_IS_CORRECT: &str = "is_correct";
pub const KEY_PASSBACK_PARAMS: &str = "passback_params";

static NULL: Value = Value::Null;

/// Missing keys read as null.
fn raw_field<'a>(raw: &'a RawRecord, key: &str) -> &'a Value {
    raw.get(key).unwrap_or(&NULL)
}

// ============================================================================
// VALIDATED RECORD
// ============================================================================

/// Typed projection of a raw record. Only exists if every check passed.
///
/// Field order is the staging column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedRecord {
    pub user_id: String,
    pub oauth_consumer_key: String,
    pub lis_result_sourcedid: String,
    pub lis_outcome_service_url: String,
    pub is_correct: Option<bool>,
    pub attempt_type: AttemptType,
    #[serde(with = "timestamp_serde")]
    pub created_at: NaiveDateTime,
}

// ============================================================================
// REJECTIONS & STATISTICS
// ============================================================================

/// Original record plus one reason per failed field, in check order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionReport {
    pub original_record: RawRecord,
    pub reasons: Vec<FieldError>,
}

impl RejectionReport {
    pub fn has_reason_for(&self, field: &str) -> bool {
        self.reasons.iter().any(|r| r.field == field)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl ValidationStatistics {
    pub fn summary(&self) -> String {
        format!(
            "{} records: {} valid, {} invalid",
            self.total, self.valid, self.invalid
        )
    }
}

/// Run-scoped accumulator. One per run; never shared.
#[derive(Debug, Default)]
pub struct ValidationSession {
    pub statistics: ValidationStatistics,
    pub rejected: Vec<RejectionReport>,
}

impl ValidationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.statistics = ValidationStatistics::default();
        self.rejected.clear();
    }

    /// Hand the rejection log to a writer.
    pub fn save_errors(&self, writer: &mut dyn ReportWriter) -> Result<(), ReportError> {
        writer.write_rejections(&self.rejected)?;
        info!(rejected = self.rejected.len(), "Rejection report saved");
        Ok(())
    }
}

// ============================================================================
// RECORD VALIDATOR
// ============================================================================

pub struct RecordValidator {
    clock: Box<dyn Fn() -> NaiveDateTime>,
}

impl RecordValidator {
    /// Validator using local wall-clock time for future-date checks.
    pub fn new() -> Self {
        RecordValidator {
            clock: Box::new(|| Local::now().naive_local()),
        }
    }

    /// Validator with an injected clock.
    pub fn with_clock(clock: impl Fn() -> NaiveDateTime + 'static) -> Self {
        RecordValidator {
            clock: Box::new(clock),
        }
    }

    /// Validate one record. Every check runs even after an earlier one failed.
    pub fn process_record(
        &self,
        raw: &RawRecord,
        session: &mut ValidationSession,
    ) -> Option<ValidatedRecord> {
        session.statistics.total += 1;

        let field = |key: &str| raw_field(raw, key);
        let mut reasons = Vec::new();

        let user_id = validate_user_id(field(KEY_USER_ID)).map_err(|e| reasons.push(e)).ok();

        let now = (self.clock)();
        let created_at = validate_date(field(KEY_CREATED_AT), now)
            .map_err(|e| reasons.push(e))
            .ok();

        let is_correct = validate_is_correct(field(KEY_IS_CORRECT), field(KEY_ATTEMPT_TYPE))
            .map_err(|e| reasons.push(e))
            .ok();

        let attempt_type = validate_attempt_type(field(KEY_ATTEMPT_TYPE))
            .map_err(|e| reasons.push(e))
            .ok();

        let passback = match parse_passback_params(field(KEY_PASSBACK_PARAMS)) {
            Ok(params) => extract_passback_fields(&params)
                .map_err(|errors| reasons.extend(errors))
                .ok(),
            Err(e) => {
                reasons.push(e);
                None
            }
        };

        match (user_id, created_at, is_correct, attempt_type, passback) {
            (Some(user_id), Some(created_at), Some(is_correct), Some(attempt_type), Some(passback))
                if reasons.is_empty() =>
            {
                session.statistics.valid += 1;
                Some(ValidatedRecord {
                    user_id,
                    oauth_consumer_key: passback.oauth_consumer_key,
                    lis_result_sourcedid: passback.lis_result_sourcedid,
                    lis_outcome_service_url: passback.lis_outcome_service_url,
                    is_correct,
                    attempt_type,
                    created_at,
                })
            }
            _ => {
                session.statistics.invalid += 1;
                debug!(
                    reasons = reasons.len(),
                    created_at = %fields::display_value(field(KEY_CREATED_AT)),
                    "Record rejected"
                );
                session.rejected.push(RejectionReport {
                    original_record: raw.clone(),
                    reasons,
                });
                None
            }
        }
    }

    /// Validate a batch. Returns accepted records in input order.
    pub fn process_records(
        &self,
        batch: &[RawRecord],
        session: &mut ValidationSession,
    ) -> Vec<ValidatedRecord> {
        session.reset();
        info!(records = batch.len(), "Starting validation");

        let accepted: Vec<ValidatedRecord> = batch
            .iter()
            .filter_map(|raw| self.process_record(raw, session))
            .collect();

        info!(
            valid = session.statistics.valid,
            invalid = session.statistics.invalid,
            "Validation finished"
        );
        accepted
    }
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
