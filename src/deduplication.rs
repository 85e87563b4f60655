// 🔍 Dedup Loader - idempotent load of accepted records
//
// The in-memory key set read at the start of a load only saves work. The
// store's UNIQUE (user_id, created_at, attempt_type) constraint is what
// actually keeps duplicates out when runs overlap.

use crate::data_quality::ValidatedRecord;
use crate::db::{bulk_append, existing_keys, setup_database, verify_count};
use crate::error::LoadError;
use crate::fields::format_timestamp;
use crate::staging::read_staging;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{error, info, warn};

// ============================================================================
// DEDUP KEY
// ============================================================================

/// Natural key of one attempt, in the store's text representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DedupKey {
    pub user_id: String,
    pub created_at: String,
    pub attempt_type: String,
}

impl DedupKey {
    pub fn of(record: &ValidatedRecord) -> Self {
        DedupKey {
            user_id: record.user_id.clone(),
            created_at: format_timestamp(&record.created_at),
            attempt_type: record.attempt_type.as_str().to_string(),
        }
    }
}

// ============================================================================
// PLAN & OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DedupPlan {
    /// Records to append, in input order
    pub new_records: Vec<ValidatedRecord>,

    /// Records whose key is already stored, or repeated earlier in the batch
    pub skipped_duplicates: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub inserted: usize,
    pub skipped_duplicates: usize,

    /// Row count of the target table after the load
    pub total_rows: i64,

    /// Conflicts with a concurrent writer that were resolved by re-planning
    pub conflict_retries: usize,
}

// ============================================================================
// DEDUP LOADER
// ============================================================================

pub struct DedupLoader {
    /// How many times a unique-constraint conflict triggers a re-plan (default: 1)
    pub max_conflict_retries: usize,
}

impl DedupLoader {
    pub fn new() -> Self {
        DedupLoader {
            max_conflict_retries: 1,
        }
    }

    /// Split `records` into new ones and duplicates. First occurrence wins.
    pub fn plan(&self, existing: &HashSet<DedupKey>, records: &[ValidatedRecord]) -> DedupPlan {
        let mut seen: HashSet<DedupKey> = HashSet::new();
        let mut new_records = Vec::new();
        let mut skipped_duplicates = 0;

        for record in records {
            let key = DedupKey::of(record);
            if existing.contains(&key) || !seen.insert(key) {
                skipped_duplicates += 1;
                continue;
            }
            new_records.push(record.clone());
        }

        DedupPlan {
            new_records,
            skipped_duplicates,
        }
    }

    /// Ensure the schema, read existing keys once, then load.
    pub fn load(
        &self,
        conn: &mut Connection,
        records: &[ValidatedRecord],
    ) -> Result<LoadOutcome, LoadError> {
        setup_database(conn)?;

        info!("Checking existing records to prevent duplicates");
        let existing = existing_keys(conn)?;
        info!(existing = existing.len(), "Existing records found");

        self.load_against(conn, records, existing)
    }

    /// Load using a caller-supplied key set, which may already be stale.
    pub fn load_against(
        &self,
        conn: &mut Connection,
        records: &[ValidatedRecord],
        mut existing: HashSet<DedupKey>,
    ) -> Result<LoadOutcome, LoadError> {
        let mut conflict_retries = 0;

        loop {
            let plan = self.plan(&existing, records);
            info!(
                new = plan.new_records.len(),
                skipped = plan.skipped_duplicates,
                "Dedup plan ready"
            );

            if plan.new_records.is_empty() {
                info!("No new records to import");
                return Ok(LoadOutcome {
                    inserted: 0,
                    skipped_duplicates: plan.skipped_duplicates,
                    total_rows: verify_count(conn)?,
                    conflict_retries,
                });
            }

            match bulk_append(conn, &plan.new_records) {
                Ok(inserted) => {
                    let total_rows = verify_count(conn)?;
                    info!(inserted, total_rows, "Import committed");
                    return Ok(LoadOutcome {
                        inserted,
                        skipped_duplicates: plan.skipped_duplicates,
                        total_rows,
                        conflict_retries,
                    });
                }
                Err(e) if e.is_conflict() && conflict_retries < self.max_conflict_retries => {
                    warn!(
                        error = %e,
                        "Concurrent insert hit the uniqueness constraint; batch rolled back, re-planning"
                    );
                    existing = existing_keys(conn)?;
                    conflict_retries += 1;
                }
                Err(e) => {
                    error!(error = %e, "Import failed, transaction rolled back");
                    return Err(e);
                }
            }
        }
    }

    /// Load a staging CSV produced by the validation stage.
    pub fn load_staging(&self, conn: &mut Connection, path: &Path) -> Result<LoadOutcome, LoadError> {
        let records = read_staging(path)?;
        info!(records = records.len(), path = %path.display(), "Staging file read");
        self.load(conn, &records)
    }
}

impl Default for DedupLoader {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
