use crate::data_quality::ValidatedRecord;
use crate::deduplication::DedupKey;
use crate::error::LoadError;
use crate::fields::{format_timestamp, parse_timestamp, AttemptType};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

pub const TABLE_NAME: &str = "training_data";

/// Open (or create) the SQLite store at `path`.
pub fn open_store(path: &Path) -> Result<Connection, LoadError> {
    let conn = Connection::open(path).map_err(|e| LoadError::Connect(e.to_string()))?;
    debug!(path = %path.display(), "Store connection opened");
    Ok(conn)
}

pub fn table_exists(conn: &Connection) -> Result<bool, LoadError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [TABLE_NAME],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Establish the target schema, uniqueness constraint included, before any write.
///
/// Returns true when the table was created by this call.
pub fn setup_database(conn: &Connection) -> Result<bool, LoadError> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    if table_exists(conn)? {
        info!("Table already exists");
        return Ok(false);
    }

    info!("Table does not exist, creating");
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS training_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            oauth_consumer_key TEXT,
            lis_result_sourcedid TEXT,
            lis_outcome_service_url TEXT,
            is_correct BOOLEAN,
            attempt_type TEXT NOT NULL,
            created_at TEXT NOT NULL,
            CONSTRAINT unique_user_attempt UNIQUE (user_id, created_at, attempt_type)
        );
        CREATE INDEX IF NOT EXISTS idx_training_user_id ON training_data(user_id);
        CREATE INDEX IF NOT EXISTS idx_training_created_at ON training_data(created_at);",
    )?;

    Ok(true)
}

/// Every (user_id, created_at, attempt_type) already in the store.
pub fn existing_keys(conn: &Connection) -> Result<HashSet<DedupKey>, LoadError> {
    let mut stmt =
        conn.prepare("SELECT user_id, created_at, attempt_type FROM training_data")?;

    let keys = stmt
        .query_map([], |row| {
            Ok(DedupKey {
                user_id: row.get(0)?,
                created_at: row.get(1)?,
                attempt_type: row.get(2)?,
            })
        })?
        .collect::<Result<HashSet<_>, _>>()?;

    Ok(keys)
}

/// Append all records in one transaction. Any failure rolls the whole batch back.
pub fn bulk_append(conn: &mut Connection, records: &[ValidatedRecord]) -> Result<usize, LoadError> {
    let tx = conn.transaction()?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO training_data (
                user_id, oauth_consumer_key, lis_result_sourcedid,
                lis_outcome_service_url, is_correct, attempt_type, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;

        for record in records {
            let result = stmt.execute(params![
                record.user_id,
                record.oauth_consumer_key,
                record.lis_result_sourcedid,
                record.lis_outcome_service_url,
                record.is_correct,
                record.attempt_type.as_str(),
                format_timestamp(&record.created_at),
            ]);

            match result {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(err, msg))
                    if err.code == ErrorCode::ConstraintViolation
                        && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    // Dropping `tx` here rolls back
                    return Err(LoadError::Conflict(
                        msg.unwrap_or_else(|| err.to_string()),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    tx.commit()?;
    Ok(records.len())
}

pub fn verify_count(conn: &Connection) -> Result<i64, LoadError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM training_data", [], |row| row.get(0))?;

    Ok(count)
}

pub fn get_all_records(conn: &Connection) -> Result<Vec<ValidatedRecord>, LoadError> {
    let mut stmt = conn.prepare(
        "SELECT user_id, oauth_consumer_key, lis_result_sourcedid,
                lis_outcome_service_url, is_correct, attempt_type, created_at
         FROM training_data
         ORDER BY id",
    )?;

    let records = stmt
        .query_map([], |row| {
            let attempt_type: String = row.get(5)?;
            let created_at: String = row.get(6)?;

            Ok(ValidatedRecord {
                user_id: row.get(0)?,
                oauth_consumer_key: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                lis_result_sourcedid: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                lis_outcome_service_url: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                is_correct: row.get(4)?,
                attempt_type: attempt_type.parse::<AttemptType>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(5, Type::Text, e.into())
                })?,
                created_at: parse_timestamp(&created_at).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        6,
                        Type::Text,
                        format!("invalid created_at: {}", created_at).into(),
                    )
                })?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}
