// ✅ Field Validators - one pure function per domain field
//
// Every validator maps a raw JSON value to either the normalized value or a
// FieldError. None of them touch shared state; the "now" used for future-date
// checks is passed in by the caller.

use crate::error::FieldError;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::LazyLock;

/// Canonical rendering of `created_at`: microsecond precision, six digits.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Parsing format; fraction length is checked separately (1 to 6 digits).
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

static USER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{32}$").expect("static user_id pattern"));

// ============================================================================
// ATTEMPT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptType {
    /// Code execution, never graded
    Run,
    /// Graded submission
    Submit,
}

impl AttemptType {
    pub const ALL: [AttemptType; 2] = [AttemptType::Run, AttemptType::Submit];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptType::Run => "run",
            AttemptType::Submit => "submit",
        }
    }
}

impl FromStr for AttemptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(AttemptType::Run),
            "submit" => Ok(AttemptType::Submit),
            other => Err(format!("unknown attempt_type: {}", other)),
        }
    }
}

impl std::fmt::Display for AttemptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

/// Parse `YYYY-MM-DD HH:MM:SS.ffffff` (1 to 6 fractional digits required).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let (_, fraction) = s.split_once('.')?;
    if fraction.is_empty()
        || fraction.len() > 6
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    NaiveDateTime::parse_from_str(s, TIMESTAMP_PARSE_FORMAT).ok()
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Serde adapter for `created_at` columns (staging CSV, reports).
pub mod timestamp_serde {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

// ============================================================================
// RAW VALUE HELPERS
// ============================================================================

/// Emptiness as the upstream feed means it: null, "", false, 0, [] and {}.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Human-readable rendering of a raw value for reasons.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

// ============================================================================
// VALIDATORS
// ============================================================================

/// 32 hex characters, any case; normalized to lowercase.
pub fn validate_user_id(value: &Value) -> Result<String, FieldError> {
    if is_blank(value) {
        return Err(FieldError::new("user_id", "user_id is empty"));
    }

    let raw = display_value(value);
    let lowered = raw.to_lowercase();
    if USER_ID_RE.is_match(&lowered) {
        Ok(lowered)
    } else {
        Err(FieldError::new(
            "user_id",
            format!("Invalid user_id format: {}", raw),
        ))
    }
}

/// Timestamp not later than `now`. Equal to `now` is accepted.
pub fn validate_date(value: &Value, now: NaiveDateTime) -> Result<NaiveDateTime, FieldError> {
    if is_blank(value) {
        return Err(FieldError::new("date", "date is empty"));
    }

    let raw = display_value(value);
    let parsed = parse_timestamp(&raw).ok_or_else(|| {
        FieldError::new("date", format!("Invalid date format: {}.", raw))
    })?;

    if parsed > now {
        return Err(FieldError::new(
            "date",
            format!("Date is in the future: {}", raw),
        ));
    }

    Ok(parsed)
}

pub fn validate_attempt_type(value: &Value) -> Result<AttemptType, FieldError> {
    if value.is_null() {
        return Err(FieldError::new(
            "attempt_type",
            "attempt_type is required (cannot be null)",
        ));
    }

    let normalized = display_value(value).trim().to_lowercase();
    if normalized.is_empty() {
        return Err(FieldError::new("attempt_type", "attempt_type is empty"));
    }

    normalized.parse::<AttemptType>().map_err(|_| {
        FieldError::new(
            "attempt_type",
            format!(
                "Invalid attempt_type (expected one of ['run', 'submit'], got: {})",
                display_value(value)
            ),
        )
    })
}

/// Shape of a raw `is_correct` value, decoded before coercion.
#[derive(Debug, Clone, PartialEq)]
enum IsCorrectInput<'a> {
    Missing,
    Flag(bool),
    Numeric(f64),
    Text(&'a str),
    Other(&'a Value),
}

impl<'a> IsCorrectInput<'a> {
    fn decode(value: &'a Value) -> Self {
        match value {
            Value::Null => IsCorrectInput::Missing,
            Value::Bool(b) => IsCorrectInput::Flag(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => IsCorrectInput::Numeric(f),
                None => IsCorrectInput::Other(value),
            },
            Value::String(s) => IsCorrectInput::Text(s),
            other => IsCorrectInput::Other(other),
        }
    }
}

const TRUE_LITERALS: [&str; 4] = ["true", "1", "yes", "y"];
const FALSE_LITERALS: [&str; 4] = ["false", "0", "no", "n"];

/// `is_correct` depends on the raw attempt type:
/// run requires null, submit requires a boolean-like value.
pub fn validate_is_correct(value: &Value, attempt_type: &Value) -> Result<Option<bool>, FieldError> {
    match attempt_type.as_str() {
        Some("run") => {
            if value.is_null() {
                Ok(None)
            } else {
                Err(FieldError::new(
                    "is_correct",
                    format!(
                        "for attempt_type='run', is_correct must be null, got: {}",
                        display_value(value)
                    ),
                ))
            }
        }
        Some("submit") => match IsCorrectInput::decode(value) {
            IsCorrectInput::Missing => Err(FieldError::new(
                "is_correct",
                "for attempt_type='submit', is_correct cannot be null",
            )),
            IsCorrectInput::Flag(b) => Ok(Some(b)),
            IsCorrectInput::Numeric(n) => Ok(Some(n != 0.0)),
            IsCorrectInput::Text(s) => {
                let lowered = s.trim().to_lowercase();
                if TRUE_LITERALS.contains(&lowered.as_str()) {
                    Ok(Some(true))
                } else if FALSE_LITERALS.contains(&lowered.as_str()) {
                    Ok(Some(false))
                } else {
                    Err(FieldError::new(
                        "is_correct",
                        format!(
                            "Invalid is_correct value for submit (expected boolean, got: {})",
                            s
                        ),
                    ))
                }
            }
            IsCorrectInput::Other(other) => Err(FieldError::new(
                "is_correct",
                format!(
                    "Invalid is_correct type for submit (expected boolean, got: {})",
                    type_name(other)
                ),
            )),
        },
        _ => Err(FieldError::new(
            "is_correct",
            format!("Unknown attempt_type: {}", display_value(attempt_type)),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_user_id_valid_is_lowercased() {
        let id = validate_user_id(&json!("0123456789ABCDEF0123456789abcdef")).unwrap();
        assert_eq!(id, "0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn test_user_id_rejections() {
        let short = validate_user_id(&json!("0123456789abcdef0123456789abcde")).unwrap_err();
        assert_eq!(short.field, "user_id");
        assert!(short.reason.contains("Invalid user_id format"));

        let non_hex = validate_user_id(&json!("g123456789abcdef0123456789abcdef")).unwrap_err();
        assert!(non_hex.reason.contains("Invalid user_id format"));

        assert_eq!(
            validate_user_id(&Value::Null).unwrap_err().reason,
            "user_id is empty"
        );
        assert_eq!(
            validate_user_id(&json!("")).unwrap_err().reason,
            "user_id is empty"
        );
    }

    #[test]
    fn test_parse_timestamp_strict() {
        assert!(parse_timestamp("2023-04-01 12:46:47.860798").is_some());
        assert!(parse_timestamp("2023-04-01 12:46:47.8").is_some());
        assert!(parse_timestamp("2023-04-01 12:46:47").is_none());
        assert!(parse_timestamp("2023-04-01 12:46:47.1234567").is_none());
        assert!(parse_timestamp("2023-04-01T12:46:47.860798").is_none());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_format_timestamp_pads_to_micros() {
        let ts = at("2023-04-01 12:46:47.8");
        assert_eq!(format_timestamp(&ts), "2023-04-01 12:46:47.800000");
    }

    #[test]
    fn test_date_boundary_at_now() {
        let now = at("2023-04-04 12:46:47.860798");

        let same = validate_date(&json!("2023-04-04 12:46:47.860798"), now).unwrap();
        assert_eq!(same, now);

        let future = now + Duration::microseconds(1);
        let err = validate_date(&json!(format_timestamp(&future)), now).unwrap_err();
        assert_eq!(err.field, "date");
        assert!(err.reason.contains("future"));
    }

    #[test]
    fn test_date_rejections() {
        let now = at("2023-04-04 00:00:00.000000");
        assert_eq!(validate_date(&Value::Null, now).unwrap_err().reason, "date is empty");
        assert_eq!(
            validate_date(&json!(""), now).unwrap_err().to_string(),
            "date: date is empty"
        );
        assert!(validate_date(&json!("04/01/2023"), now)
            .unwrap_err()
            .reason
            .contains("Invalid date format"));
    }

    #[test]
    fn test_attempt_type_normalization() {
        assert_eq!(validate_attempt_type(&json!(" Submit ")).unwrap(), AttemptType::Submit);
        assert_eq!(validate_attempt_type(&json!("run")).unwrap(), AttemptType::Run);
        assert!(validate_attempt_type(&json!("   ")).unwrap_err().reason.contains("empty"));
        assert!(validate_attempt_type(&Value::Null).unwrap_err().reason.contains("null"));
        assert!(validate_attempt_type(&json!("walk"))
            .unwrap_err()
            .reason
            .contains("got: walk"));
    }

    #[test]
    fn test_is_correct_run_must_be_null() {
        assert_eq!(validate_is_correct(&Value::Null, &json!("run")).unwrap(), None);

        let err = validate_is_correct(&json!(true), &json!("run")).unwrap_err();
        assert_eq!(err.field, "is_correct");
        assert!(err.reason.contains("run"));
        assert!(err.reason.contains("must be null"));
    }

    #[test]
    fn test_is_correct_submit_coercions() {
        let submit = json!("submit");
        assert_eq!(validate_is_correct(&json!(true), &submit).unwrap(), Some(true));
        assert_eq!(validate_is_correct(&json!(false), &submit).unwrap(), Some(false));
        assert_eq!(validate_is_correct(&json!(1), &submit).unwrap(), Some(true));
        assert_eq!(validate_is_correct(&json!(0), &submit).unwrap(), Some(false));
        assert_eq!(validate_is_correct(&json!(2.5), &submit).unwrap(), Some(true));
        assert_eq!(validate_is_correct(&json!("yes"), &submit).unwrap(), Some(true));
        assert_eq!(validate_is_correct(&json!("Y"), &submit).unwrap(), Some(true));
        assert_eq!(validate_is_correct(&json!("FALSE"), &submit).unwrap(), Some(false));
        assert_eq!(validate_is_correct(&json!("n"), &submit).unwrap(), Some(false));
    }

    #[test]
    fn test_is_correct_submit_rejections() {
        let submit = json!("submit");
        assert!(validate_is_correct(&Value::Null, &submit)
            .unwrap_err()
            .reason
            .contains("cannot be null"));
        assert!(validate_is_correct(&json!("maybe"), &submit)
            .unwrap_err()
            .reason
            .contains("Invalid is_correct value"));
        assert!(validate_is_correct(&json!([true]), &submit)
            .unwrap_err()
            .reason
            .contains("list"));
    }

    #[test]
    fn test_is_correct_unknown_attempt_type() {
        let err = validate_is_correct(&json!(true), &json!("walk")).unwrap_err();
        assert!(err.reason.contains("Unknown attempt_type: walk"));

        let err = validate_is_correct(&Value::Null, &Value::Null).unwrap_err();
        assert!(err.reason.contains("Unknown attempt_type"));
    }
}
