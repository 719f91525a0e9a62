//! Row-to-entity parsing helpers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::IndexError;

/// Format a timestamp the way every TEXT time column stores it, so that
/// lexicographic order equals chronological order.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a TEXT column written by [`format_datetime`].
///
/// # Errors
///
/// Returns `IndexError::Query` if the string is not RFC 3339.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, IndexError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| IndexError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into an enum via its `FromStr`.
///
/// # Errors
///
/// Returns `IndexError::Query` if the string does not name a variant.
pub fn parse_enum<T>(s: &str) -> Result<T, IndexError>
where
    T: std::str::FromStr<Err = String>,
{
    s.parse::<T>().map_err(IndexError::Query)
}

/// Encode a list column as JSON text.
///
/// # Errors
///
/// Returns `IndexError::Query` if serialization fails.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, IndexError> {
    serde_json::to_string(value)
        .map_err(|e| IndexError::Query(format!("Failed to encode JSON column: {e}")))
}

/// Decode a JSON TEXT column.
///
/// # Errors
///
/// Returns `IndexError::Query` if the column holds invalid JSON.
pub fn from_json<T: DeserializeOwned>(s: &str) -> Result<T, IndexError> {
    serde_json::from_str(s).map_err(|e| IndexError::Query(format!("Invalid JSON in column: {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// # Errors
///
/// Returns `IndexError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, IndexError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read an INTEGER column that must fit in `u32`.
///
/// # Errors
///
/// Returns `IndexError::Query` for negative or oversized values.
pub fn get_u32(row: &libsql::Row, idx: i32) -> Result<u32, IndexError> {
    let v = row.get::<i64>(idx)?;
    u32::try_from(v).map_err(|_| IndexError::Query(format!("Column {idx} out of range: {v}")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use thoth_core::enums::Severity;

    use super::*;

    #[test]
    fn datetimes_round_trip_in_sortable_form() {
        let dt = parse_datetime("2026-03-01T12:00:00+02:00").unwrap();
        assert_eq!(format_datetime(&dt), "2026-03-01T10:00:00Z");
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn enums_parse_from_storage_strings() {
        assert_eq!(parse_enum::<Severity>("gated").unwrap(), Severity::Gated);
        assert!(matches!(
            parse_enum::<Severity>("fatal"),
            Err(IndexError::Query(_))
        ));
    }

    #[test]
    fn json_columns_round_trip() {
        let tags = vec!["storage".to_string(), "durability".to_string()];
        let text = to_json(&tags).unwrap();
        assert_eq!(text, r#"["storage","durability"]"#);
        assert_eq!(from_json::<Vec<String>>(&text).unwrap(), tags);
    }
}
