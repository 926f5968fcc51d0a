//! JSON serialization helpers for SQLite storage
//!
//! Handles conversion between Rust types and SQLite JSON columns.

use serde_json::Value;
use std::collections::HashMap;

use crate::error::Result;

/// Serialize a Vec<String> to JSON string for SQLite storage
pub fn serialize_string_vec(vec: &[String]) -> Result<String> {
    Ok(serde_json::to_string(vec)?)
}

/// Deserialize a JSON string from SQLite to Vec<String>
pub fn deserialize_string_vec(json: &str) -> Result<Vec<String>> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize attributes HashMap to JSON string for SQLite storage
pub fn serialize_attributes(attrs: &HashMap<String, Value>) -> Result<Option<String>> {
    if attrs.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(attrs)?))
    }
}

/// Deserialize attributes from SQLite JSON string to HashMap
pub fn deserialize_attributes(json: Option<String>) -> Result<HashMap<String, Value>> {
    match json {
        Some(json_str) => Ok(serde_json::from_str(&json_str)?),
        None => Ok(HashMap::new()),
    }
}

/// Convert Unix timestamp milliseconds to SQLite DATETIME string (RFC3339)
pub fn timestamp_to_sql(timestamp_ms: i64) -> String {
    // Convert milliseconds to seconds + nanoseconds
    let secs = timestamp_ms / 1000;
    let nanos = ((timestamp_ms % 1000) * 1_000_000) as u32;

    // Create DateTime and format as RFC3339
    match chrono::DateTime::from_timestamp(secs, nanos) {
        Some(dt) => dt.to_rfc3339(),
        None => chrono::Utc::now().to_rfc3339(), // Fallback to now if invalid
    }
}

/// Convert SQLite DATETIME string (RFC3339) to Unix timestamp milliseconds
pub fn sql_to_timestamp(datetime_str: &str) -> Result<i64> {
    use chrono::DateTime;

    let dt = DateTime::parse_from_rfc3339(datetime_str)
        .map_err(|e| crate::error::SqliteError::Migration(format!("Invalid datetime: {}", e)))?;

    Ok(dt.timestamp_millis())
}
