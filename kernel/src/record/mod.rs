// Record Model
//
// Immutable log records as they enter the pipeline, plus the parse
// boundary for raw wire payloads. Records are never mutated after
// construction; downstream stages only append, evict, and read.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a log record. Fixed, closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    /// All levels, in ascending severity order.
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    /// Dense index used by `LevelSet` and the mock generator.
    pub fn index(self) -> usize {
        match self {
            Level::Debug => 0,
            Level::Info => 1,
            Level::Warn => 2,
            Level::Error => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Parse a case-insensitive level name (CLI input).
    pub fn parse(text: &str) -> Result<Level, RecordError> {
        match text.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(RecordError::UnknownLevel(other.to_string())),
        }
    }
}

/// Stable identifier for a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

/// Errors produced at the ingestion parse boundary.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("malformed record payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown level: {0}")]
    UnknownLevel(String),
}

/// A single immutable log record.
///
/// `message_lower` is the precomputed lowercase projection of `message`,
/// built once at construction so search never case-folds per comparison.
/// It is recomputed on deserialization, never trusted from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordPayload")]
pub struct Record {
    pub id: RecordId,
    /// Arrival timestamp in epoch milliseconds. Expected non-decreasing
    /// but not enforced; display order always follows buffer position.
    pub timestamp_ms: u64,
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing)]
    pub message_lower: String,
}

/// Wire shape of a record. `id` is optional so externally sourced lines
/// without identifiers are still admissible.
#[derive(Debug, Deserialize)]
struct RecordPayload {
    #[serde(default)]
    id: Option<RecordId>,
    timestamp_ms: u64,
    level: Level,
    message: String,
}

impl From<RecordPayload> for Record {
    fn from(payload: RecordPayload) -> Self {
        let id = payload
            .id
            .unwrap_or_else(|| RecordId(Uuid::new_v4()));
        Record::with_id(id, payload.level, payload.timestamp_ms, payload.message)
    }
}

impl Record {
    /// Create a record with a fresh id.
    pub fn new(level: Level, timestamp_ms: u64, message: impl Into<String>) -> Self {
        Record::with_id(RecordId(Uuid::new_v4()), level, timestamp_ms, message)
    }

    /// Create a record with a known id.
    pub fn with_id(
        id: RecordId,
        level: Level,
        timestamp_ms: u64,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let message_lower = message.to_lowercase();
        Self {
            id,
            timestamp_ms,
            level,
            message,
            message_lower,
        }
    }

    /// Parse one raw JSON payload.
    ///
    /// This is the only entry point for untrusted input; callers drop the
    /// record on error and carry on (no buffer mutation, no callback).
    pub fn parse(json: &str) -> Result<Record, RecordError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_projection_precomputed() {
        let record = Record::new(Level::Info, 1_000, "Connection ESTABLISHED");
        assert_eq!(record.message_lower, "connection established");
    }

    #[test]
    fn parse_payload_with_and_without_id() {
        let with_id = r#"{
            "id": "9f7c8b31-3f9d-4b0a-9c3c-6b8df92f7e11",
            "timestamp_ms": 1700000000000,
            "level": "WARN",
            "message": "Disk Nearly Full"
        }"#;
        let record = Record::parse(with_id).unwrap();
        assert_eq!(record.level, Level::Warn);
        assert_eq!(record.message_lower, "disk nearly full");

        let without_id = r#"{"timestamp_ms": 5, "level": "INFO", "message": "ok"}"#;
        let record = Record::parse(without_id).unwrap();
        assert_eq!(record.timestamp_ms, 5);
    }

    #[test]
    fn malformed_payload_is_an_error_not_a_panic() {
        assert!(Record::parse("{not json").is_err());
        assert!(Record::parse(r#"{"level": "INFO"}"#).is_err());
        assert!(Record::parse(r#"{"timestamp_ms": 1, "level": "FATAL", "message": "x"}"#).is_err());
    }

    #[test]
    fn level_parse_accepts_common_spellings() {
        assert_eq!(Level::parse("error").unwrap(), Level::Error);
        assert_eq!(Level::parse("WARNING").unwrap(), Level::Warn);
        assert!(Level::parse("trace").is_err());
    }
}
