use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(RecordId);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keys owned by the server. Caller-supplied values for these are dropped.
pub const RESERVED_FIELDS: [&str; 2] = ["id", "timestamp"];

/// A stored submission: generated `id` and `timestamp` plus whatever fields
/// the caller sent, flattened into a single JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: RecordId, timestamp: DateTime<Utc>, mut fields: Map<String, Value>) -> Self {
        for key in RESERVED_FIELDS {
            fields.remove(key);
        }
        Self {
            id,
            timestamp,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod iso_millis {
    use super::*;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_760_000_000_125).single().expect("time")
    }

    #[test]
    fn record_serializes_as_flat_object() {
        let fields = json!({ "name": "Ann" }).as_object().cloned().expect("object");
        let record = Record::new(RecordId(1_760_000_000_125), fixed_time(), fields);

        let value = serde_json::to_value(&record).expect("json");
        assert_eq!(
            value,
            json!({
                "id": 1_760_000_000_125_i64,
                "timestamp": "2025-10-09T08:53:20.125Z",
                "name": "Ann",
            })
        );
    }

    #[test]
    fn reserved_keys_from_caller_are_dropped() {
        let fields = json!({ "id": "spoofed", "timestamp": "yesterday", "note": "hi" })
            .as_object()
            .cloned()
            .expect("object");
        let record = Record::new(RecordId(7), fixed_time(), fields);

        assert_eq!(record.id, RecordId(7));
        assert!(record.field("id").is_none());
        assert!(record.field("timestamp").is_none());
        assert_eq!(record.field("note"), Some(&json!("hi")));
    }

    #[test]
    fn record_reads_back_from_wire_form() {
        let record: Record = serde_json::from_value(json!({
            "id": 42,
            "timestamp": "2025-10-09T08:53:20.125Z",
            "email": "ann@example.com",
        }))
        .expect("record");

        assert_eq!(record.id, RecordId(42));
        assert_eq!(record.timestamp, fixed_time());
        assert_eq!(record.fields.len(), 1);
    }
}
