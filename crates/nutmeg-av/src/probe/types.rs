//! Inspection report types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Deref;

/// Key/value metadata for a container or a single stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Wrap a JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Integer value of `key`, if it holds one.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Numeric value of `key` as a float (integers included).
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Text value of `key`, if it stayed text.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Unwrap into the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for Record {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Container-level and per-stream metadata from one inspection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Container (`format`) record.
    pub container: Record,
    /// Stream records in ffprobe's order.
    pub streams: Vec<Record>,
}

impl ProbeReport {
    /// Number of streams in the file.
    pub fn num_streams(&self) -> usize {
        self.streams.len()
    }

    /// Container duration in seconds.
    pub fn duration(&self) -> Option<f64> {
        self.container.get_f64("duration")
    }

    /// Streams whose `codec_type` equals `kind` (e.g. `"video"`).
    pub fn streams_of_type<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.streams
            .iter()
            .filter(move |s| s.get_str("codec_type") == Some(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_accessors() {
        let r = record(json!({"width": 1920, "duration": 12.5, "codec_name": "h264"}));
        assert_eq!(r.get_i64("width"), Some(1920));
        assert_eq!(r.get_f64("width"), Some(1920.0));
        assert_eq!(r.get_f64("duration"), Some(12.5));
        assert_eq!(r.get_i64("duration"), None);
        assert_eq!(r.get_str("codec_name"), Some("h264"));
        assert_eq!(r.get_str("missing"), None);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_report_helpers() {
        let report = ProbeReport {
            container: record(json!({"duration": 60.0})),
            streams: vec![
                record(json!({"index": 0, "codec_type": "video"})),
                record(json!({"index": 1, "codec_type": "audio"})),
                record(json!({"index": 2, "codec_type": "audio"})),
            ],
        };
        assert_eq!(report.num_streams(), 3);
        assert_eq!(report.duration(), Some(60.0));
        assert_eq!(report.streams_of_type("audio").count(), 2);
        assert_eq!(report.streams_of_type("subtitle").count(), 0);
    }

    #[test]
    fn test_record_serializes_transparently() {
        let r = record(json!({"index": 0}));
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"index":0}"#);
    }
}
