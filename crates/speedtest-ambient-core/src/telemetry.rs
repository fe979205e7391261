//! Ambient record formatting
//!
//! A measurement is uploaded as one Ambient data point: numbered fields
//! `d1`..`dN` plus a `created` timestamp in a fixed local offset.
//!
//! | Field | Value |
//! |-------|-------|
//! | `d1` | latency (ms) |
//! | `d2` | jitter (ms) |
//! | `d3` | download (Mbps) |
//! | `d4` | upload (Mbps) |
//! | `d5` | packet loss (only when measured) |
//! | `created` | `YYYY-MM-DD HH:MM:SS` in the configured offset |

use crate::traits::SpeedTestResult;
use chrono::FixedOffset;
use serde::Serialize;
use serde_json::{Map, Value};

/// Format of the `created` field
pub const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One Ambient data point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AmbientRecord(Map<String, Value>);

impl AmbientRecord {
    /// Build the data point for a speed test result
    pub fn from_result(result: &SpeedTestResult, offset: FixedOffset) -> Self {
        let mut data = vec![
            result.latency_ms,
            result.jitter_ms,
            result.download_mbps(),
            result.upload_mbps(),
        ];
        if let Some(packet_loss) = result.packet_loss {
            data.push(packet_loss);
        }

        let mut fields: Map<String, Value> = data
            .into_iter()
            .enumerate()
            .map(|(i, value)| (format!("d{}", i + 1), Value::from(value)))
            .collect();

        let created = result
            .timestamp
            .with_timezone(&offset)
            .format(CREATED_FORMAT)
            .to_string();
        fields.insert("created".to_string(), Value::String(created));

        Self(fields)
    }

    /// Look up a single field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of `dN` data fields
    pub fn data_len(&self) -> usize {
        self.0.keys().filter(|key| key.starts_with('d')).count()
    }

    /// The record as a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
