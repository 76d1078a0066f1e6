use serde::Serialize;

use super::{Formatter, iso8601_timestamp};
use crate::processing::Reading;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonRecord<'a> {
    ts: String,
    #[serde(flatten)]
    reading: &'a Reading,
}

impl Formatter for JsonFormatter {
    fn format(&self, reading: &Reading) -> String {
        let record = JsonRecord {
            ts: iso8601_timestamp(),
            reading,
        };
        serde_json::to_string(&record).unwrap_or_else(|e| {
            log::warn!("Failed to serialize reading: {}", e);
            String::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_record() {
        let reading = Reading {
            channel: "tvoc".to_string(),
            raw: 12000.0,
            value: 310.0,
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format(&reading)).unwrap();
        assert_eq!(parsed["channel"], "tvoc");
        assert_eq!(parsed["raw"], 12000.0);
        assert_eq!(parsed["value"], 310.0);
        assert!(parsed["ts"].is_string());
        assert_eq!(parsed.as_object().unwrap().len(), 4);
    }
}
