use super::{Formatter, iso8601_timestamp};
use crate::processing::Reading;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, reading: &Reading) -> String {
        format!(
            "{},{},{},{}",
            iso8601_timestamp(),
            reading.channel,
            reading.raw,
            reading.value
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,channel,raw,value")
    }
}
