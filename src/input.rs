//! Line-oriented reading input.
//!
//! Each line carries one reading, either a bare value (`21.37`) or a channel
//! name and value separated by a comma or whitespace (`humidity,48.2`).
//! Blank lines and lines starting with `#` are ignored.

use crate::error::{Result, SensorError};

/// One unprocessed reading parsed from an input line
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub channel: Option<String>,
    pub value: f32,
}

pub fn parse_reading_line(line: &str) -> Result<Option<RawReading>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let parse_error = |reason: &str| SensorError::Parse {
        line: trimmed.to_string(),
        reason: reason.to_string(),
    };

    let fields: Vec<&str> = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect();

    let (channel, value) = match fields.as_slice() {
        [value] => (None, *value),
        [channel, value] => (Some(channel.to_string()), *value),
        _ => return Err(parse_error("expected `value` or `channel,value`")),
    };

    let value: f32 = value
        .parse()
        .map_err(|_| parse_error("value is not a number"))?;
    if !value.is_finite() {
        return Err(parse_error("value is not finite"));
    }

    Ok(Some(RawReading { channel, value }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_value() {
        let reading = parse_reading_line("  21.37 ").unwrap().unwrap();
        assert_eq!(reading.channel, None);
        assert_eq!(reading.value, 21.37);
    }

    #[test]
    fn test_channel_and_value() {
        for line in ["humidity,48.5", "humidity 48.5", "humidity, 48.5", "humidity\t48.5"] {
            let reading = parse_reading_line(line).unwrap().unwrap();
            assert_eq!(reading.channel.as_deref(), Some("humidity"));
            assert_eq!(reading.value, 48.5);
        }
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        assert_eq!(parse_reading_line("").unwrap(), None);
        assert_eq!(parse_reading_line("   ").unwrap(), None);
        assert_eq!(parse_reading_line("# sht31 trace").unwrap(), None);
    }

    #[test]
    fn test_rejects_bad_lines() {
        assert!(matches!(
            parse_reading_line("humidity,wet"),
            Err(SensorError::Parse { .. })
        ));
        assert!(parse_reading_line("a,b,3").is_err());
        assert!(parse_reading_line("NaN").is_err());
        assert!(parse_reading_line("temperature,inf").is_err());
    }
}
