use super::Formatter;
use crate::processing::Reading;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, reading: &Reading) -> String {
        if self.verbose {
            format!(
                "{:<12} {:>10} (raw: {:>10})",
                reading.channel, reading.value, reading.raw
            )
        } else {
            format!("{:<12} {:>10}", reading.channel, reading.value)
        }
    }
}
