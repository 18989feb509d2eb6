// Scan interpretation - turns OCR text from a counter display into a reading
use serde::Serialize;

const TYPICAL_MIN: u64 = 1000;
const TYPICAL_MAX: u64 = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReading {
    pub digits: String,
    pub value: f64,
    pub warning: Option<String>,
}

/// Keeps the ASCII digits of `text` without leading zeros.
///
/// Returns `None` when the text holds no digit at all; a run of zeros reads as `"0"`.
pub fn extract_digits(text: &str) -> Option<String> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return Some("0".to_string());
    }
    Some(trimmed.to_string())
}

pub fn interpret(text: &str) -> Option<ScanReading> {
    let digits = extract_digits(text)?;
    let value = digits.parse::<u64>().ok()?;

    let warning = (!(TYPICAL_MIN..=TYPICAL_MAX).contains(&value))
        .then(|| format!("Value {value} seems unusual. Please verify."));

    Some(ScanReading {
        digits,
        value: value as f64,
        warning,
    })
}
