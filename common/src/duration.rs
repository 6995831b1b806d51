// Duration parsing for timer inputs such as "1d2h30m", "90m", "3h" or "90"

use crate::errors::DurationError;
use regex::Regex;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// Longest accepted timer, ten years
pub const MAX_DURATION_SECONDS: i64 = 3_650 * SECONDS_PER_DAY;

lazy_static::lazy_static! {
    /// OCR reads "5" as "S" often enough that an `s` glued to a unit letter is a digit
    static ref OCR_NOISE: Regex = Regex::new(r"[sS]([dhmDHM])").expect("Invalid regex pattern");

    /// Whole-input shape: one or more `<int><unit>` groups with loose separators
    static ref DURATION_SHAPE: Regex =
        Regex::new(r"^(?:[\s\p{P}]*[0-9]+\s*[dhm])+[\s\p{P}]*$").expect("Invalid regex pattern");

    static ref UNIT_GROUP: Regex = Regex::new(r"([0-9]+)\s*([dhm])").expect("Invalid regex pattern");
}

/// Replace an `s`/`S` that directly precedes a unit letter with `5`.
///
/// `"1Sd"` becomes `"15d"`; `"1S d"` is returned unchanged.
pub fn correct_ocr_noise(text: &str) -> String {
    OCR_NOISE.replace_all(text, "5$1").into_owned()
}

/// Parse a free-form duration into whole seconds.
///
/// Bare digits are minutes. Otherwise the input must be made of `<int>d`,
/// `<int>h` and `<int>m` groups in any order, each unit at most once,
/// separated by whitespace or punctuation. Totals above
/// [`MAX_DURATION_SECONDS`] are [`DurationError::OutOfRange`].
pub fn parse_duration(text: &str) -> Result<i64, DurationError> {
    let normalized = correct_ocr_noise(&text.trim().to_lowercase());

    if normalized.is_empty() {
        return Err(DurationError::InvalidFormat(text.to_string()));
    }

    if normalized.chars().all(|c| c.is_ascii_digit()) {
        let minutes = parse_amount(&normalized, text)?;
        return checked_seconds(minutes, SECONDS_PER_MINUTE, text).and_then(|s| in_range(s, text));
    }

    if !DURATION_SHAPE.is_match(&normalized) {
        return Err(DurationError::InvalidFormat(text.to_string()));
    }

    let mut days = None;
    let mut hours = None;
    let mut minutes = None;

    for caps in UNIT_GROUP.captures_iter(&normalized) {
        let amount = parse_amount(&caps[1], text)?;
        let slot = match &caps[2] {
            "d" => &mut days,
            "h" => &mut hours,
            _ => &mut minutes,
        };
        if slot.replace(amount).is_some() {
            return Err(DurationError::InvalidFormat(text.to_string()));
        }
    }

    let total = [
        (days, SECONDS_PER_DAY),
        (hours, SECONDS_PER_HOUR),
        (minutes, SECONDS_PER_MINUTE),
    ]
    .into_iter()
    .try_fold(0i64, |acc, (amount, unit)| {
        let part = checked_seconds(amount.unwrap_or(0), unit, text)?;
        acc.checked_add(part)
            .ok_or_else(|| DurationError::OutOfRange(text.to_string()))
    })?;

    in_range(total, text)
}

fn parse_amount(digits: &str, original: &str) -> Result<i64, DurationError> {
    digits
        .parse::<i64>()
        .map_err(|_| DurationError::OutOfRange(original.to_string()))
}

fn checked_seconds(amount: i64, unit: i64, original: &str) -> Result<i64, DurationError> {
    amount
        .checked_mul(unit)
        .ok_or_else(|| DurationError::OutOfRange(original.to_string()))
}

fn in_range(seconds: i64, original: &str) -> Result<i64, DurationError> {
    if seconds <= 0 {
        Err(DurationError::NotPositive(original.to_string()))
    } else if seconds > MAX_DURATION_SECONDS {
        Err(DurationError::OutOfRange(original.to_string()))
    } else {
        Ok(seconds)
    }
}
