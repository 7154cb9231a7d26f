//! French-locale display helpers for results pages.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// U+202F, the thousands separator and unit spacer used by `fr-FR`.
pub const NARROW_NBSP: char = '\u{202F}';

/// `1234567` -> `"1 234 567"` (narrow no-break spaces).
#[must_use]
pub fn format_number(value: i64) -> String {
    let grouped = group_digits(&value.unsigned_abs().to_string());
    if value < 0 { format!("-{grouped}") } else { grouped }
}

/// `45.678, 2` -> `"45,68 %"`. Non-finite values render as `"-"`; values
/// that round to zero never carry a minus sign.
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_owned();
    }
    let magnitude = value.abs();
    let fixed = format!("{magnitude:.decimals$}");
    let sign = if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) { "-" } else { "" };
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = group_digits(int_part);
    match frac_part {
        Some(frac) => format!("{sign}{grouped},{frac}{NARROW_NBSP}%"),
        None => format!("{sign}{grouped}{NARROW_NBSP}%"),
    }
}

/// Insert a narrow no-break space every three digits from the right.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * NARROW_NBSP.len_utf8());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(NARROW_NBSP);
        }
        out.push(ch);
    }
    out
}

/// Turnout in percent; `None` when there are no registered voters.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn participation_rate(votants: u64, inscrits: u64) -> Option<f64> {
    (inscrits > 0).then(|| votants as f64 * 100.0 / inscrits as f64)
}

/// `dd/mm/yyyy HH:MM`, in the timestamp's own offset.
#[must_use]
pub fn format_datetime(at: OffsetDateTime) -> String {
    format!(
        "{:02}/{:02}/{} {:02}:{:02}",
        at.day(),
        u8::from(at.month()),
        at.year(),
        at.hour(),
        at.minute()
    )
}

/// Backend timestamps are RFC 3339; anything else is shown as-is.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    OffsetDateTime::parse(raw, &Rfc3339).map_or_else(|_| raw.to_owned(), format_datetime)
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
