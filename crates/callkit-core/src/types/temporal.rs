//! Textual syntax for instants and durations.
//!
//! Instants are tried against [`INSTANT_FORMATS`] in order, first match wins.
//! Durations use a compact unit-suffixed syntax (`90s`, `1h30m`, `-1.5ms`)
//! and render back in the same syntax.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, TimeZone, Utc};

/// Accepted instant layouts, tried in order.
pub const INSTANT_FORMATS: &[InstantFormat] = &[
    InstantFormat::Rfc3339,
    InstantFormat::Offset("%Y-%m-%d %H:%M:%S%.f %z"),
    InstantFormat::Naive("%Y-%m-%dT%H:%M:%S%.f"),
    InstantFormat::Naive("%Y-%m-%d %H:%M:%S%.f"),
    InstantFormat::Naive("%Y-%m-%dT%H:%M"),
    InstantFormat::Naive("%Y-%m-%d %H:%M"),
    InstantFormat::Date("%Y-%m-%d"),
];

/// One entry in the instant format list. Naive and date-only forms are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantFormat {
    Rfc3339,
    Offset(&'static str),
    Naive(&'static str),
    Date(&'static str),
}

impl InstantFormat {
    fn parse(self, s: &str) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Rfc3339 => DateTime::parse_from_rfc3339(s).ok(),
            Self::Offset(fmt) => DateTime::parse_from_str(s, fmt).ok(),
            Self::Naive(fmt) => NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset()),
            Self::Date(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()
                .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).fixed_offset()),
        }
    }
}

/// Errors from the temporal text syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemporalError {
    #[error("no instant format matches {0:?}")]
    UnknownInstantFormat(String),

    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {text:?}")]
    UnknownUnit { unit: String, text: String },

    #[error("duration {0:?} overflows")]
    DurationOverflow(String),
}

/// The zero instant: the Unix epoch in UTC.
pub fn zero_instant() -> DateTime<FixedOffset> {
    DateTime::<Utc>::default().fixed_offset()
}

pub fn parse_instant(s: &str) -> Result<DateTime<FixedOffset>, TemporalError> {
    INSTANT_FORMATS
        .iter()
        .find_map(|fmt| fmt.parse(s))
        .ok_or_else(|| TemporalError::UnknownInstantFormat(s.to_string()))
}

/// Canonical instant text. Always accepted by [`parse_instant`].
pub fn format_instant(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

const NANOSECOND: u128 = 1;
const MICROSECOND: u128 = 1_000 * NANOSECOND;
const MILLISECOND: u128 = 1_000 * MICROSECOND;
const SECOND: u128 = 1_000 * MILLISECOND;
const MINUTE: u128 = 60 * SECOND;
const HOUR: u128 = 60 * MINUTE;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(NANOSECOND),
        // U+00B5 micro sign and U+03BC Greek mu are both accepted.
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Parse a duration such as `300ms`, `-1.5h` or `2h45m`.
///
/// A sign is optional. `0` alone is the zero duration; any other quantity
/// needs a unit.
pub fn parse_duration(text: &str) -> Result<TimeDelta, TemporalError> {
    let invalid = || TemporalError::InvalidDuration(text.to_string());
    let overflow = || TemporalError::DurationOverflow(text.to_string());

    let mut s = text;
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    if s == "0" {
        return Ok(TimeDelta::zero());
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let limit = i64::MAX as u128 + u128::from(negative);
    let mut total: u128 = 0;
    while !s.is_empty() {
        let first = s.as_bytes()[0];
        if !(first == b'.' || first.is_ascii_digit()) {
            return Err(invalid());
        }

        let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, rest) = s.split_at(int_len);
        s = rest;
        let mut whole: u128 = 0;
        for b in int_digits.bytes() {
            whole = whole
                .checked_mul(10)
                .and_then(|w| w.checked_add(u128::from(b - b'0')))
                .filter(|w| *w <= limit)
                .ok_or_else(overflow)?;
        }

        let mut frac: u128 = 0;
        let mut scale: f64 = 1.0;
        let mut frac_len = 0;
        if let Some(rest) = s.strip_prefix('.') {
            frac_len = rest.bytes().take_while(u8::is_ascii_digit).count();
            let (frac_digits, rest) = rest.split_at(frac_len);
            s = rest;
            let mut saturated = false;
            for b in frac_digits.bytes() {
                if saturated {
                    continue;
                }
                match frac.checked_mul(10).and_then(|f| f.checked_add(u128::from(b - b'0'))) {
                    Some(f) if f <= i64::MAX as u128 => {
                        frac = f;
                        scale *= 10.0;
                    }
                    _ => saturated = true,
                }
            }
        }
        if int_len == 0 && frac_len == 0 {
            return Err(invalid());
        }

        let unit_len = s
            .char_indices()
            .find(|(_, c)| *c == '.' || c.is_ascii_digit())
            .map_or(s.len(), |(i, _)| i);
        if unit_len == 0 {
            return Err(TemporalError::MissingUnit(text.to_string()));
        }
        let (unit, rest) = s.split_at(unit_len);
        s = rest;
        let unit_ns = unit_nanos(unit).ok_or_else(|| TemporalError::UnknownUnit {
            unit: unit.to_string(),
            text: text.to_string(),
        })?;

        let mut quantity = whole.checked_mul(unit_ns).ok_or_else(overflow)?;
        if frac > 0 {
            quantity += (frac as f64 * (unit_ns as f64 / scale)) as u128;
        }
        total = total
            .checked_add(quantity)
            .filter(|t| *t <= limit)
            .ok_or_else(overflow)?;
    }

    let nanos = if negative {
        -(total as i128)
    } else {
        total as i128
    };
    let nanos = i64::try_from(nanos).map_err(|_| overflow())?;
    Ok(TimeDelta::nanoseconds(nanos))
}

/// Canonical duration text, e.g. `1h30m0s`, `1.5ms`, `0s`.
pub fn format_duration(d: &TimeDelta) -> String {
    let nanos = i128::from(d.num_seconds()) * SECOND as i128 + i128::from(d.subsec_nanos());
    let negative = nanos < 0;
    let u = nanos.unsigned_abs();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if u == 0 {
        return "0s".to_string();
    }
    if u < SECOND {
        if u < MICROSECOND {
            out.push_str(&format!("{u}ns"));
        } else if u < MILLISECOND {
            out.push_str(&fmt_frac(u, 3));
            out.push_str("\u{00b5}s");
        } else {
            out.push_str(&fmt_frac(u, 6));
            out.push_str("ms");
        }
        return out;
    }

    let total_secs = u / SECOND;
    let minutes = total_secs / 60;
    if minutes > 0 {
        let hours = minutes / 60;
        if hours > 0 {
            out.push_str(&format!("{hours}h"));
        }
        out.push_str(&format!("{}m", minutes % 60));
    }
    out.push_str(&fmt_frac(u % MINUTE, 9));
    out.push('s');
    out
}

/// `v / 10^prec` with its fractional digits, trailing zeros trimmed.
fn fmt_frac(v: u128, prec: u32) -> String {
    let base = 10u128.pow(prec);
    let whole = v / base;
    let frac = v % base;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:0width$}", width = prec as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
