//! Ordered field-alias tables for provider payloads.
//!
//! Providers spell the same semantic field differently (`lat`, `LAT`,
//! `latitude`) or carry it by position in an array. Each mapper declares a
//! [`FieldAlias`] per semantic field listing the keys to try, in priority
//! order; the first key holding a usable value wins. Lookups never mutate
//! the payload.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Epoch values above this are taken to be milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 100_000_000_000.0;

/// Where a field lives inside a provider item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    /// Object member name.
    Name(&'static str),
    /// Array position.
    Index(usize),
}

impl FieldKey {
    fn lookup<'a>(&self, item: &'a Value) -> Option<&'a Value> {
        match self {
            FieldKey::Name(name) => item.get(name),
            FieldKey::Index(index) => item.get(index),
        }
    }
}

/// One semantic field and the keys that may carry it.
#[derive(Debug, Clone, Copy)]
pub struct FieldAlias {
    pub name: &'static str,
    pub keys: &'static [FieldKey],
}

impl FieldAlias {
    pub const fn new(name: &'static str, keys: &'static [FieldKey]) -> Self {
        Self { name, keys }
    }

    /// Values present under any key, in priority order, skipping null and
    /// blank strings.
    fn populated<'a>(&self, item: &'a Value) -> impl Iterator<Item = &'a Value> + 'a {
        let keys = self.keys;
        keys.iter()
            .filter_map(move |key| key.lookup(item))
            .filter(|value| match value {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
    }

    /// First value that reads as a finite number. Numeric strings count.
    pub fn number(&self, item: &Value) -> Option<f64> {
        self.populated(item).find_map(as_number)
    }

    /// First value rendered as trimmed, non-empty text.
    ///
    /// Integral numbers are rendered without a fractional part, so an MMSI
    /// sent as `244660000` and as `"244660000"` read the same.
    pub fn text(&self, item: &Value) -> Option<String> {
        self.populated(item).find_map(as_text)
    }

    /// First value that reads as a boolean (`true`, `1`, `"true"`, `"1"`).
    pub fn boolean(&self, item: &Value) -> Option<bool> {
        self.populated(item).find_map(as_bool)
    }

    /// First value that reads as a timestamp: epoch seconds or milliseconds,
    /// RFC 3339, or `YYYY-MM-DD HH:MM:SS` in UTC.
    pub fn timestamp(&self, item: &Value) -> Option<DateTime<Utc>> {
        self.populated(item).find_map(|value| match value {
            Value::String(s) => parse_timestamp_text(s),
            other => as_number(other).and_then(timestamp_from_epoch),
        })
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Some(i.to_string()),
            (_, Some(u)) => Some(u.to_string()),
            _ => n.as_f64().map(|f| {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            }),
        },
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().and_then(|i| match i {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Convert epoch seconds or milliseconds to a UTC timestamp.
pub fn timestamp_from_epoch(epoch: f64) -> Option<DateTime<Utc>> {
    if !epoch.is_finite() || epoch <= 0.0 {
        return None;
    }
    let millis = if epoch > EPOCH_MILLIS_THRESHOLD {
        epoch
    } else {
        epoch * 1000.0
    };
    Utc.timestamp_millis_opt(millis.round() as i64).single()
}

/// Parse RFC 3339 or a naive `YYYY-MM-DD HH:MM:SS` (taken as UTC).
///
/// A trailing ` UTC` or ` GMT` zone label is accepted.
pub fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    let text = text
        .strip_suffix(" UTC")
        .or_else(|| text.strip_suffix(" GMT"))
        .unwrap_or(text);
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| text.parse::<f64>().ok().and_then(timestamp_from_epoch))
}

/// Fold an angle into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let folded = degrees.rem_euclid(360.0);
    if folded >= 360.0 {
        0.0
    } else {
        folded
    }
}
