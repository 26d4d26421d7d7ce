use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Stored when the last deposit date is missing or unparsable.
pub const UNKNOWN_DAYS: u32 = 999;

enum DateLayout {
    DateTime(&'static str),
    Date(&'static str),
}

// Tried in order; the first layout that parses wins.
const DEPOSIT_DATE_LAYOUTS: [DateLayout; 6] = [
    DateLayout::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
    DateLayout::DateTime("%Y-%m-%dT%H:%M:%S"),
    DateLayout::DateTime("%Y-%m-%d %H:%M:%S"),
    DateLayout::Date("%Y-%m-%d"),
    DateLayout::Date("%d.%m.%Y"),
    DateLayout::DateTime("%d.%m.%Y %H:%M:%S"),
];

const NULL_MARKERS: [&str; 5] = ["nan", "none", "null", "undefined", "bilinmiyor"];

pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|err| anyhow!(err))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parses backoffice timestamps such as `2025-08-01T10:15:00.123`,
/// `2025-08-01 10:15:00` or `01.08.2025`.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    for layout in DEPOSIT_DATE_LAYOUTS.iter() {
        let parsed = match layout {
            DateLayout::DateTime(fmt) => NaiveDateTime::parse_from_str(trimmed, fmt)
                .ok()
                .map(|dt| dt.date()),
            DateLayout::Date(fmt) => NaiveDate::parse_from_str(trimmed, fmt).ok(),
        };
        if parsed.is_some() {
            return parsed;
        }
    }
    None
}

/// Whole days between a backoffice timestamp and `today`, clamped at zero.
/// Missing or unparsable input yields [`UNKNOWN_DAYS`].
pub fn days_since(value: Option<&str>, today: NaiveDate) -> u32 {
    let Some(value) = value else {
        return UNKNOWN_DAYS;
    };
    if is_null_marker(value) {
        return UNKNOWN_DAYS;
    }
    match parse_flexible_date(value) {
        Some(date) => {
            let days = today.signed_duration_since(date).num_days().max(0);
            u32::try_from(days).unwrap_or(u32::MAX)
        }
        None => UNKNOWN_DAYS,
    }
}

pub fn is_null_marker(value: &str) -> bool {
    let lowered = value.trim().to_lowercase();
    lowered.is_empty() || NULL_MARKERS.contains(&lowered.as_str())
}

/// Trims text and maps placeholder values (`nan`, `None`, `null`) to empty.
pub fn clean_text(value: &str) -> String {
    if is_null_marker(value) {
        String::new()
    } else {
        value.trim().to_string()
    }
}

/// Renders a float the way a spreadsheet id cell is expected to read:
/// integral values lose their fractional part.
pub fn number_to_text(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value).map(|d| d.normalize())
}

/// Parses `1234.5`, `1,234.50`, `1.234,50`, `12,5` and a trailing currency marker.
pub fn parse_amount_text(value: &str) -> Option<Decimal> {
    let mut cleaned: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    for marker in ["₺", "TRY", "TL"] {
        if let Some(rest) = cleaned.strip_suffix(marker) {
            cleaned = rest.to_string();
        }
        if let Some(rest) = cleaned.strip_prefix(marker) {
            cleaned = rest.to_string();
        }
    }
    if cleaned.is_empty() || is_null_marker(&cleaned) {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let canonical = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(comma), None) => {
            let decimals = cleaned.len() - comma - 1;
            if cleaned.matches(',').count() == 1 && decimals != 3 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, Some(_)) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    Decimal::from_str(&canonical)
        .or_else(|_| Decimal::from_scientific(&canonical))
        .ok()
        .map(|d| d.normalize())
}

/// Whole, non-negative count from a decimal; `None` for negatives.
pub fn decimal_to_count(value: Decimal) -> Option<u64> {
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    value.trunc().to_u64()
}

/// Boundary deserializers for persisted JSON written by older tools, where
/// ids may be numbers, counts may be floats and amounts may be strings.
pub mod lenient {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{clean_text, decimal_from_f64, decimal_to_count, number_to_text, parse_amount_text};

    fn value_to_text(value: Option<Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => clean_text(&text),
            Some(Value::Number(number)) => {
                if let Some(int) = number.as_i64() {
                    int.to_string()
                } else if let Some(uint) = number.as_u64() {
                    uint.to_string()
                } else {
                    number.as_f64().map(number_to_text).unwrap_or_default()
                }
            }
            Some(Value::Bool(flag)) => flag.to_string(),
            Some(other) => other.to_string(),
        }
    }

    fn value_to_decimal(value: Option<Value>) -> Option<Decimal> {
        match value {
            Some(Value::Number(number)) => {
                if let Some(int) = number.as_i64() {
                    Some(Decimal::from(int))
                } else if let Some(uint) = number.as_u64() {
                    Some(Decimal::from(uint))
                } else {
                    number.as_f64().and_then(decimal_from_f64)
                }
            }
            Some(Value::String(text)) => parse_amount_text(&text),
            _ => None,
        }
    }

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value_to_text(value))
    }

    pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        let text = value_to_text(value);
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    pub fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value_to_decimal(value).unwrap_or_default())
    }

    pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value_to_decimal(value)
            .and_then(decimal_to_count)
            .unwrap_or_default())
    }
}
