use crate::errors::{FilterError, Result};
use crate::model::{Filter, FilterValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const RANGE_SEPARATOR: &str = " TO ";
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Splits `start TO end`, tolerating surrounding `[` `]`.
pub fn split_range(value: &str) -> Option<(&str, &str)> {
    let value = value.trim();
    let value = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);
    let (start, end) = value.split_once(RANGE_SEPARATOR)?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() || end.contains(RANGE_SEPARATOR) {
        return None;
    }
    Some((start, end))
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

fn end_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    dt.date_naive().and_time(last_second).and_utc()
}

/// Compiles `"<start> TO <end>"` into `[start TO end]`, with the end bound
/// moved to 23:59:59 of its day. `*` keeps a bound open.
pub fn date_range_value(_filter: &Filter, value: &str) -> Result<String> {
    let invalid = || FilterError::InvalidDateRange(value.to_string());
    let (start, end) = split_range(value).ok_or_else(invalid)?;
    let start = match start {
        "*" => None,
        s => Some(parse_datetime(s).ok_or_else(invalid)?),
    };
    let end = match end {
        "*" => None,
        s => Some(end_of_day(parse_datetime(s).ok_or_else(invalid)?)),
    };
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(invalid());
        }
    }
    let fmt = |d: Option<DateTime<Utc>>| {
        d.map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "*".to_string())
    };
    Ok(format!("[{} TO {}]", fmt(start), fmt(end)))
}

fn parse_bound(s: &str) -> Option<Option<f64>> {
    if s == "*" {
        return Some(None);
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite()).map(Some)
}

/// Validates `min TO max` and renders `[min TO max]`.
pub fn numeric_range_value(_filter: &Filter, value: &str) -> Result<String> {
    let invalid = || FilterError::InvalidNumericRange(value.to_string());
    let (min, max) = split_range(value).ok_or_else(invalid)?;
    let lo = parse_bound(min).ok_or_else(invalid)?;
    let hi = parse_bound(max).ok_or_else(invalid)?;
    if let (Some(lo), Some(hi)) = (lo, hi) {
        if lo > hi {
            return Err(invalid());
        }
    }
    Ok(format!("[{min} TO {max}]"))
}

/// A numeric range filter carries `[min, max]` as one value; rewrites it to
/// the `min TO max` form so the range is not split into two values.
pub fn numeric_range_filter(filter: &Filter) -> Result<Filter> {
    let q = match &filter.q {
        None => None,
        Some(FilterValue::One(v)) => Some(FilterValue::One(v.clone())),
        Some(FilterValue::Many(v)) if v.is_empty() => None,
        Some(FilterValue::Many(v)) => match v.as_slice() {
            [min, max] => Some(FilterValue::One(format!(
                "{}{RANGE_SEPARATOR}{}",
                min.trim(),
                max.trim()
            ))),
            _ => {
                return Err(FilterError::InvalidNumericRange(format!(
                    "expected [min, max], got {} values",
                    v.len()
                )))
            }
        },
    };
    Ok(Filter {
        q,
        ..filter.clone()
    })
}

/// Start and end of a `start TO end` date range, verbatim.
pub fn date_range_bounds(value: &str) -> Option<(String, String)> {
    split_range(value).map(|(s, e)| (s.to_string(), e.to_string()))
}
