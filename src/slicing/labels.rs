//! Partial-precision datetime labels.
//!
//! A label such as `2000-03` names a whole period (March 2000). Time label ranges
//! start at the beginning of the first label's period and end at the end of the
//! second label's period.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{EcubevisError, Result};

/// The half-open period `[start, end)` covered by a datetime label.
///
/// Accepted forms: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, and a date followed by
/// `T` or a space and `HH`, `HH:MM` or `HH:MM:SS`.
pub fn label_period(label: &str) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let label = label.trim();
    let (date_part, time_part) = match label.find(|c: char| c == 'T' || c == ' ') {
        Some(pos) => (&label[..pos], Some(label[pos + 1..].trim())),
        None => (label, None),
    };

    let date_fields = parse_fields(date_part, '-', label)?;
    let (year, month, day) = match date_fields.as_slice() {
        [y] => (*y as i32, 1, 1),
        [y, m] => (*y as i32, *m, 1),
        [y, m, d] => (*y as i32, *m, *d),
        _ => return Err(invalid(label)),
    };
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid(label))?;

    let Some(time_part) = time_part else {
        let start = date.and_hms_opt(0, 0, 0).ok_or_else(|| invalid(label))?;
        let end = match date_fields.len() {
            1 => NaiveDate::from_ymd_opt(year + 1, 1, 1),
            2 if month == 12 => NaiveDate::from_ymd_opt(year + 1, 1, 1),
            2 => NaiveDate::from_ymd_opt(year, month + 1, 1),
            _ => date.succ_opt(),
        }
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| invalid(label))?;
        return Ok((start, end));
    };

    let time_fields = parse_fields(time_part, ':', label)?;
    let (hour, minute, second, step) = match time_fields.as_slice() {
        [h] => (*h, 0, 0, Duration::hours(1)),
        [h, m] => (*h, *m, 0, Duration::minutes(1)),
        [h, m, s] => (*h, *m, *s, Duration::seconds(1)),
        _ => return Err(invalid(label)),
    };
    let start = date
        .and_hms_opt(hour, minute, second)
        .ok_or_else(|| invalid(label))?;
    Ok((start, start + step))
}

fn parse_fields(part: &str, separator: char, label: &str) -> Result<Vec<u32>> {
    part.split(separator)
        .map(|field| {
            if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid(label));
            }
            field.parse::<u32>().map_err(|_| invalid(label))
        })
        .collect()
}

fn invalid(label: &str) -> EcubevisError {
    EcubevisError::InvalidParameter {
        param: "slice_time".to_string(),
        message: format!("Cannot interpret '{}' as a date label", label),
    }
}
