//! CF-convention time decoding.
//!
//! Time axes in NetCDF files store offsets such as `hours since 1900-01-01`.
//! They are decoded into datetimes so time bounds can be given as date labels.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::str::FromStr;

use crate::error::{EcubevisError, Result};

/// Calendars that match chrono's proleptic Gregorian dates
const GREGORIAN_CALENDARS: [&str; 3] = ["standard", "gregorian", "proleptic_gregorian"];

/// Parsed `"<unit> since <reference>"` attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    pub seconds_per_unit: f64,
    pub reference: NaiveDateTime,
}

impl TimeUnits {
    /// Whether a units string looks like a CF time axis
    pub fn is_time_units(units: &str) -> bool {
        units.to_lowercase().contains(" since ")
    }

    /// The datetime `offset` units after the reference
    pub fn at(&self, offset: f64) -> Option<NaiveDateTime> {
        if !offset.is_finite() {
            return None;
        }
        let millis = (offset * self.seconds_per_unit * 1000.0).round();
        if millis.abs() >= i64::MAX as f64 {
            return None;
        }
        self.reference.checked_add_signed(Duration::milliseconds(millis as i64))
    }
}

impl FromStr for TimeUnits {
    type Err = EcubevisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let (unit, reference) = lower.split_once(" since ").ok_or_else(|| invalid_units(s))?;

        let seconds_per_unit = match unit.trim() {
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3600.0,
            "days" | "day" | "d" => 86400.0,
            _ => return Err(invalid_units(s)),
        };

        Ok(Self {
            seconds_per_unit,
            reference: parse_reference(reference).ok_or_else(|| invalid_units(s))?,
        })
    }
}

fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    let reference = reference
        .trim()
        .trim_end_matches("utc")
        .trim_end_matches('z')
        .trim();

    const FORMATS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dt%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dt%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dt%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(reference, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(reference, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn invalid_units(units: &str) -> EcubevisError {
    EcubevisError::InvalidCoordinates {
        message: format!("Unsupported time units: '{}'", units),
    }
}

/// Decode raw offsets into datetimes.
///
/// Only Gregorian-compatible calendars are supported; every value must be finite.
pub fn decode_times(values: &[f64], units: &str, calendar: Option<&str>) -> Result<Vec<NaiveDateTime>> {
    if let Some(calendar) = calendar {
        if !GREGORIAN_CALENDARS.contains(&calendar.trim().to_lowercase().as_str()) {
            return Err(EcubevisError::InvalidCoordinates {
                message: format!("Unsupported calendar: '{}'", calendar),
            });
        }
    }

    let units: TimeUnits = units.parse()?;
    values
        .iter()
        .map(|&v| {
            units.at(v).ok_or_else(|| EcubevisError::InvalidCoordinates {
                message: format!("Time offset {} cannot be decoded", v),
            })
        })
        .collect()
}
