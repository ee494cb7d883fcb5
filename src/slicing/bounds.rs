//! Per-axis bound types.

use std::ops::Range;
use std::str::FromStr;

use crate::error::{EcubevisError, Result};

/// Bound on the time axis, either by label or by position
#[derive(Debug, Clone, PartialEq)]
pub enum TimeBound {
    /// Inclusive label range, e.g. `("2000-01", "2000-03-15")`
    ByLabel(String, String),
    /// Half-open positional range; negative indices count from the end
    ByIndex(i64, i64),
}

/// Half-open positional range with Python-style index resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: i64,
    pub stop: i64,
}

/// Value bounds for lat/lon selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl IndexRange {
    pub fn new(start: i64, stop: i64) -> Self {
        Self { start, stop }
    }

    /// Resolve against an axis of length `len`. Negative indices count from the
    /// end and both ends are clamped, so the result is always a valid range.
    pub fn resolve(&self, len: usize) -> Range<usize> {
        let start = resolve_index(self.start, len);
        let stop = resolve_index(self.stop, len).max(start);
        start..stop
    }
}

fn resolve_index(index: i64, len: usize) -> usize {
    let len_i = len as i64;
    if index < 0 {
        (len_i + index).max(0) as usize
    } else {
        index.min(len_i) as usize
    }
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Open-interval membership: `min < value < max`
    pub fn contains_open(&self, value: f64) -> bool {
        self.min < value && value < self.max
    }
}

/// Split "a,b" into its two trimmed halves
fn split_pair<'a>(s: &'a str, param: &str) -> Result<(&'a str, &'a str)> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [a, b] if !a.is_empty() && !b.is_empty() => Ok((a, b)),
        _ => Err(EcubevisError::InvalidParameter {
            param: param.to_string(),
            message: format!("Expected two comma-separated values, got '{}'", s),
        }),
    }
}

fn parse_number<T: FromStr>(value: &str, param: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| EcubevisError::InvalidParameter {
        param: param.to_string(),
        message: format!("Invalid number: {}", value),
    })
}

impl FromStr for TimeBound {
    type Err = EcubevisError;

    /// Two integers give an index range, anything else a label range.
    ///
    /// A bare year is an integer, so `"2000,2001"` means positions 2000..2001.
    /// Write whole years as month labels instead: `"2000-01,2001-12"`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (a, b) = split_pair(s, "slice_time")?;
        match (a.parse::<i64>(), b.parse::<i64>()) {
            (Ok(start), Ok(stop)) => Ok(TimeBound::ByIndex(start, stop)),
            _ => Ok(TimeBound::ByLabel(a.to_string(), b.to_string())),
        }
    }
}

impl FromStr for IndexRange {
    type Err = EcubevisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (a, b) = split_pair(s, "slice_level")?;
        Ok(IndexRange::new(
            parse_number(a, "slice_level")?,
            parse_number(b, "slice_level")?,
        ))
    }
}

impl FromStr for ValueRange {
    type Err = EcubevisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (a, b) = split_pair(s, "bounds")?;
        let min: f64 = parse_number(a, "bounds")?;
        let max: f64 = parse_number(b, "bounds")?;
        if !(min.is_finite() && max.is_finite()) {
            return Err(EcubevisError::InvalidParameter {
                param: "bounds".to_string(),
                message: format!("Bounds must be finite numbers, got '{}'", s),
            });
        }
        Ok(ValueRange::new(min, max))
    }
}
