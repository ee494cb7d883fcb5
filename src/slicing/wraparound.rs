//! Longitude selection across the 0/360 seam.
//!
//! On a 0..360 axis an interval like 350..20 is not a contiguous index range.
//! The selection mask is treated as cyclic: its single run of selected
//! positions is read starting where the run begins, which rotates the axis so
//! the first selected longitude lands at output position 0.

use crate::error::{EcubevisError, Result};

/// Default period of a longitude axis in degrees
pub const DEFAULT_WRAP: f64 = 360.0;

/// Positions and output coordinates of a wraparound selection
#[derive(Debug, Clone, PartialEq)]
pub struct WrapSelection {
    /// Selected axis positions in output order
    pub indices: Vec<usize>,
    /// Longitude values for the output axis, one per index
    pub coordinates: Vec<f64>,
    /// Whether the selected run continues past the end of the axis
    pub crosses_seam: bool,
}

/// Map `value` into `[0, wrap)`.
pub fn wrap_value(value: f64, wrap: f64) -> f64 {
    let r = value.rem_euclid(wrap);
    // rem_euclid can round tiny negative inputs up to exactly `wrap`
    if r >= wrap {
        0.0
    } else {
        r
    }
}

/// Select the longitudes between `start` and `stop`, going eastward from
/// `start` and wrapping past `wrap` when `start > stop`.
///
/// Output coordinates follow the direction of the axis: an ascending axis
/// yields non-decreasing values, a descending one non-increasing values.
///
/// Fails on non-finite bounds, when nothing is selected, or when the mask
/// breaks into more than one cyclic run (only possible for unsorted axes).
///
/// A selection covering the whole axis is returned in original order with
/// original values and is not remapped, so a `0..360` axis stays `0..360`.
pub fn wraparound_select(values: &[f64], start: f64, stop: f64, wrap: f64) -> Result<WrapSelection> {
    if !(wrap > 0.0 && wrap.is_finite()) {
        return Err(EcubevisError::InvalidParameter {
            param: "wrap".to_string(),
            message: format!("Wrap period must be a positive number, got {}", wrap),
        });
    }

    if !(start.is_finite() && stop.is_finite()) {
        return Err(EcubevisError::InvalidParameter {
            param: "slice_lon".to_string(),
            message: format!("Longitude bounds must be finite, got {} and {}", start, stop),
        });
    }

    let n = values.len();
    if n == 0 {
        return Err(EcubevisError::DegenerateSelection {
            message: "longitude axis is empty".to_string(),
        });
    }

    let start = wrap_value(start, wrap);
    let stop = wrap_value(stop, wrap);
    let normalized: Vec<f64> = values.iter().map(|&v| wrap_value(v, wrap)).collect();

    let mask: Vec<bool> = if start <= stop {
        normalized.iter().map(|&v| start <= v && v <= stop).collect()
    } else {
        normalized.iter().map(|&v| v >= start || v <= stop).collect()
    };

    let selected = mask.iter().filter(|&&m| m).count();
    if selected == 0 {
        return Err(EcubevisError::DegenerateSelection {
            message: format!("no longitude lies between {} and {}", start, stop),
        });
    }
    if selected == n {
        return Ok(WrapSelection {
            indices: (0..n).collect(),
            coordinates: values.to_vec(),
            crosses_seam: false,
        });
    }

    // Positions where a run of selected values begins, comparing cyclically
    let run_starts: Vec<usize> = (0..n)
        .filter(|&i| mask[i] && !mask[(i + n - 1) % n])
        .collect();
    let offset = match run_starts.as_slice() {
        [offset] => *offset,
        runs => {
            return Err(EcubevisError::DegenerateSelection {
                message: format!(
                    "selection between {} and {} splits into {} separate runs; is the longitude axis sorted?",
                    start,
                    stop,
                    runs.len()
                ),
            })
        }
    };

    let indices: Vec<usize> = (0..selected).map(|k| (offset + k) % n).collect();
    let crosses_seam = offset + selected > n;
    let ascending = values[n - 1] >= values[0];
    let coordinates = output_coordinates(&indices, &normalized, offset, crosses_seam, ascending, wrap);

    tracing::debug!(
        start = start,
        stop = stop,
        offset = offset,
        selected = selected,
        crosses_seam = crosses_seam,
        "Wraparound longitude selection"
    );

    Ok(WrapSelection {
        indices,
        coordinates,
        crosses_seam,
    })
}

/// Remap the selected longitudes to the -wrap/2..wrap/2 convention when that
/// keeps them monotonic in the axis direction, otherwise unwrap them across
/// the seam.
fn output_coordinates(
    indices: &[usize],
    normalized: &[f64],
    offset: usize,
    crosses_seam: bool,
    ascending: bool,
    wrap: f64,
) -> Vec<f64> {
    let half = wrap / 2.0;
    let centered: Vec<f64> = indices
        .iter()
        .map(|&i| {
            let v = normalized[i];
            if v >= half {
                v - wrap
            } else {
                v
            }
        })
        .collect();

    if is_monotonic(&centered, ascending) {
        return centered;
    }

    // Shift west the positions read before the wrap on an ascending axis,
    // those read after it on a descending one
    indices
        .iter()
        .map(|&i| {
            let v = normalized[i];
            if crosses_seam && (i >= offset) == ascending {
                v - wrap
            } else {
                v
            }
        })
        .collect()
}

fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

fn is_monotonic(values: &[f64], ascending: bool) -> bool {
    if ascending {
        is_non_decreasing(values)
    } else {
        values.windows(2).all(|w| w[0] >= w[1])
    }
}
