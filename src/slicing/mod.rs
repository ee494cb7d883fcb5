//! Dimensional slicing along time, level, lat and lon.
//!
//! Each bound in a [`SliceSpec`] narrows one canonical axis. Bounds for axes the
//! array does not have are ignored. Arrays must be normalized first so the axes
//! carry their canonical names.

pub mod bounds;
pub mod labels;
pub mod wraparound;

pub use bounds::{IndexRange, TimeBound, ValueRange};
pub use wraparound::{wrap_value, wraparound_select, WrapSelection, DEFAULT_WRAP};

use tracing::debug;

use crate::array::{Coordinate, CoordinateValues, LabeledArray};
use crate::coords::CoordKind;
use crate::error::{EcubevisError, Result};

/// Optional bounds for each canonical axis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceSpec {
    pub time: Option<TimeBound>,
    pub level: Option<IndexRange>,
    pub lat: Option<ValueRange>,
    pub lon: Option<ValueRange>,
}

impl SliceSpec {
    /// True when no axis is bounded
    pub fn is_empty(&self) -> bool {
        self.time.is_none() && self.level.is_none() && self.lat.is_none() && self.lon.is_none()
    }
}

/// Apply every bound of `spec` to `array`.
///
/// `wrap` is the longitude period used when the lon axis follows the
/// 0..wrap convention.
pub fn slice_array(array: &LabeledArray, spec: &SliceSpec, wrap: f64) -> Result<LabeledArray> {
    let mut sliced = array.clone();

    if let Some(bound) = &spec.time {
        if let Some(coord) = present(&sliced, CoordKind::Time) {
            let indices = time_indices(coord, bound)?;
            sliced = narrow(&sliced, CoordKind::Time, &indices)?;
        }
    }

    if let Some(range) = &spec.level {
        if let Some(coord) = present(&sliced, CoordKind::Level) {
            let indices: Vec<usize> = range.resolve(coord.len()).collect();
            sliced = narrow(&sliced, CoordKind::Level, &indices)?;
        }
    }

    if let Some(range) = &spec.lat {
        if let Some(coord) = present(&sliced, CoordKind::Lat) {
            let indices = open_interval_indices(numeric(coord)?, range);
            sliced = narrow(&sliced, CoordKind::Lat, &indices)?;
        }
    }

    if let Some(range) = &spec.lon {
        if let Some(coord) = present(&sliced, CoordKind::Lon) {
            let values = numeric(coord)?;
            if values.first().is_some_and(|&first| first < 0.0) {
                let indices = open_interval_indices(values, range);
                sliced = narrow(&sliced, CoordKind::Lon, &indices)?;
            } else {
                let selection = wraparound_select(values, range.min, range.max, wrap)?;
                let mut rotated = narrow(&sliced, CoordKind::Lon, &selection.indices)?;
                rotated.replace_coordinate(
                    CoordKind::Lon.as_str(),
                    CoordinateValues::Numeric(selection.coordinates),
                )?;
                sliced = rotated;
            }
        }
    }

    Ok(sliced)
}

fn present(array: &LabeledArray, kind: CoordKind) -> Option<&Coordinate> {
    let coord = array.coord(kind.as_str());
    if coord.is_none() {
        debug!(dimension = %kind, "Ignoring bound for absent dimension");
    }
    coord
}

fn numeric(coord: &Coordinate) -> Result<&[f64]> {
    coord
        .values
        .as_numeric()
        .ok_or_else(|| EcubevisError::InvalidCoordinates {
            message: format!("Coordinate {} must be numeric to select by value", coord.name),
        })
}

/// Keep the selected positions, failing if nothing remains
fn narrow(array: &LabeledArray, kind: CoordKind, indices: &[usize]) -> Result<LabeledArray> {
    if indices.is_empty() {
        return Err(EcubevisError::EmptySelection {
            dimension: kind.to_string(),
            message: "no points fall inside the requested bounds".to_string(),
        });
    }
    debug!(dimension = %kind, retained = indices.len(), "Narrowed dimension");
    array.select_along(kind.as_str(), indices)
}

fn open_interval_indices(values: &[f64], range: &ValueRange) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| range.contains_open(v))
        .map(|(i, _)| i)
        .collect()
}

fn time_indices(coord: &Coordinate, bound: &TimeBound) -> Result<Vec<usize>> {
    match bound {
        TimeBound::ByIndex(start, stop) => Ok(IndexRange::new(*start, *stop).resolve(coord.len()).collect()),
        TimeBound::ByLabel(first, last) => match &coord.values {
            CoordinateValues::Time(times) => {
                let (from, _) = labels::label_period(first)?;
                let (_, until) = labels::label_period(last)?;
                Ok(times
                    .iter()
                    .enumerate()
                    .filter(|(_, &t)| from <= t && t < until)
                    .map(|(i, _)| i)
                    .collect())
            }
            CoordinateValues::Numeric(values) => {
                let parse = |label: &str| {
                    label.trim().parse::<f64>().map_err(|_| EcubevisError::InvalidParameter {
                        param: "slice_time".to_string(),
                        message: format!("Time axis is numeric, cannot select by label '{}'", label),
                    })
                };
                let (lo, hi) = (parse(first)?, parse(last)?);
                Ok(values
                    .iter()
                    .enumerate()
                    .filter(|(_, &v)| lo <= v && v <= hi)
                    .map(|(i, _)| i)
                    .collect())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use ndarray::{ArrayD, IxDyn};
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::days(d as i64 * 15)
    }

    /// time(6) x level(4) x lat(5) x lon(36), data value = flat index
    fn cube() -> LabeledArray {
        let shape = [6usize, 4, 5, 36];
        let size: usize = shape.iter().product();
        let data = ArrayD::from_shape_vec(IxDyn(&shape), (0..size).map(|v| v as f32).collect()).unwrap();
        LabeledArray::new(
            "t",
            data,
            vec![
                Coordinate::time("time", (0..6).map(day).collect()),
                Coordinate::numeric("level", vec![1000.0, 850.0, 500.0, 250.0]),
                Coordinate::numeric("lat", vec![-60.0, -30.0, 0.0, 30.0, 60.0]),
                Coordinate::numeric("lon", (0..36).map(|i| i as f64 * 10.0).collect()),
            ],
        )
        .unwrap()
    }

    fn numeric_values(array: &LabeledArray, dim: &str) -> Vec<f64> {
        array.coord(dim).unwrap().values.as_numeric().unwrap().to_vec()
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let array = cube();
        let sliced = slice_array(&array, &SliceSpec::default(), DEFAULT_WRAP).unwrap();
        assert_eq!(sliced, array);
    }

    #[test]
    fn test_time_by_index_is_half_open() {
        let spec = SliceSpec {
            time: Some(TimeBound::ByIndex(1, 3)),
            ..Default::default()
        };
        let sliced = slice_array(&cube(), &spec, DEFAULT_WRAP).unwrap();
        assert_eq!(sliced.shape(), &[2, 4, 5, 36]);
        assert_eq!(
            sliced.coord("time").unwrap().values,
            CoordinateValues::Time(vec![day(1), day(2)])
        );
    }

    #[test]
    fn test_time_by_label_is_inclusive() {
        // Days 0..6 fall on Jan 1, Jan 16, Jan 31, Feb 15, Mar 1, Mar 16
        let spec = SliceSpec {
            time: Some(TimeBound::ByLabel("2000-01-16".to_string(), "2000-02".to_string())),
            ..Default::default()
        };
        let sliced = slice_array(&cube(), &spec, DEFAULT_WRAP).unwrap();
        assert_eq!(
            sliced.coord("time").unwrap().values,
            CoordinateValues::Time(vec![day(1), day(2), day(3)])
        );
    }

    #[test]
    fn test_whole_years_by_month_labels() {
        let date = |y: i32, m: u32, d: u32| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let mut array = cube();
        array
            .replace_coordinate(
                "time",
                CoordinateValues::Time(vec![
                    date(1999, 12, 31),
                    date(2000, 1, 1),
                    date(2000, 7, 1),
                    date(2001, 3, 1),
                    date(2001, 12, 31),
                    date(2002, 1, 1),
                ]),
            )
            .unwrap();
        let spec = SliceSpec {
            time: Some("2000-01,2001-12".parse().unwrap()),
            ..Default::default()
        };
        let sliced = slice_array(&array, &spec, DEFAULT_WRAP).unwrap();
        assert_eq!(
            sliced.coord("time").unwrap().values,
            CoordinateValues::Time(vec![date(2000, 1, 1), date(2000, 7, 1), date(2001, 3, 1), date(2001, 12, 31)])
        );
    }

    #[test]
    fn test_time_label_on_numeric_axis() {
        let mut array = cube();
        array
            .replace_coordinate("time", CoordinateValues::Numeric(vec![0.0, 6.0, 12.0, 18.0, 24.0, 30.0]))
            .unwrap();
        let spec = SliceSpec {
            time: Some(TimeBound::ByLabel("6".to_string(), "18".to_string())),
            ..Default::default()
        };
        let sliced = slice_array(&array, &spec, DEFAULT_WRAP).unwrap();
        assert_eq!(numeric_values(&sliced, "time"), vec![6.0, 12.0, 18.0]);

        let bad = SliceSpec {
            time: Some(TimeBound::ByLabel("2000-01".to_string(), "18".to_string())),
            ..Default::default()
        };
        assert!(slice_array(&array, &bad, DEFAULT_WRAP).is_err());
    }

    #[test]
    fn test_level_by_index() {
        let spec = SliceSpec {
            level: Some(IndexRange::new(-2, 10)),
            ..Default::default()
        };
        let sliced = slice_array(&cube(), &spec, DEFAULT_WRAP).unwrap();
        assert_eq!(numeric_values(&sliced, "level"), vec![500.0, 250.0]);
    }

    #[test]
    fn test_lat_is_open_interval() {
        let spec = SliceSpec {
            lat: Some(ValueRange::new(-30.0, 60.0)),
            ..Default::default()
        };
        let sliced = slice_array(&cube(), &spec, DEFAULT_WRAP).unwrap();
        let lat = numeric_values(&sliced, "lat");
        assert_eq!(lat, vec![0.0, 30.0]);
        assert!(lat.iter().all(|&p| -30.0 < p && p < 60.0));
    }

    #[test]
    fn test_lon_on_centered_axis_is_open_interval() {
        let mut array = cube();
        array
            .replace_coordinate(
                "lon",
                CoordinateValues::Numeric((0..36).map(|i| i as f64 * 10.0 - 180.0).collect()),
            )
            .unwrap();
        let spec = SliceSpec {
            lon: Some(ValueRange::new(-20.0, 20.0)),
            ..Default::default()
        };
        let sliced = slice_array(&array, &spec, DEFAULT_WRAP).unwrap();
        assert_eq!(numeric_values(&sliced, "lon"), vec![-10.0, 0.0, 10.0]);
    }

    #[test]
    fn test_lon_wraparound_moves_data_with_coordinates() {
        let array = cube();
        let spec = SliceSpec {
            lon: Some(ValueRange::new(350.0, 20.0)),
            ..Default::default()
        };
        let sliced = slice_array(&array, &spec, DEFAULT_WRAP).unwrap();

        assert_eq!(numeric_values(&sliced, "lon"), vec![-10.0, 0.0, 10.0, 20.0]);
        assert_eq!(sliced.shape(), &[6, 4, 5, 4]);
        for (out, src) in [35usize, 0, 1, 2].into_iter().enumerate() {
            assert_eq!(sliced.data[[2, 1, 3, out]], array.data[[2, 1, 3, src]]);
        }
    }

    #[test]
    fn test_all_bounds_together() {
        let spec = SliceSpec {
            time: Some(TimeBound::ByIndex(0, 2)),
            level: Some(IndexRange::new(1, 2)),
            lat: Some(ValueRange::new(-45.0, 45.0)),
            lon: Some(ValueRange::new(10.0, 40.0)),
        };
        let sliced = slice_array(&cube(), &spec, DEFAULT_WRAP).unwrap();
        assert_eq!(sliced.shape(), &[2, 1, 3, 4]);
        assert_eq!(numeric_values(&sliced, "lon"), vec![10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_bound_for_absent_axis_is_ignored() {
        let array = cube().select_along("level", &[0]).unwrap();
        let three_d = LabeledArray::new(
            "t",
            array.data.index_axis(ndarray::Axis(1), 0).to_owned(),
            vec![array.coords[0].clone(), array.coords[2].clone(), array.coords[3].clone()],
        )
        .unwrap();

        let spec = SliceSpec {
            level: Some(IndexRange::new(0, 1)),
            ..Default::default()
        };
        let sliced = slice_array(&three_d, &spec, DEFAULT_WRAP).unwrap();
        assert_eq!(sliced, three_d);
    }

    #[test]
    fn test_empty_selection_fails() {
        let spec = SliceSpec {
            lat: Some(ValueRange::new(61.0, 89.0)),
            ..Default::default()
        };
        let err = slice_array(&cube(), &spec, DEFAULT_WRAP).unwrap_err();
        assert!(matches!(err, EcubevisError::EmptySelection { dimension, .. } if dimension == "lat"));

        let spec = SliceSpec {
            time: Some(TimeBound::ByIndex(4, 2)),
            ..Default::default()
        };
        assert!(slice_array(&cube(), &spec, DEFAULT_WRAP).is_err());
    }
}
