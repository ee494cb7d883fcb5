//! Labeled array data model.
//!
//! A [`LabeledArray`] is an N-dimensional `f32` array whose axes carry names and
//! coordinate values, the in-memory shape every other module works on.

use chrono::NaiveDateTime;
use ndarray::{ArrayD, Axis};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{EcubevisError, Result};

/// Possible attribute values attached to a variable or dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String attribute
    Text(String),
    /// Numeric attribute (stored as f64 for simplicity)
    Number(f64),
    /// Array of numbers
    NumberArray(Vec<f64>),
}

impl AttributeValue {
    /// The attribute as text, if it is a string attribute
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Values along one coordinate axis
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateValues {
    /// Plain numeric labels (degrees, pressure levels, raw offsets)
    Numeric(Vec<f64>),
    /// Decoded datetimes
    Time(Vec<NaiveDateTime>),
}

impl CoordinateValues {
    pub fn len(&self) -> usize {
        match self {
            CoordinateValues::Numeric(values) => values.len(),
            CoordinateValues::Time(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep the values at `indices`, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        match self {
            CoordinateValues::Numeric(values) => {
                CoordinateValues::Numeric(indices.iter().map(|&i| values[i]).collect())
            }
            CoordinateValues::Time(values) => {
                CoordinateValues::Time(indices.iter().map(|&i| values[i]).collect())
            }
        }
    }

    /// Display label for one position; datetimes are shown to the minute
    pub fn label(&self, index: usize) -> Option<String> {
        match self {
            CoordinateValues::Numeric(values) => values.get(index).map(|v| v.to_string()),
            CoordinateValues::Time(values) => values
                .get(index)
                .map(|t| t.format("%Y-%m-%dT%H:%M").to_string()),
        }
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            CoordinateValues::Numeric(values) => Some(values),
            CoordinateValues::Time(_) => None,
        }
    }

    pub fn as_time(&self) -> Option<&[NaiveDateTime]> {
        match self {
            CoordinateValues::Time(values) => Some(values),
            CoordinateValues::Numeric(_) => None,
        }
    }
}

/// A named coordinate axis
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub name: String,
    pub values: CoordinateValues,
}

impl Coordinate {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: CoordinateValues::Numeric(values),
        }
    }

    pub fn time(name: impl Into<String>, values: Vec<NaiveDateTime>) -> Self {
        Self {
            name: name.into(),
            values: CoordinateValues::Time(values),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An N-dimensional array with one named coordinate per axis
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    /// Variable name
    pub name: String,
    /// Data values, one axis per coordinate
    pub data: ArrayD<f32>,
    /// Coordinates in axis order
    pub coords: Vec<Coordinate>,
    /// Variable attributes (units, long_name, ...)
    pub attributes: HashMap<String, AttributeValue>,
}

impl LabeledArray {
    /// Build a labeled array, checking that coordinates line up with the data axes
    pub fn new(name: impl Into<String>, data: ArrayD<f32>, coords: Vec<Coordinate>) -> Result<Self> {
        let array = Self {
            name: name.into(),
            data,
            coords,
            attributes: HashMap::new(),
        };
        array.validate()?;
        Ok(array)
    }

    pub fn with_attribute(mut self, key: &str, value: AttributeValue) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Dimension names in axis order
    pub fn dims(&self) -> Vec<&str> {
        self.coords.iter().map(|c| c.name.as_str()).collect()
    }

    /// Axis position of a dimension
    pub fn axis_of(&self, name: &str) -> Option<usize> {
        self.coords.iter().position(|c| c.name == name)
    }

    pub fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.coords.iter().find(|c| c.name == name)
    }

    /// Get coordinate values for a dimension with error handling
    pub fn coord_checked(&self, name: &str) -> Result<&Coordinate> {
        self.coord(name).ok_or_else(|| EcubevisError::DataNotFound {
            message: format!("Coordinate not found: {}", name),
        })
    }

    pub fn text_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(AttributeValue::as_text)
    }

    /// Keep only `indices` along the named axis. The coordinate follows the same
    /// order, so non-contiguous or rotated index lists are allowed.
    pub fn select_along(&self, dim: &str, indices: &[usize]) -> Result<Self> {
        let axis = self.axis_of(dim).ok_or_else(|| EcubevisError::DataNotFound {
            message: format!("Dimension not found: {}", dim),
        })?;
        let len = self.data.len_of(Axis(axis));
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(EcubevisError::InvalidParameter {
                param: dim.to_string(),
                message: format!("index {} out of bounds for axis of length {}", bad, len),
            });
        }

        let mut coords = self.coords.clone();
        coords[axis].values = self.coords[axis].values.select(indices);

        Ok(Self {
            name: self.name.clone(),
            data: self.data.select(Axis(axis), indices),
            coords,
            attributes: self.attributes.clone(),
        })
    }

    /// Replace the values of an existing coordinate, keeping its length
    pub fn replace_coordinate(&mut self, dim: &str, values: CoordinateValues) -> Result<()> {
        let axis = self.axis_of(dim).ok_or_else(|| EcubevisError::DataNotFound {
            message: format!("Dimension not found: {}", dim),
        })?;
        if values.len() != self.coords[axis].len() {
            return Err(EcubevisError::InvalidCoordinates {
                message: format!(
                    "Replacement for {} has {} values, axis has {}",
                    dim,
                    values.len(),
                    self.coords[axis].len()
                ),
            });
        }
        self.coords[axis].values = values;
        Ok(())
    }

    /// Minimum and maximum of the data, ignoring NaN. `None` if no finite value exists.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        nan_range(self.data.iter())
    }

    /// Validate that the array is consistent and ready for use
    pub fn validate(&self) -> Result<()> {
        if self.coords.len() != self.data.ndim() {
            return Err(EcubevisError::InvalidCoordinates {
                message: format!(
                    "Variable {} has {} coordinates for {} dimensions",
                    self.name,
                    self.coords.len(),
                    self.data.ndim()
                ),
            });
        }

        for (i, coord) in self.coords.iter().enumerate() {
            if coord.len() != self.data.shape()[i] {
                return Err(EcubevisError::InvalidCoordinates {
                    message: format!(
                        "Variable {} coordinate {} has {} values but axis {} has size {}",
                        self.name,
                        coord.name,
                        coord.len(),
                        i,
                        self.data.shape()[i]
                    ),
                });
            }
            if self.coords[..i].iter().any(|c| c.name == coord.name) {
                return Err(EcubevisError::InvalidCoordinates {
                    message: format!("Variable {} repeats dimension {}", self.name, coord.name),
                });
            }
        }

        Ok(())
    }
}

/// Smallest and largest non-NaN value, `None` when there is none
pub fn nan_range<'a>(values: impl IntoIterator<Item = &'a f32>) -> Option<(f32, f32)> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
