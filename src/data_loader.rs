//! NetCDF dataset loading.
//!
//! This module reads a NetCDF file into an in-memory [`Dataset`]. Coordinate
//! variables become labeled axes (time axes with CF units are decoded to
//! datetimes) and every other numeric variable becomes a [`LabeledArray`].

use ndarray::{ArrayD, IxDyn};
use netcdf::{Attribute, Variable as NetCDFVariable};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::array::{AttributeValue, Coordinate, LabeledArray};
use crate::cf_time::{decode_times, TimeUnits};
use crate::dataset::Dataset;
use crate::error::{EcubevisError, Result};
use crate::logging::log_data_load_stats;

/// Append the `.nc` extension to paths that have none
pub fn resolve_dataset_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("nc")
    }
}

/// Load a NetCDF file into memory
pub fn open_dataset(path: &Path) -> Result<Dataset> {
    let path = resolve_dataset_path(path);

    // Check if the file exists
    if !path.exists() {
        return Err(EcubevisError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let file = netcdf::open(&path)?;
    info!("Opened NetCDF file: {}", path.display());
    debug!("File has {} variables", file.variables().count());
    debug!("File has {} dimensions", file.dimensions().count());

    let mut global_attributes = HashMap::new();
    for attr in file.attributes() {
        global_attributes.insert(attr.name().to_string(), convert_attribute(&attr)?);
    }

    let coordinates = extract_coordinates(&file)?;
    let variables = extract_variables(&file, &coordinates)?;

    if variables.is_empty() {
        return Err(EcubevisError::DataNotFound {
            message: format!("No data variables found in {}", path.display()),
        });
    }

    let names: Vec<&str> = variables.iter().map(|v| v.name.as_str()).collect();
    let dims = coordinates
        .values()
        .map(|c| format!("{}={}", c.name, c.len()))
        .collect::<Vec<_>>()
        .join(", ");
    let memory: usize = variables.iter().map(|v| v.data.len() * std::mem::size_of::<f32>()).sum();
    log_data_load_stats(&path.display().to_string(), &names, &dims, memory);

    Ok(Dataset {
        global_attributes,
        variables,
    })
}

/// Read one coordinate per dimension. Dimensions without a coordinate variable
/// get 0-based indices.
fn extract_coordinates(file: &netcdf::File) -> Result<HashMap<String, Coordinate>> {
    let mut coordinates = HashMap::new();

    for dim in file.dimensions() {
        let name = dim.name().to_string();
        let coordinate = match file.variable(&name) {
            Some(var) => read_coordinate(&var, &name)?,
            None => {
                warn!("Created default coordinates for dimension: {}", name);
                Coordinate::numeric(name.clone(), (0..dim.len()).map(|i| i as f64).collect())
            }
        };
        coordinates.insert(name, coordinate);
    }

    Ok(coordinates)
}

fn read_coordinate(var: &NetCDFVariable, name: &str) -> Result<Coordinate> {
    let values: Vec<f64> = var.get_values::<f64, _>(..)?;

    let units = text_attribute(var, "units");
    if let Some(units) = units.as_deref().filter(|u| TimeUnits::is_time_units(u)) {
        let calendar = text_attribute(var, "calendar");
        match decode_times(&values, units, calendar.as_deref()) {
            Ok(times) => return Ok(Coordinate::time(name, times)),
            Err(e) => warn!(coordinate = name, error = %e, "Keeping raw time offsets"),
        }
    }

    Ok(Coordinate::numeric(name, values))
}

fn text_attribute(var: &NetCDFVariable, key: &str) -> Option<String> {
    match var.attribute(key)?.value() {
        Ok(netcdf::AttributeValue::Str(s)) => Some(s),
        _ => None,
    }
}

/// Read every non-coordinate variable whose values convert to numbers
fn extract_variables(
    file: &netcdf::File,
    coordinates: &HashMap<String, Coordinate>,
) -> Result<Vec<LabeledArray>> {
    let mut variables = Vec::new();

    for var in file.variables() {
        let name = var.name().to_string();
        if coordinates.contains_key(&name) {
            continue;
        }

        let dims: Vec<String> = var.dimensions().iter().map(|d| d.name().to_string()).collect();
        if dims.is_empty() {
            debug!("Skipping scalar variable: {}", name);
            continue;
        }

        let mut attributes = HashMap::new();
        for attr in var.attributes() {
            attributes.insert(attr.name().to_string(), convert_attribute(&attr)?);
        }

        let raw: Vec<f32> = match var.get_values::<f32, _>(..) {
            Ok(values) => values,
            Err(e) => {
                warn!("Skipping unsupported variable {}: {}", name, e);
                continue;
            }
        };

        let packing = Packing::from_attributes(&attributes);
        if !packing.is_identity() {
            debug!(
                variable = %name,
                scale_factor = packing.scale_factor,
                add_offset = packing.add_offset,
                fill_values = ?packing.fill_values,
                "Unpacking variable"
            );
        }
        let values = packing.apply(raw);
        for key in PACKING_ATTRIBUTES {
            attributes.remove(key);
        }

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)?;

        let coords = dims
            .iter()
            .map(|dim| {
                coordinates
                    .get(dim)
                    .cloned()
                    .ok_or_else(|| EcubevisError::DataNotFound {
                        message: format!("Variable {} references non-existent dimension {}", name, dim),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut array = LabeledArray::new(name, data, coords)?;
        array.attributes = attributes;
        variables.push(array);
    }

    Ok(variables)
}

/// Attributes consumed by unpacking; they describe the stored form only
const PACKING_ATTRIBUTES: [&str; 4] = ["_FillValue", "missing_value", "scale_factor", "add_offset"];

/// CF packing of a stored variable: masked sentinels plus a linear transform
#[derive(Debug, Clone, PartialEq)]
struct Packing {
    fill_values: Vec<f64>,
    scale_factor: f64,
    add_offset: f64,
}

impl Packing {
    fn from_attributes(attributes: &HashMap<String, AttributeValue>) -> Self {
        let number = |key: &str| match attributes.get(key) {
            Some(AttributeValue::Number(n)) => Some(*n),
            Some(AttributeValue::NumberArray(v)) => v.first().copied(),
            _ => None,
        };

        let mut fill_values = Vec::new();
        for key in ["_FillValue", "missing_value"] {
            match attributes.get(key) {
                Some(AttributeValue::Number(n)) => fill_values.push(*n),
                Some(AttributeValue::NumberArray(v)) => fill_values.extend(v.iter().copied()),
                _ => {}
            }
        }

        Self {
            fill_values,
            scale_factor: number("scale_factor").unwrap_or(1.0),
            add_offset: number("add_offset").unwrap_or(0.0),
        }
    }

    fn is_identity(&self) -> bool {
        self.fill_values.is_empty() && self.scale_factor == 1.0 && self.add_offset == 0.0
    }

    fn is_fill(&self, raw: f32) -> bool {
        self.fill_values
            .iter()
            .any(|&fill| raw == fill as f32 || (raw.is_nan() && fill.is_nan()))
    }

    /// Masked values become NaN, the rest `raw * scale_factor + add_offset`
    fn apply(&self, raw: Vec<f32>) -> Vec<f32> {
        if self.is_identity() {
            return raw;
        }
        raw.into_iter()
            .map(|v| {
                if self.is_fill(v) {
                    f32::NAN
                } else {
                    (v as f64 * self.scale_factor + self.add_offset) as f32
                }
            })
            .collect()
    }
}

/// Convert a NetCDF attribute to our AttributeValue enum
fn convert_attribute(attr: &Attribute) -> Result<AttributeValue> {
    use netcdf::AttributeValue as NcAttributeValue;

    let value = attr.value()?;

    Ok(match value {
        NcAttributeValue::Str(s) => AttributeValue::Text(s),

        // Numeric types - store as f64 for simplicity
        NcAttributeValue::Uchar(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Schar(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Short(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Ushort(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Int(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Uint(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Float(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Double(v) => AttributeValue::Number(v),

        NcAttributeValue::Shorts(v) => AttributeValue::NumberArray(v.into_iter().map(f64::from).collect()),
        NcAttributeValue::Ints(v) => AttributeValue::NumberArray(v.into_iter().map(f64::from).collect()),
        NcAttributeValue::Floats(v) => AttributeValue::NumberArray(v.into_iter().map(f64::from).collect()),
        NcAttributeValue::Doubles(v) => AttributeValue::NumberArray(v),

        // Anything else is kept as its text representation
        other => AttributeValue::Text(format!("{:?}", other)),
    })
}
