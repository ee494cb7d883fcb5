//! Plot preparation.
//!
//! Runs the full chain for one plotting call: pick the variable, normalize its
//! coordinates, slice it, check its rank and plan the figure. The result is
//! everything an external renderer needs.

use ndarray::{Array2, ArrayD, Axis, Slice};
use serde::Serialize;
use std::fmt;
use tracing::info;

use crate::array::{CoordinateValues, LabeledArray};
use crate::config::{Config, MosaicConfig};
use crate::coords::{normalize, CoordKind};
use crate::dataset::{ensure_plottable, Dataset, VariableSelector};
use crate::error::{EcubevisError, Result};
use crate::layout::{
    interactive_plan, mosaic_plan, ndarray_interactive_plan, ndarray_mosaic_plan, ColorLimit, InteractivePlan,
    MosaicOrientation, MosaicPlan,
};
use crate::logging::log_timed_operation;
use crate::slicing::{slice_array, IndexRange, SliceSpec, TimeBound};

/// How the prepared data will be shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotMode {
    /// Slider-driven view over time (and level)
    #[default]
    Interactive,
    /// Mosaic of map panels
    Static,
}

/// One plotting call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotRequest {
    pub variable: VariableSelector,
    pub slices: SliceSpec,
    pub mode: PlotMode,
    /// Slider dimensions; defaults depend on mode and rank
    pub groupby: Option<Vec<CoordKind>>,
    pub vmin: Option<f32>,
    pub vmax: Option<f32>,
}

/// Renderer-facing description of the figure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PlotPlan {
    Interactive(InteractivePlan),
    Static(MosaicPlan),
}

/// What was selected and how much of it survived slicing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSummary {
    pub name: String,
    pub long_name: Option<String>,
    pub units: Option<String>,
    pub dimensionality: String,
    pub shape: Vec<usize>,
    pub sliced_shape: Vec<usize>,
    pub time_interval: Option<(String, String)>,
    pub sliced_time_interval: Option<(String, String)>,
}

/// Output of [`prepare_plot`]
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPlot {
    /// Normalized and sliced variable
    pub array: LabeledArray,
    pub groupby: Vec<CoordKind>,
    pub plan: PlotPlan,
    pub summary: PlotSummary,
}

/// A bare array to plot without coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum NdarrayInput {
    /// 3D `[time, y, x]` or 4D `[time, level, y, x]` array
    Cube(ArrayD<f32>),
    /// Same-shaped images shown side by side in one row
    Stack(Vec<Array2<f32>>),
}

/// One plotting call for a bare array
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NdarrayRequest {
    pub mode: PlotMode,
    pub vmin: Option<ColorLimit>,
    pub vmax: Option<ColorLimit>,
    /// Panel titles for a stack, one per image
    pub overlay_labels: Option<Vec<String>>,
    /// (lon_first, lon_last, lat_first, lat_last) of every image, if known
    pub extent: Option<(f64, f64, f64, f64)>,
}

/// Output of [`prepare_ndarray`]
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedArray {
    /// The array to render, stacked and capped as planned
    pub data: ArrayD<f32>,
    pub plan: PlotPlan,
}

/// Plan a bare array. A stack is joined along a new first axis; in static
/// mode it becomes a single row of panels, while a cube is capped at the
/// configured rows (3D) or columns (4D).
pub fn prepare_ndarray(input: NdarrayInput, request: &NdarrayRequest, config: &MosaicConfig) -> Result<PreparedArray> {
    log_timed_operation("prepare_ndarray", || -> Result<PreparedArray> {
        let (data, orientation) = match input {
            NdarrayInput::Stack(images) => (stack_images(&images)?, MosaicOrientation::Row),
            NdarrayInput::Cube(data) => (data, MosaicOrientation::Col),
        };

        let plan = match request.mode {
            PlotMode::Interactive => {
                PlotPlan::Interactive(ndarray_interactive_plan(&data, config, request.vmin, request.vmax)?)
            }
            PlotMode::Static => {
                let data = match orientation {
                    MosaicOrientation::Col => cap_cube(data, config),
                    MosaicOrientation::Row => data,
                };
                let plan = ndarray_mosaic_plan(
                    &data,
                    orientation,
                    config,
                    request.vmin,
                    request.vmax,
                    request.overlay_labels.as_deref(),
                    request.extent,
                )?;
                return Ok(PreparedArray {
                    data,
                    plan: PlotPlan::Static(plan),
                });
            }
        };

        Ok(PreparedArray { data, plan })
    })
}

fn stack_images(images: &[Array2<f32>]) -> Result<ArrayD<f32>> {
    let first = images.first().ok_or_else(|| EcubevisError::InvalidParameter {
        param: "data".to_string(),
        message: "Cannot plot an empty stack of images".to_string(),
    })?;
    if let Some(other) = images.iter().find(|im| im.shape() != first.shape()) {
        return Err(EcubevisError::InvalidParameter {
            param: "data".to_string(),
            message: format!(
                "Stacked images must share one shape, got {:?} and {:?}",
                first.shape(),
                other.shape()
            ),
        });
    }
    let views: Vec<_> = images.iter().map(|im| im.view()).collect();
    Ok(ndarray::stack(Axis(0), &views)?.into_dyn())
}

/// Keep the first `max_static_subplot_rows` time steps of a 3D cube and the
/// first `max_static_subplot_cols` levels of a 4D one
fn cap_cube(data: ArrayD<f32>, mosaic: &MosaicConfig) -> ArrayD<f32> {
    let (axis, max) = match data.ndim() {
        3 => (Axis(0), mosaic.max_static_subplot_rows),
        4 => (Axis(1), mosaic.max_static_subplot_cols),
        _ => return data,
    };
    if data.len_of(axis) <= max {
        return data;
    }
    info!(axis = axis.index(), max = max, "Showing the first entries according to the static subplot limits");
    data.slice_axis(axis, Slice::from(0..max)).to_owned()
}

/// Prepare one variable of `dataset` for plotting
pub fn prepare_plot(dataset: &Dataset, request: &PlotRequest, config: &Config) -> Result<PreparedPlot> {
    log_timed_operation("prepare_plot", || -> Result<PreparedPlot> {
        let selected = dataset.select_variable(&request.variable)?;
        let original_shape = selected.shape().to_vec();
        let array = normalize(selected.clone(), &config.coordinates)?;
        let original_interval = time_interval(&array);

        let slices = match request.mode {
            PlotMode::Static => static_defaults(&array, &request.slices, &config.mosaic),
            PlotMode::Interactive => request.slices.clone(),
        };
        let sliced = slice_array(&array, &slices, config.slicing.wrap)?;
        ensure_plottable(&sliced)?;

        let groupby = request
            .groupby
            .clone()
            .unwrap_or_else(|| default_groupby(&sliced, request.mode));

        let plan = match request.mode {
            PlotMode::Interactive => PlotPlan::Interactive(interactive_plan(
                &sliced,
                &config.mosaic,
                request.vmin,
                request.vmax,
            )?),
            PlotMode::Static => {
                PlotPlan::Static(mosaic_plan(&sliced, &config.mosaic, request.vmin, request.vmax)?)
            }
        };

        let summary = PlotSummary {
            name: sliced.name.clone(),
            long_name: sliced.text_attribute("long_name").map(str::to_string),
            units: sliced.text_attribute("units").map(str::to_string),
            dimensionality: format!("{}D", sliced.ndim()),
            shape: original_shape,
            sliced_shape: sliced.shape().to_vec(),
            time_interval: original_interval,
            sliced_time_interval: time_interval(&sliced),
        };

        Ok(PreparedPlot {
            array: sliced,
            groupby,
            plan,
            summary,
        })
    })
}

/// Cap the static mosaic at the configured rows (time) and columns (level)
/// unless the caller bounded those axes already.
fn static_defaults(array: &LabeledArray, slices: &SliceSpec, mosaic: &MosaicConfig) -> SliceSpec {
    let mut slices = slices.clone();

    if slices.time.is_none() {
        if let Some(time) = array.coord(CoordKind::Time.as_str()) {
            if time.len() > mosaic.max_static_subplot_rows {
                info!(
                    max_rows = mosaic.max_static_subplot_rows,
                    "Showing the first time steps according to max_static_subplot_rows"
                );
                slices.time = Some(TimeBound::ByIndex(0, mosaic.max_static_subplot_rows as i64));
            }
        }
    }

    if slices.level.is_none() {
        if let Some(level) = array.coord(CoordKind::Level.as_str()) {
            if level.len() > mosaic.max_static_subplot_cols {
                info!(
                    max_cols = mosaic.max_static_subplot_cols,
                    "Showing the first levels according to max_static_subplot_cols"
                );
                slices.level = Some(IndexRange::new(0, mosaic.max_static_subplot_cols as i64));
            }
        }
    }

    slices
}

fn default_groupby(array: &LabeledArray, mode: PlotMode) -> Vec<CoordKind> {
    match mode {
        PlotMode::Interactive if array.ndim() == 4 => vec![CoordKind::Time, CoordKind::Level],
        _ => vec![CoordKind::Time],
    }
}

fn time_interval(array: &LabeledArray) -> Option<(String, String)> {
    let values: &CoordinateValues = &array.coord(CoordKind::Time.as_str())?.values;
    let last = values.len().checked_sub(1)?;
    Some((values.label(0)?, values.label(last)?))
}

impl fmt::Display for PlotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.long_name {
            Some(long_name) => writeln!(f, "Name: {}, {}", self.name, long_name)?,
            None => writeln!(f, "Name: {}", self.name)?,
        }
        if let Some(units) = &self.units {
            writeln!(f, "Units: {}", units)?;
        }
        writeln!(f, "Dimensionality: {}", self.dimensionality)?;
        writeln!(f, "Shape: {:?}", self.shape)?;
        writeln!(f, "Shape (sliced array): {:?}", self.sliced_shape)?;
        if let Some((first, last)) = &self.time_interval {
            writeln!(f, "Time interval: {} --> {}", first, last)?;
        }
        if let Some((first, last)) = &self.sliced_time_interval {
            writeln!(f, "Time interval (sliced array): {} --> {}", first, last)?;
        }
        Ok(())
    }
}
