//! Plot plan arithmetic.
//!
//! Turns the shape of a sliced variable into what a renderer needs: slider
//! frames and pixel size for the interactive view, or rows, columns, figure
//! size, extent and panel titles for a static mosaic.
//!
//! Bare arrays without coordinates are planned from their shape alone by
//! [`ndarray_interactive_plan`] and [`ndarray_mosaic_plan`].

use ndarray::ArrayD;
use serde::Serialize;

use crate::array::{nan_range, LabeledArray};
use crate::config::MosaicConfig;
use crate::coords::CoordKind;
use crate::error::{EcubevisError, Result};

/// Extra figure width reserved for colorbars
const COLORBAR_ZONE: f64 = 1.4;
/// Minimum figure edge in inches
const MIN_FIGURE_EDGE: f64 = 8.0;
/// Figure inches per mosaic row or column
const INCHES_PER_PANEL: f64 = 2.0;
/// Additional horizontal padding when colorbars sit between panels
const COLORBAR_PADDING: f64 = 0.05;
/// Colorbar bar width and padding in pixels
const COLORBAR_WIDTH_PX: u32 = 15;
const COLORBAR_PAD_PX: u32 = 3;

/// Sizing for a slider-driven view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractivePlan {
    pub width: u32,
    pub height: u32,
    /// Number of slider frames (time steps times levels)
    pub frames: usize,
    /// Color limits, unset ends are left to the renderer
    pub clim: (Option<f32>, Option<f32>),
}

/// One map panel of a static mosaic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub row: usize,
    pub col: usize,
    pub title: String,
}

/// Grid of map panels: rows are time steps, columns are levels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicPlan {
    pub rows: usize,
    pub cols: usize,
    /// Figure size in inches (width, height)
    pub figsize: (f64, f64),
    /// (lon_first, lon_last, lat_first, lat_last), unknown for bare arrays
    /// planned without one
    pub extent: Option<(f64, f64, f64, f64)>,
    pub subplots_horpadding: f64,
    pub subplots_verpadding: f64,
    pub value_range: (Option<f32>, Option<f32>),
    pub panels: Vec<Panel>,
}

/// Color limit for a bare array: a fixed value, or the data minimum (for
/// `vmin`) or maximum (for `vmax`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorLimit {
    Fixed(f32),
    Data,
}

/// How a static mosaic of a bare array is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicOrientation {
    /// Time steps down the rows, levels across the columns
    Col,
    /// One row with a column per stacked image
    Row,
}

/// Color limits shared by all panels. With `share` set, missing ends are filled
/// from the data (NaN ignored).
pub fn shared_range(
    array: &LabeledArray,
    vmin: Option<f32>,
    vmax: Option<f32>,
    share: bool,
) -> (Option<f32>, Option<f32>) {
    if !share || (vmin.is_some() && vmax.is_some()) {
        return (vmin, vmax);
    }
    match array.value_range() {
        Some((lo, hi)) => (vmin.or(Some(lo)), vmax.or(Some(hi))),
        None => (vmin, vmax),
    }
}

fn axis_len(array: &LabeledArray, kind: CoordKind) -> Option<usize> {
    array.coord(kind.as_str()).map(|c| c.len())
}

/// Width over height of one map panel, in grid points
fn aspect_ratio(array: &LabeledArray) -> Result<f64> {
    let nlon = axis_len(array, CoordKind::Lon);
    let nlat = axis_len(array, CoordKind::Lat);
    match (nlon, nlat) {
        (Some(nlon), Some(nlat)) if nlon > 0 && nlat > 0 => Ok(nlon as f64 / nlat as f64),
        _ => Err(EcubevisError::DataNotFound {
            message: format!("Variable {} needs non-empty lat and lon axes to be mapped", array.name),
        }),
    }
}

pub fn interactive_plan(
    array: &LabeledArray,
    config: &MosaicConfig,
    vmin: Option<f32>,
    vmax: Option<f32>,
) -> Result<InteractivePlan> {
    let ratio = aspect_ratio(array)?;
    let width = config.plot_size_px;
    let height = (width as f64 / ratio).round() as u32;
    let frames = axis_len(array, CoordKind::Time).unwrap_or(1) * axis_len(array, CoordKind::Level).unwrap_or(1);

    Ok(InteractivePlan {
        width,
        height,
        frames,
        clim: (vmin, vmax),
    })
}

pub fn mosaic_plan(
    array: &LabeledArray,
    config: &MosaicConfig,
    vmin: Option<f32>,
    vmax: Option<f32>,
) -> Result<MosaicPlan> {
    let ratio = aspect_ratio(array)?;
    let time = array.coord(CoordKind::Time.as_str());
    let level = array.coord(CoordKind::Level.as_str());
    let rows = time.map_or(1, |c| c.len());
    let cols = level.map_or(1, |c| c.len());

    let figsize = figure_size(cols, rows, ratio, config.colorbar);

    let mut panels = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let mut parts = Vec::new();
            if let Some(label) = time.and_then(|c| c.values.label(row)) {
                parts.push(format!("time={}", label));
            }
            if let Some(label) = level.and_then(|c| c.values.label(col)) {
                parts.push(format!("level={}", label));
            }
            panels.push(Panel {
                row,
                col,
                title: parts.join(", "),
            });
        }
    }

    Ok(MosaicPlan {
        rows,
        cols,
        figsize,
        extent: Some(extent(array)?),
        subplots_horpadding: horizontal_padding(config),
        subplots_verpadding: config.subplots_verpadding,
        value_range: shared_range(array, vmin, vmax, config.share_dynamic_range),
        panels,
    })
}

/// Figure inches from the panel counts along its width and height
fn figure_size(across: usize, down: usize, ratio: f64, colorbar: bool) -> (f64, f64) {
    let colorbar_zone = if colorbar { COLORBAR_ZONE } else { 1.0 };
    (
        MIN_FIGURE_EDGE.max(across as f64 * INCHES_PER_PANEL) * ratio * colorbar_zone,
        MIN_FIGURE_EDGE.max(down as f64 * INCHES_PER_PANEL),
    )
}

fn horizontal_padding(config: &MosaicConfig) -> f64 {
    if config.colorbar {
        config.subplots_horpadding + COLORBAR_PADDING
    } else {
        config.subplots_horpadding
    }
}

/// Resolve [`ColorLimit::Data`] against the data, ignoring NaN
pub fn resolve_limits(
    data: &ArrayD<f32>,
    vmin: Option<ColorLimit>,
    vmax: Option<ColorLimit>,
) -> (Option<f32>, Option<f32>) {
    let range = nan_range(data.iter());
    let resolve = |limit: Option<ColorLimit>, pick: fn((f32, f32)) -> f32| match limit {
        Some(ColorLimit::Fixed(value)) => Some(value),
        Some(ColorLimit::Data) => range.map(pick),
        None => None,
    };
    (resolve(vmin, |r| r.0), resolve(vmax, |r| r.1))
}

fn ensure_cube(data: &ArrayD<f32>) -> Result<()> {
    if matches!(data.ndim(), 3 | 4) {
        Ok(())
    } else {
        Err(EcubevisError::Dimensionality {
            variable: "array".to_string(),
            ndim: data.ndim(),
        })
    }
}

/// Width over height of one image, from the last two axes
fn image_ratio(data: &ArrayD<f32>) -> Result<f64> {
    let shape = data.shape();
    let (ny, nx) = (shape[shape.len() - 2], shape[shape.len() - 1]);
    if ny == 0 || nx == 0 {
        return Err(EcubevisError::InvalidParameter {
            param: "data".to_string(),
            message: format!("Images must not be empty, got shape {:?}", shape),
        });
    }
    Ok(nx as f64 / ny as f64)
}

/// Pixels added to the plot width for a colorbar: bar, padding and tick
/// labels, which widen with the digit count of the integer part of `max`
fn colorbar_width(max: Option<f32>) -> u32 {
    let digits = max.map_or(0, |m| (m.trunc() as i64).to_string().len());
    let ticks = match digits {
        0..=3 => 25,
        4 => 35,
        _ => 45,
    };
    COLORBAR_WIDTH_PX + COLORBAR_PAD_PX + ticks
}

/// Interactive plan for a 3D `[time, y, x]` or 4D `[time, level, y, x]` array
/// without coordinates. The plot is `ndarray_plot_size_px` high.
pub fn ndarray_interactive_plan(
    data: &ArrayD<f32>,
    config: &MosaicConfig,
    vmin: Option<ColorLimit>,
    vmax: Option<ColorLimit>,
) -> Result<InteractivePlan> {
    ensure_cube(data)?;
    let ratio = image_ratio(data)?;
    let shape = data.shape();
    let frames = if data.ndim() == 4 { shape[0] * shape[1] } else { shape[0] };

    let height = config.ndarray_plot_size_px;
    let mut width = (height as f64 * ratio) as u32;
    if config.colorbar {
        width += colorbar_width(nan_range(data.iter()).map(|r| r.1));
    }

    Ok(InteractivePlan {
        width,
        height,
        frames,
        clim: resolve_limits(data, vmin, vmax),
    })
}

/// Static mosaic plan for an array without coordinates.
///
/// `Col` lays a 3D array out as one column of time steps and a 4D array as
/// time rows by level columns. `Row` lays the first axis of a 3D stack out as
/// a single row titled by `overlay_labels`. Capping to the configured limits
/// is left to the caller.
pub fn ndarray_mosaic_plan(
    data: &ArrayD<f32>,
    orientation: MosaicOrientation,
    config: &MosaicConfig,
    vmin: Option<ColorLimit>,
    vmax: Option<ColorLimit>,
    overlay_labels: Option<&[String]>,
    extent: Option<(f64, f64, f64, f64)>,
) -> Result<MosaicPlan> {
    ensure_cube(data)?;
    let ratio = image_ratio(data)?;
    let shape = data.shape();

    let (rows, cols) = match (orientation, data.ndim()) {
        (MosaicOrientation::Row, 3) => (1, shape[0]),
        (MosaicOrientation::Row, ndim) => {
            return Err(EcubevisError::InvalidParameter {
                param: "data".to_string(),
                message: format!("A row mosaic needs a stack of 2D images, got a {}D array", ndim),
            })
        }
        (MosaicOrientation::Col, 3) => (shape[0], 1),
        (MosaicOrientation::Col, _) => (shape[0], shape[1]),
    };

    // A row of stacked images sizes the figure with the panel counts swapped
    let figsize = match orientation {
        MosaicOrientation::Row => figure_size(rows, cols, ratio, config.colorbar),
        MosaicOrientation::Col => figure_size(cols, rows, ratio, config.colorbar),
    };

    let titles: Vec<String> = match (orientation, overlay_labels) {
        (MosaicOrientation::Row, Some(labels)) if labels.len() != cols => {
            return Err(EcubevisError::InvalidParameter {
                param: "overlay_labels".to_string(),
                message: format!("Expected {} labels, got {}", cols, labels.len()),
            })
        }
        (MosaicOrientation::Row, Some(labels)) => labels.to_vec(),
        _ => vec![String::new(); rows * cols],
    };

    let panels = titles
        .into_iter()
        .enumerate()
        .map(|(k, title)| Panel {
            row: k / cols,
            col: k % cols,
            title,
        })
        .collect();

    let (mut lo, mut hi) = resolve_limits(data, vmin, vmax);
    if config.share_dynamic_range {
        if let Some((data_lo, data_hi)) = nan_range(data.iter()) {
            lo = lo.or(Some(data_lo));
            hi = hi.or(Some(data_hi));
        }
    }

    Ok(MosaicPlan {
        rows,
        cols,
        figsize,
        extent,
        subplots_horpadding: horizontal_padding(config),
        subplots_verpadding: config.subplots_verpadding,
        value_range: (lo, hi),
        panels,
    })
}

/// First and last lon/lat values, as the renderer places the image
fn extent(array: &LabeledArray) -> Result<(f64, f64, f64, f64)> {
    let ends = |kind: CoordKind| -> Result<(f64, f64)> {
        let coord = array.coord_checked(kind.as_str())?;
        let values = coord
            .values
            .as_numeric()
            .ok_or_else(|| EcubevisError::InvalidCoordinates {
                message: format!("Coordinate {} must be numeric", kind),
            })?;
        match (values.first(), values.last()) {
            (Some(&first), Some(&last)) => Ok((first, last)),
            _ => Err(EcubevisError::InvalidCoordinates {
                message: format!("Coordinate {} is empty", kind),
            }),
        }
    };
    let (lon_first, lon_last) = ends(CoordKind::Lon)?;
    let (lat_first, lat_last) = ends(CoordKind::Lat)?;
    Ok((lon_first, lon_last, lat_first, lat_last))
}
