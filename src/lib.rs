//! # ecubevis
//!
//! Coordinate normalization, antimeridian-aware slicing and plot planning for
//! gridded climate data.
//!
//! This library takes a variable from a NetCDF dataset (or any in-memory
//! labeled array), renames its axes to the canonical `time`, `level`, `lat`
//! and `lon`, slices it along those axes and plans how an external renderer
//! should lay it out.
//!
//! ## Key Features
//!
//! - **Coordinate normalization**: ERA5 and CMIP style names (`latitude`,
//!   `longitude`, `height`, `frequency`) map to one canonical vocabulary
//! - **Seam-aware longitude slicing**: intervals such as `300,60` on a `0..360`
//!   axis come back as one contiguous region with coordinates in `-180..180`
//! - **Plot planning**: slider frames for interactive views, panel grids and
//!   figure sizes for static mosaics, for labeled variables and bare arrays
//!
//! ## Architecture
//!
//! - **Data Layer**: [`array`] and [`dataset`] hold labeled arrays in memory;
//!   `data_loader` fills them from NetCDF files
//! - **Processing**: [`coords`] renames axes, [`slicing`] narrows them
//! - **Planning**: [`layout`] and [`pipeline`] turn a sliced variable into a
//!   renderer-facing plan

pub mod array;
pub mod cf_time;
pub mod config;
pub mod coords;
#[cfg(feature = "netcdf")]
pub mod data_loader;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod logging;
pub mod pipeline;
pub mod slicing;

pub use array::{AttributeValue, Coordinate, CoordinateValues, LabeledArray};
pub use config::Config;
pub use coords::{normalize, CoordKind, CoordinateVocabulary};
pub use dataset::{Dataset, VariableSelector};
pub use error::{EcubevisError, Result};
pub use logging::{
    init_tracing, log_data_load_stats, log_error, log_operation_end, log_operation_start,
    log_timed_operation,
};
pub use layout::{ColorLimit, MosaicOrientation};
pub use pipeline::{
    prepare_ndarray, prepare_plot, NdarrayInput, NdarrayRequest, PlotMode, PlotPlan, PlotRequest, PlotSummary,
    PreparedArray, PreparedPlot,
};
pub use slicing::{slice_array, wraparound_select, IndexRange, SliceSpec, TimeBound, ValueRange, WrapSelection};
