//! Configuration management for ecubevis.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coords::CoordinateVocabulary;
use crate::dataset::VariableSelector;
use crate::error::{EcubevisError, Result};
use crate::pipeline::{PlotMode, PlotRequest};
use crate::slicing::{IndexRange, SliceSpec, TimeBound, ValueRange, DEFAULT_WRAP};

/// Command-line arguments for ecubevis
#[derive(Parser, Debug, Clone)]
#[command(name = "ecubevis")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the NetCDF dataset (".nc" is appended when missing)
    pub dataset: PathBuf,

    /// Variable to plot, by name or by position
    #[arg(short, long)]
    pub variable: Option<String>,

    /// Time bounds "start,stop": two integers for a half-open index range,
    /// otherwise an inclusive date label range. Whole years are written as
    /// months, e.g. "2000-01,2001-12"
    #[arg(long, allow_hyphen_values = true)]
    pub slice_time: Option<String>,

    /// Level index bounds "start,stop" (half-open)
    #[arg(long, allow_hyphen_values = true)]
    pub slice_level: Option<String>,

    /// Latitude bounds "min,max" (exclusive)
    #[arg(long, allow_hyphen_values = true)]
    pub slice_lat: Option<String>,

    /// Longitude bounds "start,stop"; may cross the 0/360 seam
    #[arg(long, allow_hyphen_values = true)]
    pub slice_lon: Option<String>,

    /// Plan a static mosaic instead of an interactive slider view
    #[arg(long = "static")]
    pub static_mosaic: bool,

    /// Longitude period in degrees
    #[arg(long, env = "ECUBEVIS_WRAP")]
    pub wrap: Option<f64>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "ECUBEVIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ECUBEVIS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Print the prepared plot as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Parse the slice arguments into a slice spec
    pub fn slice_spec(&self) -> Result<SliceSpec> {
        Ok(SliceSpec {
            time: self.slice_time.as_deref().map(str::parse::<TimeBound>).transpose()?,
            level: self.slice_level.as_deref().map(str::parse::<IndexRange>).transpose()?,
            lat: self.slice_lat.as_deref().map(str::parse::<ValueRange>).transpose()?,
            lon: self.slice_lon.as_deref().map(str::parse::<ValueRange>).transpose()?,
        })
    }

    /// Build the plot request described by the arguments
    pub fn plot_request(&self) -> Result<PlotRequest> {
        let variable = match &self.variable {
            Some(v) => v.parse::<VariableSelector>().unwrap_or_default(),
            None => VariableSelector::First,
        };
        Ok(PlotRequest {
            variable,
            slices: self.slice_spec()?,
            mode: if self.static_mosaic {
                PlotMode::Static
            } else {
                PlotMode::Interactive
            },
            ..Default::default()
        })
    }
}

/// Slicing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlicingConfig {
    /// Longitude period used by the wraparound selection
    #[serde(default = "default_wrap")]
    pub wrap: f64,
}

/// Plot planning configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MosaicConfig {
    /// Most time steps shown as rows of a static mosaic
    #[serde(default = "default_max_subplots")]
    pub max_static_subplot_rows: usize,

    /// Most levels shown as columns of a static mosaic
    #[serde(default = "default_max_subplots")]
    pub max_static_subplot_cols: usize,

    /// Use one value range across all panels
    #[serde(default = "default_true")]
    pub share_dynamic_range: bool,

    /// Reserve room for a colorbar next to each panel
    #[serde(default = "default_true")]
    pub colorbar: bool,

    /// Width of the interactive plot in pixels
    #[serde(default = "default_plot_size_px")]
    pub plot_size_px: u32,

    /// Height of an interactive plot of a bare array, in pixels
    #[serde(default = "default_ndarray_plot_size_px")]
    pub ndarray_plot_size_px: u32,

    /// Horizontal spacing between static panels
    #[serde(default = "default_padding")]
    pub subplots_horpadding: f64,

    /// Vertical spacing between static panels
    #[serde(default = "default_padding")]
    pub subplots_verpadding: f64,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Slicing configuration
    #[serde(default)]
    pub slicing: SlicingConfig,

    /// Plot planning configuration
    #[serde(default)]
    pub mosaic: MosaicConfig,

    /// Accepted alternate coordinate names
    #[serde(default)]
    pub coordinates: CoordinateVocabulary,

    /// Variable to plot when none is given on the command line
    #[serde(default)]
    pub variable: Option<VariableSelector>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Args)> {
        let args = Args::parse();
        let config = Self::from_args(&args)?;
        Ok((config, args))
    }

    /// Layer a config file and command-line overrides on top of the defaults
    pub fn from_args(args: &Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(variable) = &args.variable {
            config.variable = variable.parse().ok();
        }
        if let Some(wrap) = args.wrap {
            config.slicing.wrap = wrap;
        }
        if let Some(log_level) = &args.log_level {
            config.log_level = log_level.clone();
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.slicing = other.slicing;
        self.mosaic = other.mosaic;
        self.coordinates = other.coordinates;
        self.variable = other.variable;
        self.log_level = other.log_level;
    }

    /// Build the plot request from the arguments, taking the variable from
    /// the configuration when the command line names none
    pub fn plot_request(&self, args: &Args) -> Result<PlotRequest> {
        let mut request = args.plot_request()?;
        if args.variable.is_none() {
            if let Some(variable) = &self.variable {
                request.variable = variable.clone();
            }
        }
        Ok(request)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.slicing.wrap > 0.0 && self.slicing.wrap.is_finite()) {
            return Err(EcubevisError::Config {
                message: format!("Wrap period must be positive, got {}", self.slicing.wrap),
            });
        }

        if self.mosaic.max_static_subplot_rows == 0 || self.mosaic.max_static_subplot_cols == 0 {
            return Err(EcubevisError::Config {
                message: "Static mosaic limits must be at least 1".to_string(),
            });
        }

        if self.mosaic.plot_size_px == 0 || self.mosaic.ndarray_plot_size_px == 0 {
            return Err(EcubevisError::Config {
                message: "Plot size cannot be 0".to_string(),
            });
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(EcubevisError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        self.coordinates.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slicing: SlicingConfig::default(),
            mosaic: MosaicConfig::default(),
            coordinates: CoordinateVocabulary::default(),
            variable: None,
            log_level: default_log_level(),
        }
    }
}

impl Default for SlicingConfig {
    fn default() -> Self {
        Self { wrap: default_wrap() }
    }
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            max_static_subplot_rows: default_max_subplots(),
            max_static_subplot_cols: default_max_subplots(),
            share_dynamic_range: true,
            colorbar: true,
            plot_size_px: default_plot_size_px(),
            ndarray_plot_size_px: default_ndarray_plot_size_px(),
            subplots_horpadding: default_padding(),
            subplots_verpadding: default_padding(),
        }
    }
}

// Default value functions for serde
fn default_wrap() -> f64 {
    DEFAULT_WRAP
}

fn default_max_subplots() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_plot_size_px() -> u32 {
    1000
}

fn default_ndarray_plot_size_px() -> u32 {
    360
}

fn default_padding() -> f64 {
    0.05
}

fn default_log_level() -> String {
    "info".to_string()
}
