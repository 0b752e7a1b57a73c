//! Configuration for the grid processor.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! environment variables.

use std::path::Path;

use grid_common::LabelIntervals;
use serde::{Deserialize, Serialize};

use crate::downsample::DownsampleMethod;
use crate::error::Result;
use crate::hull::HullOptions;

/// Configuration for the grid processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridProcessorConfig {
    /// Tick label spacing for annotated plots.
    pub labels: LabelIntervals,

    /// Block reduction used by `downsample` when none is given.
    pub downsample_method: DownsampleMethod,

    /// Block size used by `downsample` when none is given.
    pub downsample_factor: usize,

    /// Maximum neighbour distance when comparing point sets, in map units.
    pub search_distance: f64,

    /// Value written for missing cells in ASCII grids.
    pub nodata: f64,

    /// Density boundary tracing.
    pub hull: HullOptions,
}

impl Default for GridProcessorConfig {
    fn default() -> Self {
        Self {
            labels: LabelIntervals::default(),
            downsample_method: DownsampleMethod::Mean,
            downsample_factor: 2,
            search_distance: 100.0,
            nodata: -9999.0,
            hull: HullOptions::default(),
        }
    }
}

impl GridProcessorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Load configuration from a YAML file. Missing keys take their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply environment variable overrides on top of this configuration.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Unparsable values are ignored.
    pub fn with_overrides(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = get("GRID_LABEL_X_INTERVAL") {
            if let Ok(v) = val.parse() {
                self.labels.x_interval = v;
            }
        }

        if let Some(val) = get("GRID_LABEL_Y_INTERVAL") {
            if let Ok(v) = val.parse() {
                self.labels.y_interval = v;
            }
        }

        if let Some(val) = get("GRID_LABEL_RESCALE") {
            if let Ok(v) = val.parse() {
                self.labels.rescale = v;
            }
        }

        if let Some(val) = get("GRID_DOWNSAMPLE_METHOD") {
            if let Ok(method) = val.parse() {
                self.downsample_method = method;
            }
        }

        if let Some(val) = get("GRID_DOWNSAMPLE_FACTOR") {
            if let Ok(factor) = val.parse() {
                self.downsample_factor = factor;
            }
        }

        if let Some(val) = get("GRID_SEARCH_DISTANCE") {
            if let Ok(dist) = val.parse() {
                self.search_distance = dist;
            }
        }

        if let Some(val) = get("GRID_NODATA") {
            if let Ok(nodata) = val.parse() {
                self.nodata = nodata;
            }
        }

        if let Some(val) = get("GRID_HULL_BOUNDARY") {
            if let Ok(level) = val.parse() {
                self.hull.boundary = level;
            }
        }

        if let Some(val) = get("GRID_HULL_NAN_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.hull.nan_limit = limit;
            }
        }

        if let Some(val) = get("GRID_HULL_RESOLUTION") {
            if let Ok(n) = val.parse() {
                self.hull.resolution = n;
            }
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.labels.validate().map_err(|e| e.to_string())?;

        if self.downsample_factor == 0 {
            return Err("downsample_factor must be > 0".to_string());
        }

        if !(self.search_distance.is_finite() && self.search_distance > 0.0) {
            return Err("search_distance must be a positive number".to_string());
        }

        if !self.nodata.is_finite() {
            return Err("nodata must be finite".to_string());
        }

        self.hull.validate()?;

        Ok(())
    }
}
