use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::imaging::FilterParameters;

// ---------------------------------------------------------------------------
// Config – defaults for the host application
// ---------------------------------------------------------------------------

/// Host-side settings, usually read from a JSON file.
///
/// Every field is optional in the file:
///
/// ```json
/// { "inner_radius": 5, "outer_radius": 60, "native_size": true }
/// ```
///
/// Radii stay signed here so a bad value is reported by
/// [`FilterParameters::new`] instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub inner_radius: i64,
    pub inner_smooth: i64,
    pub outer_radius: i64,
    pub outer_smooth: i64,
    pub preview_width: u32,
    pub preview_height: u32,
    /// Keep outputs at the source size instead of resizing for preview.
    pub native_size: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inner_radius: 5,
            inner_smooth: 2,
            outer_radius: 100,
            outer_smooth: 10,
            preview_width: 500,
            preview_height: 500,
            native_size: false,
        }
    }
}

impl Config {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Validated bandpass parameters.
    pub fn parameters(&self) -> Result<FilterParameters> {
        FilterParameters::new(
            self.inner_radius,
            self.inner_smooth,
            self.outer_radius,
            self.outer_smooth,
        )
        .context("bandpass parameters")
    }

    /// Output size as `(width, height)`, or `None` for native size.
    pub fn preview(&self) -> Option<(u32, u32)> {
        (!self.native_size).then_some((self.preview_width, self.preview_height))
    }
}
