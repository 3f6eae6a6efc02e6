use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::display::Palette;
use crate::state::RenderParams;
use crate::{Error, Result};

/// Bounds applied to requested sizes before anything is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub min_cells: usize,
    pub max_cells: usize,
    pub min_steps: usize,
    pub max_steps: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_cells: 1,
            max_cells: 1000,
            min_steps: 1,
            max_steps: 1000,
        }
    }
}

impl Limits {
    /// Largest `max_cells` or `max_steps` a config may ask for.
    pub const HARD_MAX: usize = 100_000;

    pub fn validate(&self) -> Result<()> {
        check_range("cells", self.min_cells, self.max_cells)?;
        check_range("steps", self.min_steps, self.max_steps)
    }

    pub fn clamp_cells(&self, cells: usize) -> usize {
        clamp(cells, self.min_cells, self.max_cells)
    }

    pub fn clamp_steps(&self, steps: usize) -> usize {
        clamp(steps, self.min_steps, self.max_steps)
    }
}

fn check_range(name: &str, min: usize, max: usize) -> Result<()> {
    if min < 1 || min > max || max > Limits::HARD_MAX {
        return Err(Error::invalid_argument(format!(
            "{name} limits must satisfy 1 <= min <= max <= {}, got {min}..={max}",
            Limits::HARD_MAX
        )));
    }
    Ok(())
}

// Never panics, even on limits that failed validation.
fn clamp(value: usize, min: usize, max: usize) -> usize {
    value.min(max.min(Limits::HARD_MAX)).max(min.max(1))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub limits: Limits,
    /// Values used for parameters a request leaves out.
    pub defaults: RenderParams,
    pub palette: Palette,
    /// Where the HTML page points its `<img>`; empty means the page's own URL.
    pub endpoint: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            defaults: RenderParams::default(),
            palette: Palette::default(),
            endpoint: String::new(),
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.limits.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}
