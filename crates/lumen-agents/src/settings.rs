// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tunables of the light subsystem, loadable from RON.
//!
//! ```ron
//! (
//!     max_lights_per_tile: 256,
//!     initial_cullable_capacity: 64,
//!     initial_non_cullable_capacity: 4,
//! )
//! ```

use std::path::Path;

use anyhow::{ensure, Context, Result};
use lumen_core::renderer::DEFAULT_MAX_LIGHTS_PER_TILE;
use lumen_lanes::render_lane::shaders::MAX_TILE_LIGHTS;
use serde::{Deserialize, Serialize};

/// Sizing parameters of the light buffers and the light index list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Number of light index list entries reserved per tile.
    pub max_lights_per_tile: u32,
    /// Initial capacity of the point/spot light buffers.
    pub initial_cullable_capacity: u32,
    /// Initial capacity of the directional light buffer.
    pub initial_non_cullable_capacity: u32,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            max_lights_per_tile: DEFAULT_MAX_LIGHTS_PER_TILE,
            initial_cullable_capacity: 64,
            initial_non_cullable_capacity: 4,
        }
    }
}

impl LightingSettings {
    /// Parses and validates settings from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let settings: Self = ron::from_str(text).context("Failed to parse lighting settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lighting settings '{}'", path.display()))?;
        let settings = Self::from_ron_str(&text)
            .with_context(|| format!("Invalid lighting settings in '{}'", path.display()))?;
        log::debug!("Loaded lighting settings from '{}': {settings:?}", path.display());
        Ok(settings)
    }

    /// Checks the values the GPU passes can work with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_lights_per_tile > 0,
            "max_lights_per_tile must be positive"
        );
        ensure!(
            self.max_lights_per_tile <= MAX_TILE_LIGHTS,
            "max_lights_per_tile ({}) exceeds the culling shader capacity ({MAX_TILE_LIGHTS})",
            self.max_lights_per_tile
        );
        Ok(())
    }
}
