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

//! Built-in compute shaders of the light culling passes.
//!
//! # Usage
//!
//! ```ignore
//! use lumen_lanes::render_lane::shaders::GRID_FRUSTUMS_WGSL;
//! use lumen_core::renderer::{ShaderModuleDescriptor, ShaderSourceData};
//! use std::borrow::Cow;
//!
//! let descriptor = ShaderModuleDescriptor {
//!     label: Some("grid_frustums"),
//!     source: ShaderSourceData::Wgsl(Cow::Borrowed(GRID_FRUSTUMS_WGSL)),
//! };
//! ```

/// Builds one view-space frustum per 32x32 pixel tile.
///
/// Bindings: `0` constants (`GridFrustumsConstants`), `1` frustums (read/write).
pub const GRID_FRUSTUMS_WGSL: &str = include_str!("grid_frustums.wgsl");

/// Writes the light grid and light index list of every tile.
///
/// Bindings: `0` constants (`LightCullingConstants`), `1` frustums, `2` culling
/// info, `3` bounding spheres, `4` light index counter, `5` light grid, `6`
/// light index list.
pub const LIGHT_CULLING_WGSL: &str = include_str!("light_culling.wgsl");

/// Entry point shared by both shaders.
pub const COMPUTE_ENTRY_POINT: &str = "cs_main";

/// Number of light slots a culling workgroup can hold for its tile.
pub const MAX_TILE_LIGHTS: u32 = 1024;
