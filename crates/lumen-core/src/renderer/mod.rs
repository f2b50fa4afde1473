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

//! Provides the public, backend-agnostic contracts for the light subsystem.
//!
//! This module defines the "common language" between the light storage, the
//! culling dispatcher and the outside world: light descriptions and handles,
//! the binary layouts shared with the culling shaders, the tile math, the
//! narrow GPU traits (like [`GraphicsDevice`]) and the error types.
//!
//! The 'how' of talking to a real graphics API lives outside this workspace; a
//! backend only has to implement [`GraphicsDevice`] and
//! [`CommandEncoder`](traits::CommandEncoder).

pub mod api;
pub mod error;
pub mod forward_plus;
pub mod light;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{RenderError, ResourceError};
pub use self::forward_plus::{
    tile_count, GpuFrustum, GpuLightGridEntry, GpuPlane, GridFrustumsConstants,
    LightCullingConstants, TileGrid, DEFAULT_MAX_LIGHTS_PER_TILE, STORAGE_OFFSET_ALIGNMENT,
    TILE_SIZE,
};
pub use self::light::{
    Light, LightId, LightInitInfo, LightKind, LightSetKey, LightType, PointLight, SpotLight,
};
pub use self::traits::{CommandEncoder, ComputePass, GraphicsDevice};
