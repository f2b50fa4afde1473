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

//! Per-frame inputs of the light subsystem.

/// The number of frames the CPU may record ahead of the GPU.
///
/// Every per-frame resource (light buffers, culling buffers) exists this many
/// times, and each light carries one dirty bit per frame.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Identifies a registered culler (one per render surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CullerId(pub u32);

/// The camera data the culling passes need.
///
/// Matrices are column-major. View space is right-handed and the camera looks
/// down `-Z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    /// The vertical field of view, in radians.
    pub fov_y: f32,
    /// Distance to the near plane (positive).
    pub z_near: f32,
    /// Distance to the far plane (positive).
    pub z_far: f32,
    /// World-to-view transform.
    pub view: [[f32; 4]; 4],
    /// Clip-to-view transform.
    pub inverse_projection: [[f32; 4]; 4],
}

impl Default for CameraParams {
    fn default() -> Self {
        const IDENTITY: [[f32; 4]; 4] = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        Self {
            fov_y: std::f32::consts::FRAC_PI_4,
            z_near: 0.1,
            z_far: 1000.0,
            view: IDENTITY,
            inverse_projection: IDENTITY,
        }
    }
}

/// Everything the light subsystem needs to know about the frame being recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// The frame-in-flight slot, in `0..MAX_FRAMES_IN_FLIGHT`.
    pub frame_index: usize,
    /// The light set rendered this frame.
    pub light_set_key: crate::renderer::LightSetKey,
    /// The culler of the surface being rendered.
    pub culler_id: CullerId,
    /// Surface width in pixels.
    pub surface_width: u32,
    /// Surface height in pixels.
    pub surface_height: u32,
    /// The camera rendering the surface.
    pub camera: CameraParams,
}
