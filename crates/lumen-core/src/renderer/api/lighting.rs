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

//! GPU-side layouts of the light arrays.
//!
//! These structs are written verbatim into GPU buffers and must match the
//! declarations in the culling and shading shaders byte for byte.

use crate::math::{LinearRgba, Sphere, Vec3};
use crate::renderer::light::LightKind;

/// A directional light as read by the shading pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuDirectionalLight {
    /// Unit direction the light travels in, world space.
    pub direction: [f32; 3],
    /// Intensity multiplier.
    pub intensity: f32,
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Padding to 16-byte alignment.
    pub _padding: f32,
}

impl GpuDirectionalLight {
    /// Builds the GPU entry from its components.
    pub fn new(direction: Vec3, intensity: f32, color: LinearRgba) -> Self {
        Self {
            direction: direction.to_array(),
            intensity,
            color: color.to_rgb_array(),
            _padding: 0.0,
        }
    }
}

/// The shading parameters of a point or spot light.
///
/// `light_type` holds [`LightKind::Point`] (`1`) or [`LightKind::Spot`] (`2`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLightParameters {
    /// World-space position.
    pub position: [f32; 3],
    /// Intensity multiplier.
    pub intensity: f32,
    /// Unit direction (spot lights only).
    pub direction: [f32; 3],
    /// The light type discriminant.
    pub light_type: u32,
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Maximum reach of the light.
    pub range: f32,
    /// Constant, linear and quadratic attenuation coefficients.
    pub attenuation: [f32; 3],
    /// Cosine of half the umbra angle (spot lights only).
    pub cos_umbra: f32,
    /// Cosine of half the penumbra angle (spot lights only).
    pub cos_penumbra: f32,
    /// Padding to 16-byte alignment.
    pub _padding: [f32; 3],
}

impl GpuLightParameters {
    /// Returns the light kind stored in `light_type`.
    pub fn kind(&self) -> LightKind {
        if self.light_type == LightKind::Spot as u32 {
            LightKind::Spot
        } else {
            LightKind::Point
        }
    }
}

/// The data the culling shader needs for one light.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuCullingInfo {
    /// World-space position.
    pub position: [f32; 3],
    /// Maximum reach of the light.
    pub range: f32,
    /// Unit direction (spot lights only).
    pub direction: [f32; 3],
    /// Cosine of half the penumbra angle, or `-1.0` for point lights.
    pub cos_penumbra: f32,
}

/// A bounding sphere as read by the culling shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuSphere {
    /// World-space center.
    pub center: [f32; 3],
    /// Radius.
    pub radius: f32,
}

impl From<Sphere> for GpuSphere {
    fn from(sphere: Sphere) -> Self {
        Self {
            center: sphere.center.to_array(),
            radius: sphere.radius,
        }
    }
}

impl From<GpuSphere> for Sphere {
    fn from(sphere: GpuSphere) -> Self {
        Sphere::new(Vec3::from_array(sphere.center), sphere.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_gpu_layout_sizes() {
        assert_eq!(size_of::<GpuDirectionalLight>(), 32);
        assert_eq!(size_of::<GpuLightParameters>(), 80);
        assert_eq!(size_of::<GpuCullingInfo>(), 32);
        assert_eq!(size_of::<GpuSphere>(), 16);
    }

    #[test]
    fn test_gpu_light_parameters_kind() {
        let mut params = GpuLightParameters {
            light_type: LightKind::Spot as u32,
            ..Default::default()
        };
        assert_eq!(params.kind(), LightKind::Spot);
        params.light_type = LightKind::Point as u32;
        assert_eq!(params.kind(), LightKind::Point);
    }

    #[test]
    fn test_sphere_conversion_round_trip() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 4.0);
        let gpu: GpuSphere = sphere.into();
        assert_eq!(gpu.center, [1.0, 2.0, 3.0]);
        assert_eq!(Sphere::from(gpu), sphere);
    }
}
