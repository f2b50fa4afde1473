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

//! Defines light types and light handles.
//!
//! A light is created from a [`LightInitInfo`] and referred to afterwards through
//! a [`Light`] handle. Position and orientation are never stored here: they are
//! pulled from the owning entity's transform every frame.

use serde::{Deserialize, Serialize};

use crate::ecs::EntityId;
use crate::math::{degrees_to_radians, LinearRgba, Vec3, PI};

/// Identifies a light set (a named collection of lights, typically one per scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LightSetKey(pub u64);

/// Stable identifier of a light inside its light set.
///
/// The id never changes during the light's lifetime, even when the light moves
/// inside the packed storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub u32);

/// An opaque reference to a light, returned when the light is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Light {
    /// The light's id inside its set.
    pub id: LightId,
    /// The set the light belongs to.
    pub light_set_key: LightSetKey,
}

/// The type of a light, without its parameters.
///
/// The discriminants are the values the shaders read from `light_type`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    /// Affects the whole scene from a direction.
    Directional = 0,
    /// Emits in every direction up to a range.
    Point = 1,
    /// Emits in a cone up to a range.
    Spot = 2,
}

impl LightKind {
    /// Returns `true` for lights with a finite range, which can be tile-culled.
    #[inline]
    pub const fn is_cullable(self) -> bool {
        !matches!(self, LightKind::Directional)
    }
}

/// The parameters of a point light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    /// Constant, linear and quadratic attenuation coefficients.
    pub attenuation: Vec3,
    /// The maximum range of the light in world units.
    ///
    /// Beyond this distance the light has no effect; this is the radius used
    /// by the tile culler.
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            attenuation: Vec3::new(1.0, 0.35, 0.44),
            range: 13.0,
        }
    }
}

/// The parameters of a spot light.
///
/// # Examples
///
/// ```
/// use lumen_core::renderer::SpotLight;
/// use lumen_core::math::Vec3;
///
/// // A narrow flashlight.
/// let flashlight = SpotLight {
///     attenuation: Vec3::new(1.0, 0.09, 0.032),
///     range: 20.0,
///     umbra: 30.0_f32.to_radians(),
///     penumbra: 40.0_f32.to_radians(),
/// };
/// assert!(flashlight.cos_half_penumbra() < flashlight.cos_half_umbra());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    /// Constant, linear and quadratic attenuation coefficients.
    pub attenuation: Vec3,
    /// The maximum range of the light along its cone edges.
    pub range: f32,
    /// Full angle of the fully lit inner cone, in radians.
    pub umbra: f32,
    /// Full angle of the outer cone where light fades to zero, in radians.
    ///
    /// Must be greater than or equal to `umbra` and below `PI`.
    pub penumbra: f32,
}

impl SpotLight {
    /// Cosine of half the umbra angle, as stored on the GPU.
    #[inline]
    pub fn cos_half_umbra(&self) -> f32 {
        (self.umbra * 0.5).cos()
    }

    /// Cosine of half the penumbra angle, as stored on the GPU.
    #[inline]
    pub fn cos_half_penumbra(&self) -> f32 {
        (self.penumbra * 0.5).cos()
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            attenuation: Vec3::new(1.0, 0.35, 0.44),
            range: 13.0,
            umbra: degrees_to_radians(40.0),
            penumbra: degrees_to_radians(70.0),
        }
    }
}

/// The type of a light, with its type-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightType {
    /// A directional light. Its direction comes from the entity's orientation.
    Directional,
    /// A point light.
    Point(PointLight),
    /// A spot light.
    Spot(SpotLight),
}

impl LightType {
    /// Returns the parameter-less kind of this light.
    #[inline]
    pub const fn kind(&self) -> LightKind {
        match self {
            LightType::Directional => LightKind::Directional,
            LightType::Point(_) => LightKind::Point,
            LightType::Spot(_) => LightKind::Spot,
        }
    }
}

/// Everything needed to create a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightInitInfo {
    /// The set the light is added to.
    pub light_set_key: LightSetKey,
    /// The entity whose transform places the light.
    pub entity_id: EntityId,
    /// Type and type-specific parameters.
    pub light_type: LightType,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Linear color.
    pub color: LinearRgba,
    /// Whether the light starts enabled.
    pub is_enabled: bool,
}

impl LightInitInfo {
    /// Checks that the parameters can produce a valid light.
    ///
    /// # Panics
    ///
    /// Panics if a range is not positive or spot angles are out of order.
    pub fn validate(&self) {
        match self.light_type {
            LightType::Directional => {}
            LightType::Point(point) => {
                assert!(point.range > 0.0, "point light range must be positive");
            }
            LightType::Spot(spot) => {
                assert!(spot.range > 0.0, "spot light range must be positive");
                assert!(
                    spot.umbra > 0.0 && spot.umbra <= spot.penumbra && spot.penumbra < PI,
                    "spot light angles must satisfy 0 < umbra <= penumbra < PI"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn info(light_type: LightType) -> LightInitInfo {
        LightInitInfo {
            light_set_key: LightSetKey(0),
            entity_id: EntityId::new(0),
            light_type,
            intensity: 1.0,
            color: LinearRgba::WHITE,
            is_enabled: true,
        }
    }

    #[test]
    fn test_light_kind_cullability() {
        assert!(!LightKind::Directional.is_cullable());
        assert!(LightKind::Point.is_cullable());
        assert!(LightKind::Spot.is_cullable());
        assert_eq!(LightType::Point(PointLight::default()).kind(), LightKind::Point);
    }

    #[test]
    fn test_spot_half_angle_cosines() {
        let spot = SpotLight {
            umbra: degrees_to_radians(60.0),
            penumbra: degrees_to_radians(90.0),
            ..Default::default()
        };
        assert_relative_eq!(spot.cos_half_umbra(), degrees_to_radians(30.0).cos());
        assert_relative_eq!(spot.cos_half_penumbra(), degrees_to_radians(45.0).cos());
    }

    #[test]
    fn test_default_lights_are_valid() {
        info(LightType::Directional).validate();
        info(LightType::Point(PointLight::default())).validate();
        info(LightType::Spot(SpotLight::default())).validate();
    }

    #[test]
    #[should_panic(expected = "umbra <= penumbra")]
    fn test_inverted_spot_angles_panic() {
        let spot = SpotLight {
            umbra: 1.0,
            penumbra: 0.5,
            ..Default::default()
        };
        info(LightType::Spot(spot)).validate();
    }

    #[test]
    #[should_panic(expected = "range must be positive")]
    fn test_zero_range_panics() {
        let point = PointLight {
            range: 0.0,
            ..Default::default()
        };
        info(LightType::Point(point)).validate();
    }
}
