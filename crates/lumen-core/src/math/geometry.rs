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

//! Bounding volumes used by the light culler.

use super::{Vec3, EPSILON, FRAC_PI_4};

/// A bounding sphere in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sphere {
    /// The center of the sphere.
    pub center: Vec3,
    /// The radius of the sphere.
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere.
    #[inline]
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Computes the tightest simple bounding sphere of a cone.
    ///
    /// The cone has its tip at `tip`, points along the unit vector `direction`,
    /// extends `range` units along its edges and has a half-angle whose cosine
    /// is `cos_half_angle`.
    ///
    /// Narrow cones (half-angle up to 45°) are bounded by the sphere passing
    /// through the tip and the rim. Wider cones are bounded by the sphere
    /// centered on the rim's plane.
    ///
    /// # Panics
    ///
    /// Panics if `cos_half_angle` is not positive, i.e. the cone is a half-space
    /// or wider.
    pub fn from_cone(tip: Vec3, direction: Vec3, range: f32, cos_half_angle: f32) -> Self {
        assert!(
            cos_half_angle > 0.0,
            "cone half-angle must be below 90 degrees (cos = {cos_half_angle})"
        );

        if cos_half_angle >= FRAC_PI_4.cos() {
            let radius = range / (2.0 * cos_half_angle);
            Self::new(tip + direction * radius, radius)
        } else {
            let sin_half_angle = (1.0 - cos_half_angle * cos_half_angle).sqrt();
            Self::new(tip + direction * (cos_half_angle * range), sin_half_angle * range)
        }
    }

    /// Returns `true` if `point` lies inside or on the sphere.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.center.distance(point) <= self.radius + EPSILON * self.radius.max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::degrees_to_radians;
    use approx::assert_relative_eq;

    fn rim_point(range: f32, half_angle: f32) -> Vec3 {
        Vec3::new(half_angle.sin() * range, 0.0, half_angle.cos() * range)
    }

    #[test]
    fn test_narrow_cone_sphere_passes_through_tip_and_rim() {
        let half_angle = degrees_to_radians(30.0);
        let sphere = Sphere::from_cone(Vec3::ZERO, Vec3::Z, 10.0, half_angle.cos());

        assert_relative_eq!(sphere.radius, 10.0 / (2.0 * half_angle.cos()), epsilon = 1e-5);
        assert_relative_eq!(sphere.center.z, sphere.radius, epsilon = 1e-5);
        assert!(sphere.contains_point(Vec3::ZERO));
        assert!(sphere.contains_point(rim_point(10.0, half_angle)));
        assert!(sphere.contains_point(Vec3::Z * 10.0));
    }

    #[test]
    fn test_wide_cone_sphere_is_centered_on_rim_plane() {
        let half_angle = degrees_to_radians(60.0);
        let sphere = Sphere::from_cone(Vec3::ZERO, Vec3::Z, 10.0, half_angle.cos());

        assert_relative_eq!(sphere.center.z, 5.0, epsilon = 1e-5);
        assert_relative_eq!(sphere.radius, half_angle.sin() * 10.0, epsilon = 1e-5);
        assert!(sphere.contains_point(Vec3::ZERO));
        assert!(sphere.contains_point(rim_point(10.0, half_angle)));
        assert!(sphere.contains_point(Vec3::Z * 10.0));
    }

    #[test]
    fn test_cone_sphere_follows_tip_and_direction() {
        let tip = Vec3::new(3.0, -2.0, 1.0);
        let sphere = Sphere::from_cone(tip, -Vec3::Y, 4.0, 0.9);
        assert_relative_eq!(sphere.center.x, 3.0);
        assert!(sphere.center.y < tip.y);
        assert!(sphere.contains_point(tip));
    }

    #[test]
    #[should_panic]
    fn test_cone_wider_than_hemisphere_panics() {
        let _ = Sphere::from_cone(Vec3::ZERO, Vec3::Z, 1.0, 0.0);
    }
}
