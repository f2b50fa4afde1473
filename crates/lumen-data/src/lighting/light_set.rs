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

//! Packed storage of the lights of one light set.
//!
//! Directional lights live in a flat array whose freed slots are simply left
//! empty. Point and spot lights live in parallel arrays (parameters, culling
//! info, bounding sphere, entity, owner, dirty bits) partitioned in two
//! regions: `[0, enabled_count)` holds exactly the enabled lights and
//! `[enabled_count, len)` holds the disabled ones and the freed slots.
//! Enabling or disabling a light swaps it across the boundary, so the GPU
//! mirror only ever needs the first `enabled_count` entries.

use lumen_core::ecs::{ChangeBitset, EntityId, TransformSource};
use lumen_core::math::{LinearRgba, Sphere, Vec3};
use lumen_core::renderer::{
    GpuCullingInfo, GpuDirectionalLight, GpuLightParameters, GpuSphere, Light, LightId,
    LightInitInfo, LightKind, LightSetKey, LightType, MAX_FRAMES_IN_FLIGHT,
};

use super::dirty::FrameDirtyBits;

type DirtyBits = FrameDirtyBits<MAX_FRAMES_IN_FLIGHT>;

// Slack for comparing cone cosines that went through an angle round trip.
const CONE_COS_TOLERANCE: f32 = 1e-6;

/// Book-keeping for one live light, addressed by its stable [`LightId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightOwner {
    /// The entity whose transform places the light.
    pub entity_id: EntityId,
    /// Current slot in the directional or cullable arrays. Moves during packing.
    pub light_index: u32,
    /// The light's type.
    pub kind: LightKind,
    /// Whether the light is enabled.
    pub is_enabled: bool,
    // Set when the light was added or re-enabled: its transform must be pulled
    // on the next update even if the entity did not move this frame.
    needs_transform: bool,
}

/// Storage for the lights of one light set.
#[derive(Debug)]
pub struct LightSet {
    key: LightSetKey,

    owners: Vec<Option<LightOwner>>,
    free_owner_ids: Vec<LightId>,

    non_cullable_lights: Vec<GpuDirectionalLight>,
    non_cullable_owners: Vec<Option<LightId>>,

    cullable_lights: Vec<GpuLightParameters>,
    culling_infos: Vec<GpuCullingInfo>,
    bounding_spheres: Vec<GpuSphere>,
    cullable_entity_ids: Vec<EntityId>,
    cullable_owners: Vec<Option<LightId>>,
    dirty_bits: Vec<DirtyBits>,
    enabled_count: u32,

    something_is_dirty: DirtyBits,
    transform_flags: ChangeBitset,
}

impl LightSet {
    /// Creates an empty light set.
    pub fn new(key: LightSetKey) -> Self {
        Self::with_capacity(key, 0, 0)
    }

    /// Creates an empty light set with room for the given number of lights.
    pub fn with_capacity(key: LightSetKey, cullable: usize, non_cullable: usize) -> Self {
        Self {
            key,
            owners: Vec::with_capacity(cullable + non_cullable),
            free_owner_ids: Vec::new(),
            non_cullable_lights: Vec::with_capacity(non_cullable),
            non_cullable_owners: Vec::with_capacity(non_cullable),
            cullable_lights: Vec::with_capacity(cullable),
            culling_infos: Vec::with_capacity(cullable),
            bounding_spheres: Vec::with_capacity(cullable),
            cullable_entity_ids: Vec::with_capacity(cullable),
            cullable_owners: Vec::with_capacity(cullable),
            dirty_bits: Vec::with_capacity(cullable),
            enabled_count: 0,
            something_is_dirty: DirtyBits::CLEAN,
            transform_flags: ChangeBitset::new(),
        }
    }

    /// The key this set is registered under.
    pub fn key(&self) -> LightSetKey {
        self.key
    }

    /// Adds a light and returns its handle.
    ///
    /// The light starts in the disabled region and is enabled right away if
    /// `info.is_enabled` is set.
    ///
    /// # Panics
    ///
    /// Panics if `info` targets another light set or has invalid parameters.
    pub fn add(&mut self, info: &LightInitInfo) -> Light {
        assert_eq!(
            info.light_set_key, self.key,
            "light added to set {:?} but targets {:?}",
            self.key, info.light_set_key
        );
        info.validate();

        let id = self.allocate_owner_id();
        let kind = info.light_type.kind();

        let light_index = if kind.is_cullable() {
            self.insert_cullable(id, info)
        } else {
            self.insert_non_cullable(id, info)
        };

        self.owners[id.0 as usize] = Some(LightOwner {
            entity_id: info.entity_id,
            light_index,
            kind,
            is_enabled: false,
            needs_transform: true,
        });

        let light = Light {
            id,
            light_set_key: self.key,
        };
        if info.is_enabled {
            self.enable(light, true);
        }
        light
    }

    /// Removes a light.
    ///
    /// # Panics
    ///
    /// Panics if `light` is not a live light of this set.
    pub fn remove(&mut self, light: Light) {
        self.enable(light, false);

        let owner = *self.owner(light);
        let index = owner.light_index as usize;
        if owner.kind.is_cullable() {
            self.cullable_owners[index] = None;
        } else {
            self.non_cullable_owners[index] = None;
        }

        self.owners[light.id.0 as usize] = None;
        self.free_owner_ids.push(light.id);
    }

    /// Enables or disables a light.
    ///
    /// Directional lights only flip their flag. Cullable lights are swapped
    /// across the enabled boundary; both swapped slots are marked dirty.
    ///
    /// # Panics
    ///
    /// Panics if `light` is not a live light of this set.
    pub fn enable(&mut self, light: Light, is_enabled: bool) {
        let owner = *self.owner(light);
        if owner.is_enabled == is_enabled {
            return;
        }

        if owner.kind.is_cullable() {
            let index = owner.light_index;
            if is_enabled {
                debug_assert!(index >= self.enabled_count);
                let boundary = self.enabled_count;
                if index != boundary {
                    self.swap_cullable(index as usize, boundary as usize);
                }
                self.enabled_count += 1;
                self.mark_dirty(boundary as usize);
            } else {
                debug_assert!(index < self.enabled_count);
                let last = self.enabled_count - 1;
                if index != last {
                    self.swap_cullable(index as usize, last as usize);
                }
                self.enabled_count -= 1;
            }
        }

        let owner = self.owner_mut(light);
        owner.is_enabled = is_enabled;
        if is_enabled {
            owner.needs_transform = true;
        }
    }

    /// Pulls world transforms of the enabled lights from `transforms`.
    ///
    /// Directional lights refresh their direction on every call. Cullable
    /// lights are only refreshed (and marked dirty) when their entity moved,
    /// or when they were added or enabled since the last update.
    pub fn update_transforms(&mut self, transforms: &dyn TransformSource) {
        for index in 0..self.non_cullable_owners.len() {
            let Some(id) = self.non_cullable_owners[index] else {
                continue;
            };
            let Some(owner) = self.owners[id.0 as usize].as_mut() else {
                continue;
            };
            if !owner.is_enabled {
                continue;
            }
            owner.needs_transform = false;
            self.non_cullable_lights[index].direction =
                transforms.orientation(owner.entity_id).to_array();
        }

        let enabled = self.enabled_count as usize;
        if enabled == 0 {
            return;
        }

        transforms.updated_transform_flags(
            &self.cullable_entity_ids[..enabled],
            &mut self.transform_flags,
        );

        for index in 0..enabled {
            let Some(id) = self.cullable_owners[index] else {
                continue;
            };
            let Some(owner) = self.owners[id.0 as usize].as_mut() else {
                continue;
            };
            if !self.transform_flags.is_set(index) && !owner.needs_transform {
                continue;
            }
            owner.needs_transform = false;

            let entity = self.cullable_entity_ids[index];
            let position = transforms.position(entity);
            let direction = transforms.orientation(entity);

            let params = &mut self.cullable_lights[index];
            params.position = position.to_array();
            params.direction = direction.to_array();
            let info = &mut self.culling_infos[index];
            info.position = position.to_array();
            info.direction = direction.to_array();

            self.refresh_bounding_sphere(index);
            self.mark_dirty(index);
        }
    }

    /// Number of enabled directional lights.
    pub fn non_cullable_light_count(&self) -> u32 {
        self.non_cullable_owners
            .iter()
            .flatten()
            .filter(|id| {
                self.owners[id.0 as usize]
                    .as_ref()
                    .is_some_and(|owner| owner.is_enabled)
            })
            .count() as u32
    }

    /// Number of enabled point and spot lights.
    #[inline]
    pub fn cullable_light_count(&self) -> u32 {
        self.enabled_count
    }

    /// Returns `true` when the set holds no live light.
    pub fn is_empty(&self) -> bool {
        self.owners.iter().all(Option::is_none)
    }

    /// Number of live lights, enabled or not.
    pub fn len(&self) -> usize {
        self.owners.iter().flatten().count()
    }

    /// Returns `true` if `light` refers to a live light of this set.
    pub fn contains(&self, light: Light) -> bool {
        light.light_set_key == self.key
            && self
                .owners
                .get(light.id.0 as usize)
                .is_some_and(Option::is_some)
    }

    /// The owner record of a live light.
    ///
    /// # Panics
    ///
    /// Panics if `light` is not a live light of this set.
    pub fn owner(&self, light: Light) -> &LightOwner {
        assert_eq!(light.light_set_key, self.key, "light belongs to another set");
        self.owners
            .get(light.id.0 as usize)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("unknown light id {:?}", light.id))
    }

    // --- Parameter getters ---

    /// Whether the light is enabled.
    pub fn is_enabled(&self, light: Light) -> bool {
        self.owner(light).is_enabled
    }

    /// The light's type.
    pub fn light_type(&self, light: Light) -> LightKind {
        self.owner(light).kind
    }

    /// The entity placing the light.
    pub fn entity_id(&self, light: Light) -> EntityId {
        self.owner(light).entity_id
    }

    /// The light's intensity.
    pub fn intensity(&self, light: Light) -> f32 {
        let owner = *self.owner(light);
        if owner.kind.is_cullable() {
            self.cullable_lights[owner.light_index as usize].intensity
        } else {
            self.non_cullable_lights[owner.light_index as usize].intensity
        }
    }

    /// The light's linear color (alpha is always 1).
    pub fn color(&self, light: Light) -> LinearRgba {
        let owner = *self.owner(light);
        let [r, g, b] = if owner.kind.is_cullable() {
            self.cullable_lights[owner.light_index as usize].color
        } else {
            self.non_cullable_lights[owner.light_index as usize].color
        };
        LinearRgba::rgb(r, g, b)
    }

    /// The attenuation coefficients of a point or spot light.
    pub fn attenuation(&self, light: Light) -> Vec3 {
        Vec3::from_array(self.cullable_parameters(light).attenuation)
    }

    /// The range of a point or spot light.
    pub fn range(&self, light: Light) -> f32 {
        self.cullable_parameters(light).range
    }

    /// The umbra (full angle, radians) of a spot light.
    pub fn umbra(&self, light: Light) -> f32 {
        2.0 * self.spot_parameters(light).cos_umbra.acos()
    }

    /// The penumbra (full angle, radians) of a spot light.
    pub fn penumbra(&self, light: Light) -> f32 {
        2.0 * self.spot_parameters(light).cos_penumbra.acos()
    }

    /// The packed shading parameters of a point or spot light.
    pub fn cullable_parameters(&self, light: Light) -> &GpuLightParameters {
        let owner = self.owner(light);
        assert!(
            owner.kind.is_cullable(),
            "directional lights have no range or attenuation"
        );
        &self.cullable_lights[owner.light_index as usize]
    }

    // --- Parameter setters ---

    /// Sets the light's intensity.
    pub fn set_intensity(&mut self, light: Light, intensity: f32) {
        let owner = *self.owner(light);
        let index = owner.light_index as usize;
        if owner.kind.is_cullable() {
            self.cullable_lights[index].intensity = intensity;
            self.mark_dirty(index);
        } else {
            self.non_cullable_lights[index].intensity = intensity;
        }
    }

    /// Sets the light's color. Alpha is ignored.
    pub fn set_color(&mut self, light: Light, color: LinearRgba) {
        let owner = *self.owner(light);
        let index = owner.light_index as usize;
        if owner.kind.is_cullable() {
            self.cullable_lights[index].color = color.to_rgb_array();
            self.mark_dirty(index);
        } else {
            self.non_cullable_lights[index].color = color.to_rgb_array();
        }
    }

    /// Sets the attenuation coefficients of a point or spot light.
    pub fn set_attenuation(&mut self, light: Light, attenuation: Vec3) {
        let index = self.cullable_index(light);
        self.cullable_lights[index].attenuation = attenuation.to_array();
        self.mark_dirty(index);
    }

    /// Sets the range of a point or spot light.
    pub fn set_range(&mut self, light: Light, range: f32) {
        assert!(range > 0.0, "light range must be positive");
        let index = self.cullable_index(light);
        self.cullable_lights[index].range = range;
        self.culling_infos[index].range = range;
        self.refresh_bounding_sphere(index);
        self.mark_dirty(index);
    }

    /// Sets the umbra (full angle, radians) of a spot light.
    ///
    /// The bound is checked on the stored cosines with a few ulps of slack, so
    /// an angle read back from [`LightSet::penumbra`] is accepted.
    pub fn set_umbra(&mut self, light: Light, umbra: f32) {
        let cos_umbra = (umbra * 0.5).cos();
        assert!(
            umbra > 0.0
                && cos_umbra + CONE_COS_TOLERANCE >= self.spot_parameters(light).cos_penumbra,
            "umbra must be in (0, penumbra]"
        );
        let index = self.cullable_index(light);
        self.cullable_lights[index].cos_umbra = cos_umbra;
        self.mark_dirty(index);
    }

    /// Sets the penumbra (full angle, radians) of a spot light.
    pub fn set_penumbra(&mut self, light: Light, penumbra: f32) {
        let cos_penumbra = (penumbra * 0.5).cos();
        assert!(
            cos_penumbra <= self.spot_parameters(light).cos_umbra + CONE_COS_TOLERANCE
                && penumbra < std::f32::consts::PI,
            "penumbra must be in [umbra, PI)"
        );
        let index = self.cullable_index(light);
        self.cullable_lights[index].cos_penumbra = cos_penumbra;
        self.culling_infos[index].cos_penumbra = cos_penumbra;
        self.refresh_bounding_sphere(index);
        self.mark_dirty(index);
    }

    // --- Views for the GPU mirror ---

    /// The directional light array, including disabled and freed slots.
    pub fn non_cullable_lights(&self) -> &[GpuDirectionalLight] {
        &self.non_cullable_lights
    }

    /// The enabled directional lights, in slot order.
    pub fn enabled_non_cullable_lights(&self) -> impl Iterator<Item = &GpuDirectionalLight> + '_ {
        self.non_cullable_owners
            .iter()
            .zip(&self.non_cullable_lights)
            .filter_map(|(id, light)| {
                let owner = self.owners[id.as_ref()?.0 as usize].as_ref()?;
                owner.is_enabled.then_some(light)
            })
    }

    /// Shading parameters of the enabled cullable lights.
    pub fn cullable_lights(&self) -> &[GpuLightParameters] {
        &self.cullable_lights[..self.enabled_count as usize]
    }

    /// Culling info of the enabled cullable lights.
    pub fn culling_infos(&self) -> &[GpuCullingInfo] {
        &self.culling_infos[..self.enabled_count as usize]
    }

    /// Bounding spheres of the enabled cullable lights.
    pub fn bounding_spheres(&self) -> &[GpuSphere] {
        &self.bounding_spheres[..self.enabled_count as usize]
    }

    /// Owner of every cullable slot (enabled, disabled and freed), in slot order.
    pub fn cullable_owners(&self) -> &[Option<LightId>] {
        &self.cullable_owners
    }

    /// Returns `true` if any light may differ from the GPU copy of `frame_index`.
    #[inline]
    pub fn is_dirty(&self, frame_index: usize) -> bool {
        self.something_is_dirty.is_set(frame_index)
    }

    /// Slots in the enabled region that are dirty for `frame_index`.
    pub fn dirty_light_indices(&self, frame_index: usize) -> impl Iterator<Item = usize> + '_ {
        self.dirty_bits[..self.enabled_count as usize]
            .iter()
            .enumerate()
            .filter_map(move |(index, bits)| bits.is_set(frame_index).then_some(index))
    }

    /// Marks slot `index` as copied to the GPU buffer of `frame_index`.
    #[inline]
    pub fn clear_dirty(&mut self, index: usize, frame_index: usize) {
        self.dirty_bits[index].clear(frame_index);
    }

    /// Marks every enabled slot as copied to the GPU buffer of `frame_index`.
    pub fn clear_all_dirty(&mut self, frame_index: usize) {
        for bits in &mut self.dirty_bits[..self.enabled_count as usize] {
            bits.clear(frame_index);
        }
    }

    /// Clears the global dirty flag of `frame_index`.
    #[inline]
    pub fn clear_frame_dirty(&mut self, frame_index: usize) {
        self.something_is_dirty.clear(frame_index);
    }

    // --- Internals ---

    fn owner_mut(&mut self, light: Light) -> &mut LightOwner {
        assert_eq!(light.light_set_key, self.key, "light belongs to another set");
        self.owners
            .get_mut(light.id.0 as usize)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("unknown light id {:?}", light.id))
    }

    fn cullable_index(&self, light: Light) -> usize {
        let owner = self.owner(light);
        assert!(
            owner.kind.is_cullable(),
            "directional lights have no range or attenuation"
        );
        owner.light_index as usize
    }

    fn spot_parameters(&self, light: Light) -> &GpuLightParameters {
        assert_eq!(
            self.owner(light).kind,
            LightKind::Spot,
            "only spot lights have cone angles"
        );
        self.cullable_parameters(light)
    }

    fn allocate_owner_id(&mut self) -> LightId {
        if let Some(id) = self.free_owner_ids.pop() {
            return id;
        }
        let id = LightId(self.owners.len() as u32);
        self.owners.push(None);
        id
    }

    fn insert_non_cullable(&mut self, id: LightId, info: &LightInitInfo) -> u32 {
        let light = GpuDirectionalLight::new(Vec3::new(0.0, 0.0, -1.0), info.intensity, info.color);

        if let Some(index) = self.non_cullable_owners.iter().position(Option::is_none) {
            self.non_cullable_lights[index] = light;
            self.non_cullable_owners[index] = Some(id);
            return index as u32;
        }

        self.non_cullable_lights.push(light);
        self.non_cullable_owners.push(Some(id));
        (self.non_cullable_lights.len() - 1) as u32
    }

    fn insert_cullable(&mut self, id: LightId, info: &LightInitInfo) -> u32 {
        let (params, culling_info, sphere) = initial_cullable_entries(info);

        let start = self.enabled_count as usize;
        if let Some(offset) = self.cullable_owners[start..]
            .iter()
            .position(Option::is_none)
        {
            let index = start + offset;
            self.cullable_lights[index] = params;
            self.culling_infos[index] = culling_info;
            self.bounding_spheres[index] = sphere;
            self.cullable_entity_ids[index] = info.entity_id;
            self.cullable_owners[index] = Some(id);
            self.dirty_bits[index] = DirtyBits::CLEAN;
            return index as u32;
        }

        self.cullable_lights.push(params);
        self.culling_infos.push(culling_info);
        self.bounding_spheres.push(sphere);
        self.cullable_entity_ids.push(info.entity_id);
        self.cullable_owners.push(Some(id));
        self.dirty_bits.push(DirtyBits::CLEAN);
        (self.cullable_lights.len() - 1) as u32
    }

    fn swap_cullable(&mut self, a: usize, b: usize) {
        self.cullable_lights.swap(a, b);
        self.culling_infos.swap(a, b);
        self.bounding_spheres.swap(a, b);
        self.cullable_entity_ids.swap(a, b);
        self.cullable_owners.swap(a, b);
        self.dirty_bits.swap(a, b);

        for index in [a, b] {
            if let Some(id) = self.cullable_owners[index] {
                if let Some(owner) = self.owners[id.0 as usize].as_mut() {
                    owner.light_index = index as u32;
                }
            }
            self.mark_dirty(index);
        }
    }

    fn refresh_bounding_sphere(&mut self, index: usize) {
        self.bounding_spheres[index] = bounding_sphere(&self.culling_infos[index]).into();
    }

    fn mark_dirty(&mut self, index: usize) {
        self.dirty_bits[index].mark_all();
        self.something_is_dirty.mark_all();
    }
}

/// The bounding sphere of a point light (`cos_penumbra == -1`) or of a spot light's cone.
fn bounding_sphere(info: &GpuCullingInfo) -> Sphere {
    let position = Vec3::from_array(info.position);
    if info.cos_penumbra < 0.0 {
        Sphere::new(position, info.range)
    } else {
        Sphere::from_cone(
            position,
            Vec3::from_array(info.direction),
            info.range,
            info.cos_penumbra,
        )
    }
}

/// The cullable array entries of a new light, before any transform is applied.
pub(crate) fn initial_cullable_entries(
    info: &LightInitInfo,
) -> (GpuLightParameters, GpuCullingInfo, GpuSphere) {
    let direction = [0.0, 0.0, -1.0];
    let (attenuation, range, cos_umbra, cos_penumbra) = match info.light_type {
        LightType::Point(point) => (point.attenuation, point.range, -1.0, -1.0),
        LightType::Spot(spot) => (
            spot.attenuation,
            spot.range,
            spot.cos_half_umbra(),
            spot.cos_half_penumbra(),
        ),
        LightType::Directional => unreachable!("directional lights are not cullable"),
    };

    let params = GpuLightParameters {
        position: [0.0; 3],
        intensity: info.intensity,
        direction,
        light_type: info.light_type.kind() as u32,
        color: info.color.to_rgb_array(),
        range,
        attenuation: attenuation.to_array(),
        cos_umbra,
        cos_penumbra,
        _padding: [0.0; 3],
    };
    let culling_info = GpuCullingInfo {
        position: [0.0; 3],
        range,
        direction,
        cos_penumbra,
    };
    let sphere = bounding_sphere(&culling_info).into();
    (params, culling_info, sphere)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lumen_core::math::degrees_to_radians;
    use lumen_core::renderer::{PointLight, SpotLight, MAX_FRAMES_IN_FLIGHT};
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};

    const KEY: LightSetKey = LightSetKey(7);

    #[derive(Default)]
    struct MockTransforms {
        positions: HashMap<EntityId, Vec3>,
        moved: RefCell<HashSet<EntityId>>,
    }

    impl MockTransforms {
        fn place(&mut self, entity: EntityId, position: Vec3) {
            self.positions.insert(entity, position);
            self.moved.borrow_mut().insert(entity);
        }
    }

    impl TransformSource for MockTransforms {
        fn position(&self, entity: EntityId) -> Vec3 {
            self.positions.get(&entity).copied().unwrap_or(Vec3::ZERO)
        }

        fn orientation(&self, _entity: EntityId) -> Vec3 {
            -Vec3::Y
        }

        fn updated_transform_flags(&self, entities: &[EntityId], flags: &mut ChangeBitset) {
            flags.reset(entities.len());
            let mut moved = self.moved.borrow_mut();
            for (i, entity) in entities.iter().enumerate() {
                if moved.remove(entity) {
                    flags.set(i);
                }
            }
        }
    }

    fn point(entity: u32, is_enabled: bool) -> LightInitInfo {
        LightInitInfo {
            light_set_key: KEY,
            entity_id: EntityId::new(entity),
            light_type: LightType::Point(PointLight::default()),
            intensity: 2.0,
            color: LinearRgba::rgb(1.0, 0.5, 0.25),
            is_enabled,
        }
    }

    fn spot(entity: u32) -> LightInitInfo {
        LightInitInfo {
            light_type: LightType::Spot(SpotLight::default()),
            ..point(entity, true)
        }
    }

    fn directional(entity: u32, is_enabled: bool) -> LightInitInfo {
        LightInitInfo {
            light_type: LightType::Directional,
            ..point(entity, is_enabled)
        }
    }

    fn assert_packed(set: &LightSet) {
        for (index, id) in set.cullable_owners().iter().enumerate() {
            let enabled = id.is_some_and(|id| {
                let light = Light {
                    id,
                    light_set_key: KEY,
                };
                assert_eq!(set.owner(light).light_index as usize, index);
                set.is_enabled(light)
            });
            assert_eq!(enabled, index < set.cullable_light_count() as usize);
        }
    }

    #[test]
    fn test_enable_and_disable_follow_the_boundary() {
        let mut set = LightSet::new(KEY);
        let a = set.add(&point(1, true));
        let b = set.add(&point(2, true));
        let c = set.add(&point(3, false));
        assert_eq!(set.cullable_light_count(), 2);
        assert_packed(&set);

        // C already sits at the boundary: no swap.
        assert_eq!(set.owner(c).light_index, 2);
        set.enable(c, true);
        assert_eq!(set.cullable_light_count(), 3);
        assert_eq!(set.owner(c).light_index, 2);

        // A swaps with the last enabled light (C).
        set.enable(a, false);
        assert_eq!(set.cullable_light_count(), 2);
        assert_eq!(set.owner(a).light_index, 2);
        assert_eq!(set.owner(c).light_index, 0);
        assert_eq!(set.owner(b).light_index, 1);
        assert_packed(&set);
    }

    #[test]
    fn test_remove_reuses_disabled_slot() {
        let mut set = LightSet::new(KEY);
        let a = set.add(&point(1, true));
        let _b = set.add(&point(2, true));
        set.remove(a);
        assert_eq!(set.cullable_light_count(), 1);
        assert_eq!(set.cullable_owners().len(), 2);
        assert!(!set.contains(a));

        let c = set.add(&point(3, true));
        assert_eq!(set.cullable_owners().len(), 2);
        // The freed owner id is recycled.
        assert_eq!(c.id, a.id);
        assert_eq!(set.cullable_light_count(), 2);
        assert_packed(&set);
    }

    #[test]
    fn test_directional_lights_reuse_freed_slots() {
        let mut set = LightSet::new(KEY);
        let sun = set.add(&directional(1, true));
        let moon = set.add(&directional(2, false));
        assert_eq!(set.non_cullable_light_count(), 1);
        assert_eq!(set.cullable_light_count(), 0);

        set.remove(sun);
        let lamp = set.add(&directional(3, true));
        assert_eq!(set.owner(lamp).light_index, 0);
        assert_eq!(set.non_cullable_lights().len(), 2);

        set.enable(moon, true);
        assert_eq!(set.non_cullable_light_count(), 2);
        assert_eq!(set.enabled_non_cullable_lights().count(), 2);
    }

    #[test]
    fn test_added_parameters_are_preserved() {
        let mut set = LightSet::new(KEY);
        let info = spot(4);
        let light = set.add(&info);

        let (expected, expected_info, expected_sphere) = initial_cullable_entries(&info);
        let index = set.owner(light).light_index as usize;
        assert_eq!(
            bytemuck::bytes_of(&set.cullable_lights()[index]),
            bytemuck::bytes_of(&expected)
        );
        assert_eq!(set.culling_infos()[index], expected_info);
        assert_eq!(set.bounding_spheres()[index], expected_sphere);

        assert_relative_eq!(set.intensity(light), 2.0);
        assert_eq!(set.color(light), LinearRgba::rgb(1.0, 0.5, 0.25));
        assert_relative_eq!(set.umbra(light), degrees_to_radians(40.0), epsilon = 1e-4);
        assert_relative_eq!(set.penumbra(light), degrees_to_radians(70.0), epsilon = 1e-4);
        assert_eq!(set.light_type(light), LightKind::Spot);
        assert_eq!(set.entity_id(light), EntityId::new(4));
    }

    #[test]
    fn test_update_transforms_only_touches_moved_lights() {
        let mut transforms = MockTransforms::default();
        let mut set = LightSet::new(KEY);
        let a = set.add(&point(1, true));
        let b = set.add(&point(2, true));

        transforms.place(EntityId::new(1), Vec3::new(1.0, 2.0, 3.0));
        set.update_transforms(&transforms);
        assert_eq!(set.cullable_lights()[0].position, [1.0, 2.0, 3.0]);

        for frame in 0..MAX_FRAMES_IN_FLIGHT {
            set.clear_all_dirty(frame);
            set.clear_frame_dirty(frame);
        }

        transforms.place(EntityId::new(2), Vec3::new(-4.0, 0.0, 0.0));
        set.update_transforms(&transforms);
        let index_b = set.owner(b).light_index as usize;
        assert_eq!(set.dirty_light_indices(0).collect::<Vec<_>>(), vec![index_b]);
        assert_eq!(set.cullable_lights()[index_b].position, [-4.0, 0.0, 0.0]);
        assert_eq!(set.bounding_spheres()[index_b].center, [-4.0, 0.0, 0.0]);
        assert_eq!(set.owner(a).light_index, 0);
    }

    #[test]
    fn test_enabled_light_pulls_transform_on_next_update() {
        let mut transforms = MockTransforms::default();
        let mut set = LightSet::new(KEY);
        let light = set.add(&point(1, false));
        transforms.place(EntityId::new(1), Vec3::new(5.0, 0.0, 0.0));

        // Disabled lights are skipped.
        set.update_transforms(&transforms);
        transforms.moved.borrow_mut().clear();

        set.enable(light, true);
        set.update_transforms(&transforms);
        assert_eq!(set.cullable_lights()[0].position, [5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_setters_mark_light_dirty() {
        let mut set = LightSet::new(KEY);
        let light = set.add(&spot(1));
        for frame in 0..MAX_FRAMES_IN_FLIGHT {
            set.clear_all_dirty(frame);
            set.clear_frame_dirty(frame);
        }
        assert!(!set.is_dirty(0));

        set.set_range(light, 30.0);
        assert!(set.is_dirty(0) && set.is_dirty(1));
        assert_eq!(set.dirty_light_indices(1).count(), 1);
        assert_relative_eq!(set.range(light), 30.0);
        assert_relative_eq!(set.culling_infos()[0].range, 30.0);

        let old_radius = set.bounding_spheres()[0].radius;
        set.set_penumbra(light, degrees_to_radians(120.0));
        assert!(set.bounding_spheres()[0].radius > old_radius);

        set.set_attenuation(light, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(set.attenuation(light), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_equal_cone_angles_accept_each_other() {
        let mut set = LightSet::new(KEY);
        for step in 1..300 {
            let angle = step as f32 * 0.01;
            let light = set.add(&LightInitInfo {
                light_type: LightType::Spot(SpotLight {
                    umbra: angle,
                    penumbra: angle,
                    ..Default::default()
                }),
                ..point(step, true)
            });
            set.set_umbra(light, angle);
            set.set_penumbra(light, angle);
            set.set_umbra(light, set.penumbra(light));
            set.set_penumbra(light, set.umbra(light));
            set.remove(light);
        }
    }

    #[test]
    #[should_panic(expected = "umbra must be in (0, penumbra]")]
    fn test_umbra_wider_than_penumbra_panics() {
        let mut set = LightSet::new(KEY);
        let light = set.add(&spot(1));
        set.set_umbra(light, degrees_to_radians(90.0));
    }

    #[test]
    #[should_panic(expected = "directional lights have no range")]
    fn test_range_on_directional_light_panics() {
        let mut set = LightSet::new(KEY);
        let sun = set.add(&directional(1, true));
        set.set_range(sun, 10.0);
    }

    #[test]
    #[should_panic(expected = "unknown light id")]
    fn test_double_remove_panics() {
        let mut set = LightSet::new(KEY);
        let light = set.add(&point(1, true));
        set.remove(light);
        set.remove(light);
    }
}
