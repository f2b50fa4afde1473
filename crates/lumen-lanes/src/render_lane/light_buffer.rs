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

//! GPU mirror of a light set for one frame in flight.
//!
//! Each frame slot owns its own [`LightBuffer`], so the CPU can write slot `F`
//! as soon as the frame pacing confirms the GPU retired its previous use of
//! `F`. Within a slot, the per-light dirty bits of the [`LightSet`] decide what
//! has to be copied:
//!
//! ```text
//! resized or light set changed  -> full copy of the enabled region
//! some lights dirty for slot F  -> one indexed copy per dirty light
//! nothing dirty                 -> no copy
//! ```

use std::mem::size_of;

use lumen_core::renderer::{
    BufferDescriptor, BufferId, GpuCullingInfo, GpuDirectionalLight, GpuLightParameters,
    GpuSphere, GraphicsDevice, LightSetKey, RenderError, ResourceError,
};
use lumen_data::lighting::LightSet;

/// What an [`LightBuffer::update_light_buffer`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightBufferUpdate {
    /// The cullable buffers were reallocated.
    pub resized: bool,
    /// The whole enabled region was copied.
    pub full_copy: bool,
    /// Number of cullable lights copied.
    pub copied_lights: u32,
}

/// A growable CPU-writable GPU buffer holding `capacity` elements of `T`.
#[derive(Debug)]
struct GpuArray {
    buffer: BufferId,
    capacity: u32,
    element_size: u64,
    label: &'static str,
}

impl GpuArray {
    fn new<T>(
        device: &dyn GraphicsDevice,
        label: &'static str,
        capacity: u32,
    ) -> Result<Self, ResourceError> {
        let element_size = size_of::<T>() as u64;
        let capacity = capacity.max(1);
        let buffer = device.create_buffer(&BufferDescriptor::upload(
            label,
            capacity as u64 * element_size,
        ))?;
        Ok(Self {
            buffer,
            capacity,
            element_size,
            label,
        })
    }

    /// Grows the buffer to hold at least `needed` elements with 50% slack.
    /// Returns `true` if the buffer was reallocated.
    fn reserve(&mut self, device: &dyn GraphicsDevice, needed: u32) -> Result<bool, ResourceError> {
        if needed <= self.capacity {
            return Ok(false);
        }

        let capacity = ((needed as u64 * 3) >> 1).max(needed as u64) as u32;
        let buffer = device.create_buffer(&BufferDescriptor::upload(
            self.label,
            capacity as u64 * self.element_size,
        ))?;
        device.destroy_buffer(self.buffer)?;

        log::debug!(
            "Light buffer '{}' grown from {} to {} entries",
            self.label,
            self.capacity,
            capacity
        );
        self.buffer = buffer;
        self.capacity = capacity;
        Ok(true)
    }

    fn write<T: bytemuck::Pod>(
        &self,
        device: &dyn GraphicsDevice,
        first: usize,
        data: &[T],
    ) -> Result<(), ResourceError> {
        device.write_buffer(
            self.buffer,
            first as u64 * self.element_size,
            bytemuck::cast_slice(data),
        )
    }

    fn destroy(&self, device: &dyn GraphicsDevice) {
        if let Err(e) = device.destroy_buffer(self.buffer) {
            log::warn!("Failed to retire light buffer '{}': {}", self.label, e);
        }
    }
}

/// The GPU copy of one light set for one frame in flight.
#[derive(Debug)]
pub struct LightBuffer {
    non_cullable_lights: GpuArray,
    cullable_lights: GpuArray,
    culling_infos: GpuArray,
    bounding_spheres: GpuArray,
    current_light_set_key: Option<LightSetKey>,
    // Enabled cullable lights in the buffers after the last update.
    mirrored_cullable_count: u32,
    staging: Vec<GpuDirectionalLight>,
}

impl LightBuffer {
    /// Allocates the four light buffers with the given initial capacities.
    pub fn new(
        device: &dyn GraphicsDevice,
        initial_cullable_capacity: u32,
        initial_non_cullable_capacity: u32,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            non_cullable_lights: GpuArray::new::<GpuDirectionalLight>(
                device,
                "non_cullable_lights",
                initial_non_cullable_capacity,
            )?,
            cullable_lights: GpuArray::new::<GpuLightParameters>(
                device,
                "cullable_lights",
                initial_cullable_capacity,
            )?,
            culling_infos: GpuArray::new::<GpuCullingInfo>(
                device,
                "culling_infos",
                initial_cullable_capacity,
            )?,
            bounding_spheres: GpuArray::new::<GpuSphere>(
                device,
                "bounding_spheres",
                initial_cullable_capacity,
            )?,
            current_light_set_key: None,
            mirrored_cullable_count: 0,
            staging: Vec::with_capacity(initial_non_cullable_capacity as usize),
        })
    }

    /// Copies what changed in `light_set` since this frame slot was last updated.
    ///
    /// Directional lights are always rewritten in full. Cullable lights are
    /// copied in full when the buffers were reallocated or the light set
    /// differs from the one mirrored last time, otherwise only the lights
    /// dirty for `frame_index` are copied. The copied dirty bits of
    /// `frame_index` are cleared.
    pub fn update_light_buffer(
        &mut self,
        device: &dyn GraphicsDevice,
        light_set: &mut LightSet,
        frame_index: usize,
    ) -> Result<LightBufferUpdate, RenderError> {
        let mut update = LightBufferUpdate::default();

        let non_cullable_count = light_set.non_cullable_light_count();
        if non_cullable_count > 0 {
            self.non_cullable_lights.reserve(device, non_cullable_count)?;
            self.staging.clear();
            self.staging
                .extend(light_set.enabled_non_cullable_lights().copied());
            self.non_cullable_lights.write(device, 0, &self.staging)?;
        }

        let cullable_count = light_set.cullable_light_count();
        if cullable_count > 0 {
            update.resized = self.reserve_cullable(device, cullable_count)?;
            let key_changed = self.current_light_set_key != Some(light_set.key());

            if update.resized || key_changed {
                self.cullable_lights
                    .write(device, 0, light_set.cullable_lights())?;
                self.culling_infos
                    .write(device, 0, light_set.culling_infos())?;
                self.bounding_spheres
                    .write(device, 0, light_set.bounding_spheres())?;
                light_set.clear_all_dirty(frame_index);
                update.full_copy = true;
                update.copied_lights = cullable_count;
            } else if light_set.is_dirty(frame_index) {
                let dirty: Vec<usize> = light_set.dirty_light_indices(frame_index).collect();
                for &index in &dirty {
                    let range = index..index + 1;
                    self.cullable_lights
                        .write(device, index, &light_set.cullable_lights()[range.clone()])?;
                    self.culling_infos
                        .write(device, index, &light_set.culling_infos()[range.clone()])?;
                    self.bounding_spheres
                        .write(device, index, &light_set.bounding_spheres()[range])?;
                    light_set.clear_dirty(index, frame_index);
                }
                update.copied_lights = dirty.len() as u32;
            }
        }

        light_set.clear_frame_dirty(frame_index);
        self.current_light_set_key = Some(light_set.key());
        self.mirrored_cullable_count = cullable_count;

        log::trace!(
            "Light buffer [frame {frame_index}]: {} cullable light(s) copied (full: {})",
            update.copied_lights,
            update.full_copy
        );
        Ok(update)
    }

    fn reserve_cullable(
        &mut self,
        device: &dyn GraphicsDevice,
        needed: u32,
    ) -> Result<bool, ResourceError> {
        let resized = self.cullable_lights.reserve(device, needed)?;
        self.culling_infos.reserve(device, needed)?;
        self.bounding_spheres.reserve(device, needed)?;
        Ok(resized)
    }

    /// The directional light buffer.
    pub fn non_cullable_lights(&self) -> BufferId {
        self.non_cullable_lights.buffer
    }

    /// The point/spot shading parameter buffer.
    pub fn cullable_lights(&self) -> BufferId {
        self.cullable_lights.buffer
    }

    /// The culling info buffer.
    pub fn culling_infos(&self) -> BufferId {
        self.culling_infos.buffer
    }

    /// The bounding sphere buffer.
    pub fn bounding_spheres(&self) -> BufferId {
        self.bounding_spheres.buffer
    }

    /// Number of cullable lights the buffers can hold without reallocation.
    pub fn cullable_capacity(&self) -> u32 {
        self.cullable_lights.capacity
    }

    /// The light set mirrored by the last update.
    pub fn current_light_set_key(&self) -> Option<LightSetKey> {
        self.current_light_set_key
    }

    /// Number of enabled cullable lights the buffers held after the last update.
    ///
    /// Lights added or enabled since then are not in the buffers yet.
    pub fn cullable_light_count(&self) -> u32 {
        self.mirrored_cullable_count
    }

    /// Retires every buffer.
    pub fn destroy(self, device: &dyn GraphicsDevice) {
        self.non_cullable_lights.destroy(device);
        self.cullable_lights.destroy(device);
        self.culling_infos.destroy(device);
        self.bounding_spheres.destroy(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_lane::test_support::MockGraphicsDevice;
    use lumen_core::ecs::EntityId;
    use lumen_core::math::LinearRgba;
    use lumen_core::renderer::{Light, LightInitInfo, LightType, PointLight};

    const KEY: LightSetKey = LightSetKey(1);

    fn point(set: LightSetKey, entity: u32) -> LightInitInfo {
        LightInitInfo {
            light_set_key: set,
            entity_id: EntityId::new(entity),
            light_type: LightType::Point(PointLight::default()),
            intensity: 1.0,
            color: LinearRgba::WHITE,
            is_enabled: true,
        }
    }

    fn set_with_lights(key: LightSetKey, count: u32) -> (LightSet, Vec<Light>) {
        let mut set = LightSet::new(key);
        let lights = (0..count).map(|i| set.add(&point(key, i))).collect();
        (set, lights)
    }

    #[test]
    fn test_first_update_copies_everything() {
        let device = MockGraphicsDevice::new();
        let mut buffer = LightBuffer::new(&device, 16, 1).unwrap();
        let (mut set, _) = set_with_lights(KEY, 5);

        let update = buffer.update_light_buffer(&device, &mut set, 0).unwrap();
        assert!(update.full_copy);
        assert!(!update.resized);
        assert_eq!(update.copied_lights, 5);
        // One write per cullable array.
        assert_eq!(device.take_writes().len(), 3);
        assert_eq!(buffer.current_light_set_key(), Some(KEY));
        assert_eq!(buffer.cullable_light_count(), 5);
    }

    #[test]
    fn test_mirrored_count_ignores_later_changes() {
        let device = MockGraphicsDevice::new();
        let mut buffer = LightBuffer::new(&device, 16, 1).unwrap();
        let (mut set, lights) = set_with_lights(KEY, 4);
        buffer.update_light_buffer(&device, &mut set, 0).unwrap();

        set.add(&point(KEY, 10));
        set.enable(lights[0], false);
        set.enable(lights[1], false);
        assert_eq!(set.cullable_light_count(), 3);
        assert_eq!(buffer.cullable_light_count(), 4);

        buffer.update_light_buffer(&device, &mut set, 0).unwrap();
        assert_eq!(buffer.cullable_light_count(), 3);

        for &light in &lights[2..] {
            set.enable(light, false);
        }
        buffer.update_light_buffer(&device, &mut set, 0).unwrap();
        assert_eq!(buffer.cullable_light_count(), 1);
    }

    #[test]
    fn test_second_update_without_changes_copies_nothing() {
        let device = MockGraphicsDevice::new();
        let mut buffer = LightBuffer::new(&device, 16, 1).unwrap();
        let (mut set, _) = set_with_lights(KEY, 5);

        buffer.update_light_buffer(&device, &mut set, 0).unwrap();
        device.take_writes();

        let update = buffer.update_light_buffer(&device, &mut set, 0).unwrap();
        assert_eq!(update, LightBufferUpdate::default());
        assert!(device.take_writes().is_empty());
    }

    #[test]
    fn test_dirty_lights_are_copied_per_frame_slot() {
        let device = MockGraphicsDevice::new();
        let mut frame0 = LightBuffer::new(&device, 16, 1).unwrap();
        let mut frame1 = LightBuffer::new(&device, 16, 1).unwrap();
        let (mut set, lights) = set_with_lights(KEY, 4);
        frame0.update_light_buffer(&device, &mut set, 0).unwrap();
        frame1.update_light_buffer(&device, &mut set, 1).unwrap();
        device.take_writes();

        set.set_intensity(lights[2], 5.0);

        let update = frame0.update_light_buffer(&device, &mut set, 0).unwrap();
        assert!(!update.full_copy);
        assert_eq!(update.copied_lights, 1);
        let writes = device.take_writes();
        assert_eq!(writes.len(), 3);
        let index = set.owner(lights[2]).light_index as u64;
        assert_eq!(writes[0].buffer, frame0.cullable_lights());
        assert_eq!(writes[0].offset, index * size_of::<GpuLightParameters>() as u64);
        assert_eq!(writes[0].len, size_of::<GpuLightParameters>());

        // Frame slot 1 still has to pick the change up.
        let update = frame1.update_light_buffer(&device, &mut set, 1).unwrap();
        assert_eq!(update.copied_lights, 1);
        let update = frame1.update_light_buffer(&device, &mut set, 1).unwrap();
        assert_eq!(update.copied_lights, 0);
    }

    #[test]
    fn test_growth_reallocates_with_slack_and_copies_fully() {
        let device = MockGraphicsDevice::new();
        let mut buffer = LightBuffer::new(&device, 2, 1).unwrap();
        let old = buffer.cullable_lights();
        let (mut set, _) = set_with_lights(KEY, 10);

        let update = buffer.update_light_buffer(&device, &mut set, 0).unwrap();
        assert!(update.resized && update.full_copy);
        assert_eq!(buffer.cullable_capacity(), 15);
        assert_ne!(buffer.cullable_lights(), old);
        assert!(device.destroyed.lock().unwrap().contains(&old));
        assert_eq!(
            device.buffer_size(buffer.cullable_lights()),
            Some(15 * size_of::<GpuLightParameters>() as u64)
        );
    }

    #[test]
    fn test_switching_light_sets_forces_full_copy() {
        let device = MockGraphicsDevice::new();
        let mut buffer = LightBuffer::new(&device, 16, 1).unwrap();
        let (mut first, _) = set_with_lights(KEY, 3);
        let (mut second, _) = set_with_lights(LightSetKey(2), 3);

        buffer.update_light_buffer(&device, &mut first, 0).unwrap();
        buffer.update_light_buffer(&device, &mut second, 0).unwrap();
        // Back to the first set: its dirty bits are clean but the buffer holds the second set.
        let update = buffer.update_light_buffer(&device, &mut first, 0).unwrap();
        assert!(update.full_copy);
        assert_eq!(update.copied_lights, 3);
    }

    #[test]
    fn test_directional_lights_are_rewritten_every_update() {
        let device = MockGraphicsDevice::new();
        let mut buffer = LightBuffer::new(&device, 4, 1).unwrap();
        let mut set = LightSet::new(KEY);
        for entity in 0..3 {
            set.add(&LightInitInfo {
                light_type: LightType::Directional,
                ..point(KEY, entity)
            });
        }

        for _ in 0..2 {
            buffer.update_light_buffer(&device, &mut set, 0).unwrap();
            let writes = device.take_writes();
            assert_eq!(writes.len(), 1);
            assert_eq!(writes[0].buffer, buffer.non_cullable_lights());
            assert_eq!(writes[0].len, 3 * size_of::<GpuDirectionalLight>());
        }
    }
}
