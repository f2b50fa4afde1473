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

//! Defines the LightingAgent, the owner of every light resource.

use lumen_core::ecs::TransformSource;
use lumen_core::renderer::{
    BarrierBatch, CommandEncoder, CullerId, FrameInfo, GraphicsDevice, Light, LightInitInfo,
    LightSetKey, RenderError, ResourceError, MAX_FRAMES_IN_FLIGHT,
};
use lumen_data::lighting::{LightSet, LightSetRegistry};
use lumen_lanes::render_lane::{
    CullingInputs, CullingParameters, CullingReport, LightBuffer, LightBufferUpdate,
    LightCullingLane,
};

use crate::settings::LightingSettings;

/// Owns the light sets, the per-frame light buffers and the tile cullers.
///
/// Nothing in here is shared between threads: the render thread drives the
/// agent, and frame-in-flight overlap is handled by giving every frame slot
/// its own GPU buffers.
#[derive(Debug)]
pub struct LightingAgent {
    settings: LightingSettings,
    registry: LightSetRegistry,
    // One mirror per frame in flight.
    light_buffers: Vec<LightBuffer>,
    lane: LightCullingLane,
    // Indexed by `CullerId`; `None` marks a free slot.
    cullers: Vec<Option<Vec<CullingParameters>>>,
    free_cullers: Vec<CullerId>,
}

impl LightingAgent {
    /// Creates the culling pipelines and the light buffers of every frame slot.
    pub fn new(
        device: &dyn GraphicsDevice,
        settings: LightingSettings,
    ) -> Result<Self, RenderError> {
        settings
            .validate()
            .map_err(|e| RenderError::InvalidConfiguration(e.to_string()))?;

        let lane = LightCullingLane::new(device, settings.max_lights_per_tile)?;
        let light_buffers = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| {
                LightBuffer::new(
                    device,
                    settings.initial_cullable_capacity,
                    settings.initial_non_cullable_capacity,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "LightingAgent initialized ({} frame(s) in flight, {} lights per tile)",
            MAX_FRAMES_IN_FLIGHT,
            settings.max_lights_per_tile
        );
        Ok(Self {
            settings,
            registry: LightSetRegistry::with_initial_capacity(
                settings.initial_cullable_capacity as usize,
                settings.initial_non_cullable_capacity as usize,
            ),
            light_buffers,
            lane,
            cullers: Vec::new(),
            free_cullers: Vec::new(),
        })
    }

    /// The settings the agent was created with.
    pub fn settings(&self) -> &LightingSettings {
        &self.settings
    }

    // --- Light sets ---

    /// Creates an empty light set.
    ///
    /// # Panics
    ///
    /// Panics if `key` is already in use.
    pub fn create_light_set(&mut self, key: LightSetKey) -> &mut LightSet {
        self.registry.create_light_set(key)
    }

    /// Destroys an empty light set.
    ///
    /// # Panics
    ///
    /// Panics if the set is unknown or still holds lights.
    pub fn remove_light_set(&mut self, key: LightSetKey) {
        self.registry.remove_light_set(key);
    }

    /// Returns the light set registered under `key`.
    pub fn light_set(&self, key: LightSetKey) -> Option<&LightSet> {
        self.registry.get(key)
    }

    /// Returns the light set registered under `key`, for parameter edits.
    pub fn light_set_mut(&mut self, key: LightSetKey) -> Option<&mut LightSet> {
        self.registry.get_mut(key)
    }

    fn set_of(&mut self, key: LightSetKey) -> &mut LightSet {
        match self.registry.get_mut(key) {
            Some(set) => set,
            None => panic!("unknown light set {key:?}"),
        }
    }

    // --- Lights ---

    /// Adds a light to the set named by `info.light_set_key`.
    pub fn add_light(&mut self, info: &LightInitInfo) -> Light {
        self.set_of(info.light_set_key).add(info)
    }

    /// Removes a light.
    pub fn remove_light(&mut self, light: Light) {
        self.set_of(light.light_set_key).remove(light);
    }

    /// Enables or disables a light.
    pub fn enable_light(&mut self, light: Light, is_enabled: bool) {
        self.set_of(light.light_set_key).enable(light, is_enabled);
    }

    // --- Per frame ---

    /// Pulls transforms into the frame's light set and mirrors it into the
    /// light buffer of `frame.frame_index`.
    ///
    /// # Panics
    ///
    /// Panics if the frame index is out of range or the light set is unknown.
    pub fn update_light_buffers(
        &mut self,
        device: &dyn GraphicsDevice,
        frame: &FrameInfo,
        transforms: &dyn TransformSource,
    ) -> Result<LightBufferUpdate, RenderError> {
        assert!(
            frame.frame_index < MAX_FRAMES_IN_FLIGHT,
            "frame index {} out of range",
            frame.frame_index
        );
        let light_set = match self.registry.get_mut(frame.light_set_key) {
            Some(set) => set,
            None => panic!("unknown light set {:?}", frame.light_set_key),
        };
        light_set.update_transforms(transforms);
        self.light_buffers[frame.frame_index].update_light_buffer(
            device,
            light_set,
            frame.frame_index,
        )
    }

    /// Records the culling passes of `frame.culler_id` for this frame.
    ///
    /// Culls the lights mirrored by the last [`LightingAgent::update_light_buffers`]
    /// call for this frame slot. The light grid release transition is appended
    /// to `barriers`; apply it before the shading pass.
    ///
    /// # Panics
    ///
    /// Panics if the frame's light buffer does not mirror `frame.light_set_key`.
    pub fn cull_lights(
        &mut self,
        device: &dyn GraphicsDevice,
        encoder: &mut dyn CommandEncoder,
        frame: &FrameInfo,
        barriers: &mut BarrierBatch,
    ) -> Result<CullingReport, RenderError> {
        assert!(
            frame.frame_index < MAX_FRAMES_IN_FLIGHT,
            "frame index {} out of range",
            frame.frame_index
        );
        let buffer = &self.light_buffers[frame.frame_index];
        assert_eq!(
            buffer.current_light_set_key(),
            Some(frame.light_set_key),
            "light buffer of frame {} does not mirror {:?}; call update_light_buffers first",
            frame.frame_index,
            frame.light_set_key
        );
        // Lights added since the last update are culled next frame.
        let inputs = CullingInputs {
            light_count: buffer.cullable_light_count(),
            culling_infos: buffer.culling_infos(),
            bounding_spheres: buffer.bounding_spheres(),
        };
        let params = &mut Self::culler_mut(&mut self.cullers, frame.culler_id)[frame.frame_index];

        let report = self
            .lane
            .cull_lights(device, encoder, params, frame, inputs, barriers)?;
        if !report.culled {
            log::trace!(
                "Culler {:?} skipped: no lights in {:?}",
                frame.culler_id,
                frame.light_set_key
            );
        }
        Ok(report)
    }

    // --- Cullers ---

    /// Creates the culling resources of a render surface, one set per frame in flight.
    pub fn add_culler(
        &mut self,
        device: &dyn GraphicsDevice,
        width: u32,
        height: u32,
    ) -> Result<CullerId, RenderError> {
        let params = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| self.lane.create_parameters(device, width, height))
            .collect::<Result<Vec<_>, _>>()?;

        let id = match self.free_cullers.pop() {
            Some(id) => {
                self.cullers[id.0 as usize] = Some(params);
                id
            }
            None => {
                self.cullers.push(Some(params));
                CullerId(self.cullers.len() as u32 - 1)
            }
        };
        log::debug!("Created culler {id:?} for a {width}x{height} surface");
        Ok(id)
    }

    /// Retires the culling resources of a render surface.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live culler.
    pub fn remove_culler(&mut self, device: &dyn GraphicsDevice, id: CullerId) {
        let params = self
            .cullers
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .unwrap_or_else(|| panic!("unknown culler {id:?}"));
        for p in params {
            p.destroy(device);
        }
        self.free_cullers.push(id);
        log::debug!("Removed culler {id:?}");
    }

    /// The culling resources of `culler` for `frame_index`.
    pub fn culling_parameters(&self, culler: CullerId, frame_index: usize) -> &CullingParameters {
        match self.cullers.get(culler.0 as usize) {
            Some(Some(params)) => &params[frame_index],
            _ => panic!("unknown culler {culler:?}"),
        }
    }

    fn culler_mut(
        cullers: &mut [Option<Vec<CullingParameters>>],
        culler: CullerId,
    ) -> &mut [CullingParameters] {
        match cullers.get_mut(culler.0 as usize) {
            Some(Some(params)) => params,
            _ => panic!("unknown culler {culler:?}"),
        }
    }

    // --- Addresses consumed by the shading pass ---

    /// The light buffer of `frame_index`.
    pub fn light_buffer(&self, frame_index: usize) -> &LightBuffer {
        &self.light_buffers[frame_index]
    }

    /// GPU address of the point/spot light parameters of `frame_index`.
    pub fn cullable_light_buffer_address(
        &self,
        device: &dyn GraphicsDevice,
        frame_index: usize,
    ) -> Result<u64, ResourceError> {
        device.buffer_address(self.light_buffers[frame_index].cullable_lights())
    }

    /// GPU address of the directional lights of `frame_index`.
    pub fn non_cullable_light_buffer_address(
        &self,
        device: &dyn GraphicsDevice,
        frame_index: usize,
    ) -> Result<u64, ResourceError> {
        device.buffer_address(self.light_buffers[frame_index].non_cullable_lights())
    }

    /// GPU address of the light grid of `culler` for `frame_index`.
    pub fn light_grid_address(
        &self,
        device: &dyn GraphicsDevice,
        culler: CullerId,
        frame_index: usize,
    ) -> Result<u64, ResourceError> {
        self.culling_parameters(culler, frame_index)
            .light_grid_address(device)
    }

    /// GPU address of the light index list of `culler` for `frame_index`.
    pub fn light_index_list_address(
        &self,
        device: &dyn GraphicsDevice,
        culler: CullerId,
        frame_index: usize,
    ) -> Result<u64, ResourceError> {
        self.culling_parameters(culler, frame_index)
            .light_index_list_address(device)
    }

    /// GPU address of the tile frustums of `culler` for `frame_index`.
    pub fn frustums_address(
        &self,
        device: &dyn GraphicsDevice,
        culler: CullerId,
        frame_index: usize,
    ) -> Result<u64, ResourceError> {
        self.culling_parameters(culler, frame_index)
            .frustums_address(device)
    }

    /// Releases every GPU resource.
    ///
    /// Light sets that still hold lights are dropped with a warning.
    pub fn shutdown(self, device: &dyn GraphicsDevice) {
        if !self.registry.is_empty() {
            log::warn!(
                "LightingAgent shut down with {} light set(s) still registered",
                self.registry.len()
            );
        }
        for params in self.cullers.into_iter().flatten() {
            for p in params {
                p.destroy(device);
            }
        }
        for buffer in self.light_buffers {
            buffer.destroy(device);
        }
        self.lane.destroy(device);
        log::info!("LightingAgent shut down");
    }
}
