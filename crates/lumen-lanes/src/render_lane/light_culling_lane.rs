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

//! The tiled light culling dispatcher.
//!
//! Every culler owns a [`CullingParameters`] per frame in flight: the per-tile
//! frustums, the shared light grid / light index list buffer and the atomic
//! counter the culling shader allocates index list ranges from. The
//! [`LightCullingLane`] owns the two compute pipelines and records, per frame:
//!
//! 1. the grid frustum pass, only when the surface was resized or the FOV changed,
//! 2. the light culling pass, unless the light set was empty last time too.
//!
//! The final `UnorderedAccess -> ShaderRead` transition of the light grid is
//! appended to the caller's [`BarrierBatch`] so it can be merged with the
//! other transitions that precede the shading pass.

use std::borrow::Cow;

use lumen_core::math::is_nearly_equal;
use lumen_core::renderer::{
    BarrierBatch, BufferBinding, BufferDescriptor, BufferId, BufferState, CommandEncoder,
    ComputePassDescriptor, ComputePipelineDescriptor, ComputePipelineId, FrameInfo,
    GraphicsDevice, GridFrustumsConstants, LightCullingConstants, RenderError, ResourceError,
    ShaderModuleDescriptor, ShaderModuleId, ShaderSourceData, TileGrid,
};

use super::shaders::{COMPUTE_ENTRY_POINT, GRID_FRUSTUMS_WGSL, LIGHT_CULLING_WGSL, MAX_TILE_LIGHTS};

/// What the dispatcher has to do before the next cull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullingState {
    /// No surface size known yet.
    Uninitialized,
    /// The surface size or FOV changed: tile counts must be recomputed.
    Resize,
    /// The grid is sized; the frustums must be rebuilt.
    FrustumsDirty,
    /// Frustums are up to date.
    Ready,
}

/// Per-culler, per-frame culling resources.
#[derive(Debug)]
pub struct CullingParameters {
    grid: TileGrid,
    state: CullingState,
    frustums: BufferId,
    frustums_capacity: u64,
    frustums_state: BufferState,
    light_grid: BufferId,
    light_grid_capacity: u64,
    light_grid_state: BufferState,
    light_index_counter: BufferId,
    width: u32,
    height: u32,
    fov_y: f32,
    has_lights: bool,
}

impl CullingParameters {
    /// Allocates the culling buffers for an initial `width x height` surface.
    pub fn new(
        device: &dyn GraphicsDevice,
        width: u32,
        height: u32,
        max_lights_per_tile: u32,
    ) -> Result<Self, RenderError> {
        let grid = TileGrid::new(width, height);
        let frustums_capacity = grid.frustums_size();
        let light_grid_capacity = grid.light_grid_and_index_list_size(max_lights_per_tile);

        let frustums = device.create_buffer(&BufferDescriptor::unordered_access(
            "culling_frustums",
            frustums_capacity,
        ))?;
        let light_grid = device.create_buffer(&BufferDescriptor::unordered_access(
            "light_grid",
            light_grid_capacity,
        ))?;
        let light_index_counter = device.create_buffer(&BufferDescriptor::unordered_access(
            "light_index_counter",
            std::mem::size_of::<u32>() as u64,
        ))?;

        Ok(Self {
            grid,
            state: CullingState::Uninitialized,
            frustums,
            frustums_capacity,
            frustums_state: BufferState::UnorderedAccess,
            light_grid,
            light_grid_capacity,
            light_grid_state: BufferState::UnorderedAccess,
            light_index_counter,
            width: 0,
            height: 0,
            fov_y: 0.0,
            has_lights: true,
        })
    }

    /// Records the surface the next cull renders to.
    ///
    /// Any change of size or FOV (or the very first call) schedules a resize,
    /// which in turn rebuilds the frustums.
    pub fn update_surface(&mut self, width: u32, height: u32, fov_y: f32) {
        if self.state == CullingState::Uninitialized
            || width != self.width
            || height != self.height
            || !is_nearly_equal(fov_y, self.fov_y)
        {
            self.width = width;
            self.height = height;
            self.fov_y = fov_y;
            self.state = CullingState::Resize;
        }
    }

    /// The pending work.
    pub fn state(&self) -> CullingState {
        self.state
    }

    /// The tile grid of the last processed surface size.
    pub fn tile_grid(&self) -> &TileGrid {
        &self.grid
    }

    /// The per-tile frustum buffer.
    pub fn frustums(&self) -> BufferId {
        self.frustums
    }

    /// The buffer holding the light grid followed by the light index list.
    pub fn light_grid_buffer(&self) -> BufferId {
        self.light_grid
    }

    /// View of the light grid (`{offset, count}` per tile).
    pub fn light_grid_binding(&self) -> BufferBinding {
        BufferBinding::range(self.light_grid, 0, self.grid.light_grid_size())
    }

    /// View of the light index list.
    pub fn light_index_list_binding(&self, max_lights_per_tile: u32) -> BufferBinding {
        BufferBinding::range(
            self.light_grid,
            self.grid.light_index_list_offset(),
            self.grid.light_index_list_size(max_lights_per_tile),
        )
    }

    /// GPU address of the light grid.
    pub fn light_grid_address(&self, device: &dyn GraphicsDevice) -> Result<u64, ResourceError> {
        device.buffer_address(self.light_grid)
    }

    /// GPU address of the light index list.
    pub fn light_index_list_address(
        &self,
        device: &dyn GraphicsDevice,
    ) -> Result<u64, ResourceError> {
        Ok(device.buffer_address(self.light_grid)? + self.grid.light_index_list_offset())
    }

    /// GPU address of the frustum buffer.
    pub fn frustums_address(&self, device: &dyn GraphicsDevice) -> Result<u64, ResourceError> {
        device.buffer_address(self.frustums)
    }

    /// Retires every buffer.
    pub fn destroy(self, device: &dyn GraphicsDevice) {
        for buffer in [self.frustums, self.light_grid, self.light_index_counter] {
            if let Err(e) = device.destroy_buffer(buffer) {
                log::warn!("Failed to retire culling buffer {buffer:?}: {e}");
            }
        }
    }

    /// Applies a pending resize: grows buffers that became too small.
    fn apply_resize(
        &mut self,
        device: &dyn GraphicsDevice,
        max_lights_per_tile: u32,
    ) -> Result<(), ResourceError> {
        self.grid = TileGrid::new(self.width, self.height);

        let frustums_size = self.grid.frustums_size();
        if frustums_size > self.frustums_capacity {
            let capacity = frustums_size + (frustums_size >> 1);
            let buffer = device.create_buffer(&BufferDescriptor::unordered_access(
                "culling_frustums",
                capacity,
            ))?;
            device.destroy_buffer(self.frustums)?;
            self.frustums = buffer;
            self.frustums_capacity = capacity;
            self.frustums_state = BufferState::UnorderedAccess;
        }

        let grid_size = self.grid.light_grid_and_index_list_size(max_lights_per_tile);
        if grid_size > self.light_grid_capacity {
            let capacity = grid_size + (grid_size >> 1);
            let buffer =
                device.create_buffer(&BufferDescriptor::unordered_access("light_grid", capacity))?;
            device.destroy_buffer(self.light_grid)?;
            self.light_grid = buffer;
            self.light_grid_capacity = capacity;
            self.light_grid_state = BufferState::UnorderedAccess;
        }

        log::debug!(
            "Culling grid resized to {}x{} tiles ({}x{} px)",
            self.grid.tile_count[0],
            self.grid.tile_count[1],
            self.width,
            self.height
        );
        // The new grid has never been written: cull it at least once.
        self.has_lights = true;
        self.state = CullingState::FrustumsDirty;
        Ok(())
    }
}

/// Buffers of the light set being culled.
#[derive(Debug, Clone, Copy)]
pub struct CullingInputs {
    /// Number of enabled cullable lights.
    pub light_count: u32,
    /// Culling info of the enabled cullable lights.
    pub culling_infos: BufferId,
    /// Bounding spheres of the enabled cullable lights.
    pub bounding_spheres: BufferId,
}

/// What a [`LightCullingLane::cull_lights`] call recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullingReport {
    /// The culling buffers were resized.
    pub resized: bool,
    /// The grid frustum pass was recorded.
    pub frustums_rebuilt: bool,
    /// The light culling pass was recorded.
    pub culled: bool,
}

/// Owns the culling pipelines and records the culling passes.
#[derive(Debug)]
pub struct LightCullingLane {
    grid_frustums_module: ShaderModuleId,
    light_culling_module: ShaderModuleId,
    grid_frustums_pipeline: ComputePipelineId,
    light_culling_pipeline: ComputePipelineId,
    max_lights_per_tile: u32,
}

impl LightCullingLane {
    /// Compiles both culling shaders.
    pub fn new(device: &dyn GraphicsDevice, max_lights_per_tile: u32) -> Result<Self, RenderError> {
        if max_lights_per_tile == 0 || max_lights_per_tile > MAX_TILE_LIGHTS {
            return Err(RenderError::InvalidConfiguration(format!(
                "max_lights_per_tile must be in 1..={MAX_TILE_LIGHTS}, got {max_lights_per_tile}"
            )));
        }

        let (grid_frustums_module, grid_frustums_pipeline) =
            Self::create_pipeline(device, "grid_frustums", GRID_FRUSTUMS_WGSL)?;
        let (light_culling_module, light_culling_pipeline) =
            Self::create_pipeline(device, "light_culling", LIGHT_CULLING_WGSL)?;

        log::info!("Light culling pipelines created ({max_lights_per_tile} lights per tile)");
        Ok(Self {
            grid_frustums_module,
            light_culling_module,
            grid_frustums_pipeline,
            light_culling_pipeline,
            max_lights_per_tile,
        })
    }

    fn create_pipeline(
        device: &dyn GraphicsDevice,
        label: &str,
        source: &'static str,
    ) -> Result<(ShaderModuleId, ComputePipelineId), ResourceError> {
        let module = device.create_shader_module(&ShaderModuleDescriptor {
            label: Some(label),
            source: ShaderSourceData::Wgsl(Cow::Borrowed(source)),
        })?;
        let pipeline = device.create_compute_pipeline(&ComputePipelineDescriptor {
            label: Some(Cow::Owned(format!("{label}_pipeline"))),
            shader_module: module,
            entry_point: Cow::Borrowed(COMPUTE_ENTRY_POINT),
        })?;
        Ok((module, pipeline))
    }

    /// Capacity of one tile in the light index list.
    pub fn max_lights_per_tile(&self) -> u32 {
        self.max_lights_per_tile
    }

    /// Allocates culling resources sized for `width x height`.
    pub fn create_parameters(
        &self,
        device: &dyn GraphicsDevice,
        width: u32,
        height: u32,
    ) -> Result<CullingParameters, RenderError> {
        CullingParameters::new(device, width, height, self.max_lights_per_tile)
    }

    /// Records the culling work of one frame into `encoder`.
    ///
    /// The light grid ends up in [`BufferState::UnorderedAccess`] and the
    /// transition back to [`BufferState::ShaderRead`] is added to `barriers`.
    /// The caller must apply `barriers` before the shading pass reads the grid.
    pub fn cull_lights(
        &self,
        device: &dyn GraphicsDevice,
        encoder: &mut dyn CommandEncoder,
        params: &mut CullingParameters,
        frame: &FrameInfo,
        inputs: CullingInputs,
        barriers: &mut BarrierBatch,
    ) -> Result<CullingReport, RenderError> {
        let mut report = CullingReport::default();
        params.update_surface(frame.surface_width, frame.surface_height, frame.camera.fov_y);

        if params.state == CullingState::Resize {
            params.apply_resize(device, self.max_lights_per_tile)?;
            report.resized = true;
        }

        if params.state == CullingState::FrustumsDirty {
            self.record_grid_frustums(encoder, params, frame);
            params.state = CullingState::Ready;
            report.frustums_rebuilt = true;
        }

        if inputs.light_count == 0 && !params.has_lights {
            return Ok(report);
        }
        params.has_lights = inputs.light_count > 0;

        self.record_light_culling(encoder, params, frame, inputs);
        barriers.add(
            params.light_grid,
            BufferState::UnorderedAccess,
            BufferState::ShaderRead,
        );
        params.light_grid_state = BufferState::ShaderRead;
        report.culled = true;
        Ok(report)
    }

    fn record_grid_frustums(
        &self,
        encoder: &mut dyn CommandEncoder,
        params: &mut CullingParameters,
        frame: &FrameInfo,
    ) {
        if params.frustums_state != BufferState::UnorderedAccess {
            let mut transition = BarrierBatch::new();
            transition.add(
                params.frustums,
                BufferState::ShaderRead,
                BufferState::UnorderedAccess,
            );
            transition.apply(encoder);
        }

        let constants = GridFrustumsConstants::new(&params.grid, frame.camera.inverse_projection);
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("grid_frustums"),
            });
            pass.set_pipeline(self.grid_frustums_pipeline);
            pass.set_constants(0, bytemuck::bytes_of(&constants));
            pass.set_buffer(1, BufferBinding::whole(params.frustums));
            pass.dispatch_workgroups(
                params.grid.frustum_groups[0],
                params.grid.frustum_groups[1],
                1,
            );
        }

        // The culling pass reads the frustums right away.
        let mut transition = BarrierBatch::new();
        transition.add(
            params.frustums,
            BufferState::UnorderedAccess,
            BufferState::ShaderRead,
        );
        transition.apply(encoder);
        params.frustums_state = BufferState::ShaderRead;
    }

    fn record_light_culling(
        &self,
        encoder: &mut dyn CommandEncoder,
        params: &CullingParameters,
        frame: &FrameInfo,
        inputs: CullingInputs,
    ) {
        if params.light_grid_state != BufferState::UnorderedAccess {
            let mut transition = BarrierBatch::new();
            transition.add(
                params.light_grid,
                BufferState::ShaderRead,
                BufferState::UnorderedAccess,
            );
            transition.apply(encoder);
        }
        encoder.clear_buffer(
            params.light_index_counter,
            0,
            std::mem::size_of::<u32>() as u64,
        );

        let grid = &params.grid;
        let constants = LightCullingConstants {
            view: frame.camera.view,
            viewport: [grid.viewport[0] as f32, grid.viewport[1] as f32],
            num_threads: grid.tile_count,
            num_thread_groups: grid.culling_groups,
            num_lights: inputs.light_count,
            max_lights_per_tile: self.max_lights_per_tile,
            depth_range: [frame.camera.z_near, frame.camera.z_far],
            _padding: [0.0; 2],
        };

        let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
            label: Some("light_culling"),
        });
        pass.set_pipeline(self.light_culling_pipeline);
        pass.set_constants(0, bytemuck::bytes_of(&constants));
        pass.set_buffer(1, BufferBinding::whole(params.frustums));
        pass.set_buffer(2, BufferBinding::whole(inputs.culling_infos));
        pass.set_buffer(3, BufferBinding::whole(inputs.bounding_spheres));
        pass.set_buffer(4, BufferBinding::whole(params.light_index_counter));
        pass.set_buffer(5, params.light_grid_binding());
        pass.set_buffer(6, params.light_index_list_binding(self.max_lights_per_tile));
        pass.dispatch_workgroups(grid.culling_groups[0], grid.culling_groups[1], 1);
    }

    /// Destroys the pipelines and shader modules.
    pub fn destroy(&self, device: &dyn GraphicsDevice) {
        let pipelines = [self.grid_frustums_pipeline, self.light_culling_pipeline];
        for pipeline in pipelines {
            if let Err(e) = device.destroy_compute_pipeline(pipeline) {
                log::warn!("Failed to destroy culling pipeline {pipeline:?}: {e}");
            }
        }
        for module in [self.grid_frustums_module, self.light_culling_module] {
            if let Err(e) = device.destroy_shader_module(module) {
                log::warn!("Failed to destroy culling shader {module:?}: {e}");
            }
        }
    }
}
