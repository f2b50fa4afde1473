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

//! Tile math and GPU layouts of the Forward+ culling passes.
//!
//! The screen is split into square tiles of [`TILE_SIZE`] pixels. The grid
//! frustum pass builds one view-space frustum per tile; the light culling pass
//! then writes, per tile, an `{offset, count}` entry into the light grid and
//! the matching light indices into the light index list.

use crate::math::align_up;

/// Edge length of a screen tile, in pixels.
pub const TILE_SIZE: u32 = 32;

/// Default upper bound on the number of lights recorded for one tile.
pub const DEFAULT_MAX_LIGHTS_PER_TILE: u32 = 256;

/// Minimum offset alignment for binding a sub-range of a storage buffer.
///
/// The light grid and light index list share one buffer; the index list
/// starts at the grid size rounded up to this value.
pub const STORAGE_OFFSET_ALIGNMENT: u64 = 256;

/// Number of tiles needed to cover `pixels`, counting partial tiles.
///
/// A zero extent still yields one tile.
#[inline]
pub const fn tile_count(pixels: u32) -> u32 {
    let pixels = if pixels == 0 { 1 } else { pixels };
    pixels.div_ceil(TILE_SIZE)
}

/// Tile and dispatch dimensions for one viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileGrid {
    /// Viewport size in pixels (clamped to at least 1x1).
    pub viewport: [u32; 2],
    /// Number of tiles per axis. The grid frustum pass runs one invocation per tile.
    pub tile_count: [u32; 2],
    /// Workgroup counts of the grid frustum pass (each group covers a
    /// `TILE_SIZE x TILE_SIZE` block of tiles).
    pub frustum_groups: [u32; 2],
    /// Workgroup counts of the light culling pass (one group per tile).
    pub culling_groups: [u32; 2],
}

impl TileGrid {
    /// Computes the grid for a `width x height` viewport.
    pub const fn new(width: u32, height: u32) -> Self {
        let width = if width == 0 { 1 } else { width };
        let height = if height == 0 { 1 } else { height };
        let tile_count = [tile_count(width), tile_count(height)];
        Self {
            viewport: [width, height],
            tile_count,
            frustum_groups: [
                tile_count[0].div_ceil(TILE_SIZE),
                tile_count[1].div_ceil(TILE_SIZE),
            ],
            culling_groups: tile_count,
        }
    }

    /// Total number of tiles.
    #[inline]
    pub const fn total_tiles(&self) -> u32 {
        self.tile_count[0] * self.tile_count[1]
    }

    /// Size in bytes of the frustum buffer.
    #[inline]
    pub const fn frustums_size(&self) -> u64 {
        self.total_tiles() as u64 * std::mem::size_of::<GpuFrustum>() as u64
    }

    /// Size in bytes of the light grid.
    #[inline]
    pub const fn light_grid_size(&self) -> u64 {
        self.total_tiles() as u64 * std::mem::size_of::<GpuLightGridEntry>() as u64
    }

    /// Byte offset of the light index list inside the shared grid/index buffer.
    #[inline]
    pub const fn light_index_list_offset(&self) -> u64 {
        align_up(self.light_grid_size(), STORAGE_OFFSET_ALIGNMENT)
    }

    /// Size in bytes of the light index list for `max_lights_per_tile`.
    #[inline]
    pub const fn light_index_list_size(&self, max_lights_per_tile: u32) -> u64 {
        self.total_tiles() as u64 * max_lights_per_tile as u64 * std::mem::size_of::<u32>() as u64
    }

    /// Size in bytes of the shared light grid + light index list buffer.
    #[inline]
    pub const fn light_grid_and_index_list_size(&self, max_lights_per_tile: u32) -> u64 {
        self.light_index_list_offset() + self.light_index_list_size(max_lights_per_tile)
    }
}

/// A view-space plane `dot(normal, p) = distance`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuPlane {
    /// Unit normal pointing into the frustum.
    pub normal: [f32; 3],
    /// Distance from the origin along `normal`.
    pub distance: f32,
}

/// The four side planes of one tile's frustum (left, right, top, bottom).
///
/// Near and far are not stored; they are the same for every tile.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuFrustum {
    /// The side planes.
    pub planes: [GpuPlane; 4],
}

/// One light grid cell: where the tile's lights start in the index list and how many there are.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLightGridEntry {
    /// First entry of the tile in the light index list.
    pub offset: u32,
    /// Number of lights affecting the tile.
    pub count: u32,
}

/// Constants of the grid frustum pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridFrustumsConstants {
    /// Clip-to-view transform, column-major.
    pub inverse_projection: [[f32; 4]; 4],
    /// Viewport size in pixels.
    pub viewport: [f32; 2],
    /// Number of tiles per axis.
    pub num_threads: [u32; 2],
    /// Number of dispatched workgroups per axis.
    pub num_thread_groups: [u32; 2],
    /// Padding to 16-byte alignment.
    pub _padding: [u32; 2],
}

impl GridFrustumsConstants {
    /// Builds the constants for `grid` and the given inverse projection.
    pub fn new(grid: &TileGrid, inverse_projection: [[f32; 4]; 4]) -> Self {
        Self {
            inverse_projection,
            viewport: [grid.viewport[0] as f32, grid.viewport[1] as f32],
            num_threads: grid.tile_count,
            num_thread_groups: grid.frustum_groups,
            _padding: [0; 2],
        }
    }
}

/// Constants of the light culling pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightCullingConstants {
    /// World-to-view transform, column-major.
    pub view: [[f32; 4]; 4],
    /// Viewport size in pixels.
    pub viewport: [f32; 2],
    /// Number of tiles per axis.
    pub num_threads: [u32; 2],
    /// Number of dispatched workgroups per axis.
    pub num_thread_groups: [u32; 2],
    /// Number of enabled cullable lights.
    pub num_lights: u32,
    /// Capacity of one tile in the light index list.
    pub max_lights_per_tile: u32,
    /// Near and far distances (positive).
    pub depth_range: [f32; 2],
    /// Padding to 16-byte alignment.
    pub _padding: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_tile_count_covers_partial_tiles() {
        assert_eq!(tile_count(32), 1);
        assert_eq!(tile_count(33), 2);
        assert_eq!(tile_count(1920), 60);
        assert_eq!(tile_count(1080), 34);
        assert_eq!(tile_count(0), 1);
    }

    #[test]
    fn test_tile_grid_dispatch_dimensions() {
        let grid = TileGrid::new(1920, 1080);
        assert_eq!(grid.tile_count, [60, 34]);
        assert_eq!(grid.total_tiles(), 60 * 34);
        assert_eq!(grid.frustum_groups, [2, 2]);
        assert_eq!(grid.culling_groups, [60, 34]);

        let small = TileGrid::new(800, 600);
        assert_eq!(small.tile_count, [25, 19]);
        assert_eq!(small.frustum_groups, [1, 1]);
    }

    #[test]
    fn test_zero_viewport_clamps_to_one_tile() {
        let grid = TileGrid::new(0, 0);
        assert_eq!(grid.viewport, [1, 1]);
        assert_eq!(grid.total_tiles(), 1);
    }

    #[test]
    fn test_index_list_offset_is_aligned() {
        let grid = TileGrid::new(800, 600);
        let grid_size = grid.light_grid_size();
        assert_eq!(grid_size, 25 * 19 * 8);
        assert_eq!(grid.light_index_list_offset() % STORAGE_OFFSET_ALIGNMENT, 0);
        assert!(grid.light_index_list_offset() >= grid_size);
        assert_eq!(
            grid.light_grid_and_index_list_size(256),
            grid.light_index_list_offset() + 25 * 19 * 256 * 4
        );
    }

    #[test]
    fn test_gpu_layout_sizes() {
        assert_eq!(size_of::<GpuPlane>(), 16);
        assert_eq!(size_of::<GpuFrustum>(), 64);
        assert_eq!(size_of::<GpuLightGridEntry>(), 8);
        assert_eq!(size_of::<GridFrustumsConstants>(), 96);
        assert_eq!(size_of::<LightCullingConstants>(), 112);
    }
}
