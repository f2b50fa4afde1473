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

use crate::renderer::api::{BufferBarrier, BufferBinding, BufferId, ComputePassDescriptor};
use crate::renderer::ComputePipelineId;

/// A trait representing an active compute pass, used for recording dispatch commands.
///
/// The `'pass` lifetime ensures that the pass object cannot outlive the
/// [`CommandEncoder`] that created it.
pub trait ComputePass<'pass> {
    /// Sets the active compute pipeline for subsequent dispatches.
    fn set_pipeline(&mut self, pipeline: ComputePipelineId);

    /// Binds a small block of constants to a uniform slot.
    fn set_constants(&mut self, slot: u32, data: &[u8]);

    /// Binds a buffer range to a storage slot.
    fn set_buffer(&mut self, slot: u32, binding: BufferBinding);

    /// Records a dispatch of `x * y * z` workgroups.
    fn dispatch_workgroups(&mut self, x: u32, y: u32, z: u32);
}

/// A trait for an object that records a sequence of GPU commands.
///
/// The encoder is a stateful object; its lifetime (`'encoder`) is tied to the
/// passes it creates.
pub trait CommandEncoder {
    /// Begins a new compute pass, returning a mutable `ComputePass` object.
    ///
    /// The returned object borrows the encoder mutably, so only one pass can be
    /// active at a time. When it is dropped, the pass is ended.
    fn begin_compute_pass<'encoder>(
        &'encoder mut self,
        descriptor: &ComputePassDescriptor<'encoder>,
    ) -> Box<dyn ComputePass<'encoder> + 'encoder>;

    /// Records buffer state transitions.
    fn resource_barrier(&mut self, barriers: &[BufferBarrier]);

    /// Records a zero-fill of `size` bytes of `buffer` starting at `offset`.
    ///
    /// The buffer must be in the [`UnorderedAccess`](crate::renderer::BufferState::UnorderedAccess) state.
    fn clear_buffer(&mut self, buffer: BufferId, offset: u64, size: u64);
}
