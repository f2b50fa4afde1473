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

//! Recording mocks of the graphics traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use lumen_core::renderer::{
    BufferBarrier, BufferBinding, BufferDescriptor, BufferId, CommandEncoder, ComputePass,
    ComputePassDescriptor, ComputePipelineDescriptor, ComputePipelineId, GraphicsDevice,
    ResourceError, ShaderModuleDescriptor, ShaderModuleId,
};

/// A write recorded by [`MockGraphicsDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedWrite {
    pub buffer: BufferId,
    pub offset: u64,
    pub len: usize,
}

/// A mock graphics device that hands out unique ids and records buffer traffic.
#[derive(Debug)]
pub(crate) struct MockGraphicsDevice {
    next_id: AtomicUsize,
    pub buffers: Mutex<HashMap<BufferId, u64>>,
    pub writes: Mutex<Vec<RecordedWrite>>,
    pub destroyed: Mutex<Vec<BufferId>>,
    rejected_shader: Option<&'static str>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1),
            buffers: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
            rejected_shader: None,
        }
    }

    /// A device whose compiler rejects the shader labelled `label`.
    pub fn rejecting_shader(label: &'static str) -> Self {
        Self {
            rejected_shader: Some(label),
            ..Self::new()
        }
    }

    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn take_writes(&self) -> Vec<RecordedWrite> {
        std::mem::take(&mut *self.writes.lock().unwrap())
    }

    pub fn buffer_size(&self, id: BufferId) -> Option<u64> {
        self.buffers.lock().unwrap().get(&id).copied()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        if let (Some(rejected), Some(label)) = (self.rejected_shader, descriptor.label) {
            if rejected == label {
                return Err(ResourceError::ShaderCompilation {
                    label: label.to_string(),
                    details: "rejected by the mock compiler".to_string(),
                });
            }
        }
        Ok(ShaderModuleId(self.next()))
    }

    fn destroy_shader_module(&self, _id: ShaderModuleId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_compute_pipeline(
        &self,
        _descriptor: &ComputePipelineDescriptor,
    ) -> Result<ComputePipelineId, ResourceError> {
        Ok(ComputePipelineId(self.next() as u64))
    }

    fn destroy_compute_pipeline(&self, _id: ComputePipelineId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let id = BufferId(self.next());
        self.buffers.lock().unwrap().insert(id, descriptor.size);
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        self.buffers
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or(ResourceError::InvalidBuffer(id))?;
        self.destroyed.lock().unwrap().push(id);
        Ok(())
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let size = self
            .buffer_size(id)
            .ok_or(ResourceError::InvalidBuffer(id))?;
        if offset + data.len() as u64 > size {
            return Err(ResourceError::OutOfBounds);
        }
        self.writes.lock().unwrap().push(RecordedWrite {
            buffer: id,
            offset,
            len: data.len(),
        });
        Ok(())
    }

    fn buffer_address(&self, id: BufferId) -> Result<u64, ResourceError> {
        self.buffer_size(id).ok_or(ResourceError::InvalidBuffer(id))?;
        Ok(0x1000_0000 + id.0 as u64 * 0x10_0000)
    }
}

/// A command recorded by [`MockCommandEncoder`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Barrier(Vec<BufferBarrier>),
    Clear(BufferId),
    SetPipeline(ComputePipelineId),
    SetConstants(u32, Vec<u8>),
    SetBuffer(u32, BufferBinding),
    Dispatch(u32, u32, u32),
}

#[derive(Debug, Default)]
pub(crate) struct MockCommandEncoder {
    pub commands: Vec<Command>,
}

impl MockCommandEncoder {
    pub fn dispatches(&self) -> Vec<(u32, u32, u32)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::Dispatch(x, y, z) => Some((*x, *y, *z)),
                _ => None,
            })
            .collect()
    }
}

struct MockComputePass<'a> {
    commands: &'a mut Vec<Command>,
}

impl ComputePass<'_> for MockComputePass<'_> {
    fn set_pipeline(&mut self, pipeline: ComputePipelineId) {
        self.commands.push(Command::SetPipeline(pipeline));
    }

    fn set_constants(&mut self, slot: u32, data: &[u8]) {
        self.commands.push(Command::SetConstants(slot, data.to_vec()));
    }

    fn set_buffer(&mut self, slot: u32, binding: BufferBinding) {
        self.commands.push(Command::SetBuffer(slot, binding));
    }

    fn dispatch_workgroups(&mut self, x: u32, y: u32, z: u32) {
        self.commands.push(Command::Dispatch(x, y, z));
    }
}

impl CommandEncoder for MockCommandEncoder {
    fn begin_compute_pass<'encoder>(
        &'encoder mut self,
        _descriptor: &ComputePassDescriptor<'encoder>,
    ) -> Box<dyn ComputePass<'encoder> + 'encoder> {
        Box::new(MockComputePass {
            commands: &mut self.commands,
        })
    }

    fn resource_barrier(&mut self, barriers: &[BufferBarrier]) {
        self.commands.push(Command::Barrier(barriers.to_vec()));
    }

    fn clear_buffer(&mut self, buffer: BufferId, _offset: u64, _size: u64) {
        self.commands.push(Command::Clear(buffer));
    }
}
