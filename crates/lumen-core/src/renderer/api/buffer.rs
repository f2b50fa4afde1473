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

//! Defines data structures related to GPU buffer resources.

use std::borrow::Cow;

/// A set of flags describing the allowed usages of a [`BufferId`].
///
/// The backend uses them to pick the memory heap: buffers with
/// [`BufferUsage::MAP_WRITE`] live in CPU-writable, GPU-readable memory and are
/// written through [`GraphicsDevice::write_buffer`](crate::renderer::GraphicsDevice::write_buffer)
/// without a staging copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferUsage {
    bits: u32,
}

impl BufferUsage {
    /// The buffer is CPU-writable (persistently mapped).
    pub const MAP_WRITE: Self = Self { bits: 1 << 0 };
    /// The buffer can be the destination of a copy or clear operation.
    pub const COPY_DST: Self = Self { bits: 1 << 1 };
    /// The buffer can be bound as a read-only storage buffer.
    pub const STORAGE: Self = Self { bits: 1 << 3 };
    /// The buffer can be bound for unordered (read/write) access from compute shaders.
    pub const UNORDERED_ACCESS: Self = Self { bits: 1 << 4 };

    /// Checks if these flags contain all of `other`.
    pub const fn contains(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }
}

impl std::ops::BitOr for BufferUsage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// The required placement alignment in bytes (a power of two).
    pub alignment: u64,
    /// A bitmask of [`BufferUsage`] flags describing how the buffer will be used.
    pub usage: BufferUsage,
    /// The state the buffer is in right after creation.
    pub initial_state: BufferState,
}

impl<'a> BufferDescriptor<'a> {
    /// Describes a CPU-writable, GPU-readable buffer, used to mirror CPU-side arrays.
    pub fn upload(label: impl Into<Cow<'a, str>>, size: u64) -> Self {
        Self {
            label: Some(label.into()),
            size,
            alignment: 16,
            usage: BufferUsage::MAP_WRITE | BufferUsage::STORAGE,
            initial_state: BufferState::ShaderRead,
        }
    }

    /// Describes a GPU-only buffer written by compute shaders.
    pub fn unordered_access(label: impl Into<Cow<'a, str>>, size: u64) -> Self {
        Self {
            label: Some(label.into()),
            size,
            alignment: 16,
            usage: BufferUsage::UNORDERED_ACCESS | BufferUsage::STORAGE | BufferUsage::COPY_DST,
            initial_state: BufferState::UnorderedAccess,
        }
    }
}

/// An opaque handle to a GPU buffer resource.
///
/// This ID is returned by
/// [`GraphicsDevice::create_buffer`](crate::renderer::GraphicsDevice::create_buffer) and
/// is used to reference the buffer in all subsequent operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

/// The access state a buffer is in, from the point of view of the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferState {
    /// Readable by any shader stage (including the shading pass).
    ShaderRead,
    /// Being written by compute shaders.
    UnorderedAccess,
}

/// A single state transition of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferBarrier {
    /// The buffer that transitions.
    pub buffer: BufferId,
    /// The state the buffer is currently in.
    pub before: BufferState,
    /// The state the buffer must be in for the next use.
    pub after: BufferState,
}

/// A view into a buffer, bound to a shader slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferBinding {
    /// The buffer to bind.
    pub buffer: BufferId,
    /// The byte offset of the view.
    pub offset: u64,
    /// The size of the view in bytes. `None` binds the rest of the buffer.
    pub size: Option<u64>,
}

impl BufferBinding {
    /// Binds the whole buffer.
    pub const fn whole(buffer: BufferId) -> Self {
        Self {
            buffer,
            offset: 0,
            size: None,
        }
    }

    /// Binds `size` bytes starting at `offset`.
    pub const fn range(buffer: BufferId, offset: u64, size: u64) -> Self {
        Self {
            buffer,
            offset,
            size: Some(size),
        }
    }
}
