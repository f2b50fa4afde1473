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

//! Error types of the light subsystem.
//!
//! Only platform failures are represented here. Contract violations (unknown
//! light ids, destroying a non-empty light set, ...) are programmer errors and
//! panic at the call site instead.

use crate::renderer::api::BufferId;
use std::fmt;

/// A failure reported by the [`GraphicsDevice`](crate::renderer::GraphicsDevice).
#[derive(Debug)]
pub enum ResourceError {
    /// A culling shader was rejected by the backend compiler.
    ShaderCompilation {
        /// Label of the shader module.
        label: String,
        /// Compiler output.
        details: String,
    },
    /// The device could not satisfy an allocation.
    OutOfMemory {
        /// The number of bytes that were requested.
        requested: u64,
    },
    /// The buffer handle is unknown or already retired.
    InvalidBuffer(BufferId),
    /// A write went past the end of a buffer.
    OutOfBounds,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::ShaderCompilation { label, details } => {
                write!(f, "Shader '{label}' failed to compile: {details}")
            }
            ResourceError::OutOfMemory { requested } => {
                write!(f, "Out of GPU memory while allocating {requested} bytes.")
            }
            ResourceError::InvalidBuffer(id) => write!(f, "Invalid buffer handle: {id:?}"),
            ResourceError::OutOfBounds => write!(f, "Buffer write out of bounds."),
        }
    }
}

impl std::error::Error for ResourceError {}

/// An error raised by the light buffers, the culling dispatcher or the agent.
///
/// None of these are recoverable at this layer: there is no degraded culling
/// mode, so callers are expected to abort the frame (or the renderer).
#[derive(Debug)]
pub enum RenderError {
    /// A GPU resource could not be created or written.
    ResourceError(ResourceError),
    /// The configuration handed to the subsystem is unusable.
    InvalidConfiguration(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::InvalidConfiguration(msg) => {
                write!(f, "Invalid lighting configuration: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            RenderError::InvalidConfiguration(_) => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}
