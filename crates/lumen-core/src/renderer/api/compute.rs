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

//! Defines data structures for compute shaders and compute pipelines.

use std::borrow::Cow;

/// Represents the source data for a shader module.
#[derive(Debug, Clone)]
pub enum ShaderSourceData<'a> {
    /// WGSL source text.
    Wgsl(Cow<'a, str>),
}

/// Describes a shader module to be created by the `GraphicsDevice`.
#[derive(Debug, Clone)]
pub struct ShaderModuleDescriptor<'a> {
    /// An optional debug label for the shader module.
    pub label: Option<&'a str>,
    /// The shader source.
    pub source: ShaderSourceData<'a>,
}

/// An opaque handle representing a compiled shader module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderModuleId(pub usize);

/// An opaque handle to a compiled compute pipeline state object.
///
/// This ID is returned by
/// [`GraphicsDevice::create_compute_pipeline`](crate::renderer::GraphicsDevice::create_compute_pipeline)
/// and is used to reference the pipeline when recording compute dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComputePipelineId(pub u64);

/// A descriptor used to create a [`ComputePipelineId`].
#[derive(Debug, Clone)]
pub struct ComputePipelineDescriptor<'a> {
    /// An optional debug label for the compute pipeline.
    pub label: Option<Cow<'a, str>>,
    /// The compiled compute shader module.
    pub shader_module: ShaderModuleId,
    /// The name of the entry point function in the compute shader.
    pub entry_point: Cow<'a, str>,
}

/// A descriptor for a compute pass.
#[derive(Debug, Clone, Default)]
pub struct ComputePassDescriptor<'a> {
    /// An optional debug label for the compute pass.
    pub label: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_pipeline_id_ordering() {
        assert!(ComputePipelineId(1) < ComputePipelineId(2));
        assert_eq!(ComputePipelineId(7), ComputePipelineId(7));
    }

    #[test]
    fn compute_pipeline_descriptor_creation() {
        let descriptor = ComputePipelineDescriptor {
            label: Some(Cow::Borrowed("grid_frustums")),
            shader_module: ShaderModuleId(42),
            entry_point: Cow::Borrowed("cs_main"),
        };

        assert_eq!(descriptor.label.as_deref(), Some("grid_frustums"));
        assert_eq!(descriptor.shader_module, ShaderModuleId(42));
        assert_eq!(descriptor.entry_point, "cs_main");
    }
}
