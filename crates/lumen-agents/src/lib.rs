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

//! Renderer-facing entry point of the light subsystem.
//!
//! The [`LightingAgent`](lighting_agent::LightingAgent) is the explicit context
//! object the renderer creates at initialization. It owns every light set,
//! the per-frame light buffers and the tile cullers, and exposes the GPU
//! addresses the shading pass binds.

#![warn(missing_docs)]

pub mod lighting_agent;
pub mod settings;

pub use lighting_agent::LightingAgent;
pub use settings::LightingSettings;
