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

//! # Lumen Core
//!
//! Foundational crate containing the traits, core types, and interface contracts
//! shared by the light-management and tiled light-culling subsystem.
//!
//! Nothing in here talks to a real GPU or a real scene graph. The entity/transform
//! system, the GPU allocator, the shader cache and the command recorder are all
//! reached through the narrow traits declared in [`ecs`] and [`renderer::traits`].

#![warn(missing_docs)]

pub mod ecs;
pub mod math;
pub mod renderer;
