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

//! Acts as the **[A]gent** of the light subsystem.
//!
//! The agent is the context object handed to the renderer at initialization.
//! It ties the CPU-side light sets to their per-frame GPU mirrors and to the
//! tile cullers of every render surface. A typical frame looks like:
//!
//! ```text
//! agent.update_light_buffers(device, &frame, transforms)?;  // once per frame
//! agent.cull_lights(device, encoder, &frame, &mut barriers)?; // once per surface
//! barriers.apply(encoder);                                     // before shading
//! ```

mod agent;

pub use agent::*;
