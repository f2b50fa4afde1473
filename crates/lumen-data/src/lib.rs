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

//! CPU-side data layouts of the light subsystem.
//!
//! [`lighting::LightSet`] packs the lights of one logical set so that the enabled
//! cullable lights always form a contiguous prefix, ready to be mirrored into
//! GPU memory. [`lighting::LightSetRegistry`] maps light set keys to sets.

#![warn(missing_docs)]

pub mod lighting;
