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

//! Entity identifiers and the narrow contract to the entity/transform system.
//!
//! The light subsystem never owns transforms. Every light remembers the
//! [`EntityId`] it is attached to and pulls world position and orientation
//! through a [`TransformSource`] once per frame.

mod bitset;
mod entity;
mod transform;

pub use bitset::ChangeBitset;
pub use entity::EntityId;
pub use transform::TransformSource;
