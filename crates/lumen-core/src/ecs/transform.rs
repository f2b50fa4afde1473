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

use super::{ChangeBitset, EntityId};
use crate::math::Vec3;

/// Read access to world-space transforms, implemented by the entity system.
///
/// This is the only way lights learn where they are. Implementations are
/// expected to be cheap per call; `updated_transform_flags` is the batched
/// query used to skip lights whose entity did not move.
pub trait TransformSource {
    /// Returns the world-space position of `entity`.
    fn position(&self, entity: EntityId) -> Vec3;

    /// Returns the world-space forward direction of `entity` as a unit vector.
    fn orientation(&self, entity: EntityId) -> Vec3;

    /// Marks which of `entities` had their transform changed since the last frame.
    ///
    /// On return, bit `i` of `flags` is set if and only if `entities[i]` moved.
    /// Implementations must reset `flags` to `entities.len()` bits first.
    fn updated_transform_flags(&self, entities: &[EntityId], flags: &mut ChangeBitset);
}
