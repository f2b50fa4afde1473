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

use std::collections::HashMap;

use lumen_core::renderer::LightSetKey;

use super::light_set::LightSet;

/// Maps light set keys to their [`LightSet`].
///
/// A set is created when its scene is loaded and must be drained of lights
/// before it can be removed.
#[derive(Debug, Default)]
pub struct LightSetRegistry {
    sets: HashMap<LightSetKey, LightSet>,
    initial_cullable_capacity: usize,
    initial_non_cullable_capacity: usize,
}

impl LightSetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry whose new sets preallocate the given capacities.
    pub fn with_initial_capacity(cullable: usize, non_cullable: usize) -> Self {
        Self {
            sets: HashMap::new(),
            initial_cullable_capacity: cullable,
            initial_non_cullable_capacity: non_cullable,
        }
    }

    /// Creates the light set of `key`.
    ///
    /// # Panics
    ///
    /// Panics if a set already exists for `key`.
    pub fn create_light_set(&mut self, key: LightSetKey) -> &mut LightSet {
        assert!(
            !self.sets.contains_key(&key),
            "light set {key:?} already exists"
        );
        log::debug!("Creating light set {key:?}");
        let (cullable, non_cullable) = (
            self.initial_cullable_capacity,
            self.initial_non_cullable_capacity,
        );
        self.sets
            .entry(key)
            .or_insert_with(|| LightSet::with_capacity(key, cullable, non_cullable))
    }

    /// Removes the light set of `key`.
    ///
    /// # Panics
    ///
    /// Panics if no set exists for `key` or if the set still holds lights.
    pub fn remove_light_set(&mut self, key: LightSetKey) {
        let set = self
            .sets
            .get(&key)
            .unwrap_or_else(|| panic!("unknown light set {key:?}"));
        assert!(
            set.is_empty(),
            "light set {key:?} still holds {} light(s)",
            set.len()
        );
        self.sets.remove(&key);
        log::debug!("Removed light set {key:?}");
    }

    /// Returns the set of `key`, if any.
    pub fn get(&self, key: LightSetKey) -> Option<&LightSet> {
        self.sets.get(&key)
    }

    /// Returns the set of `key` mutably, if any.
    pub fn get_mut(&mut self, key: LightSetKey) -> Option<&mut LightSet> {
        self.sets.get_mut(&key)
    }

    /// Returns `true` if a set exists for `key`.
    pub fn contains(&self, key: LightSetKey) -> bool {
        self.sets.contains_key(&key)
    }

    /// Number of registered sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if no set is registered.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::ecs::EntityId;
    use lumen_core::math::LinearRgba;
    use lumen_core::renderer::{LightInitInfo, LightType};

    fn sun(key: LightSetKey) -> LightInitInfo {
        LightInitInfo {
            light_set_key: key,
            entity_id: EntityId::new(0),
            light_type: LightType::Directional,
            intensity: 1.0,
            color: LinearRgba::WHITE,
            is_enabled: true,
        }
    }

    #[test]
    fn test_create_and_remove_empty_set() {
        let mut registry = LightSetRegistry::new();
        registry.create_light_set(LightSetKey(1));
        assert!(registry.contains(LightSetKey(1)));
        assert_eq!(registry.len(), 1);

        registry.remove_light_set(LightSetKey(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_after_draining_lights() {
        let key = LightSetKey(3);
        let mut registry = LightSetRegistry::with_initial_capacity(8, 2);
        let light = registry.create_light_set(key).add(&sun(key));
        registry
            .get_mut(key)
            .expect("set was just created")
            .remove(light);
        registry.remove_light_set(key);
        assert!(registry.get(key).is_none());
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn test_duplicate_key_panics() {
        let mut registry = LightSetRegistry::new();
        registry.create_light_set(LightSetKey(1));
        registry.create_light_set(LightSetKey(1));
    }

    #[test]
    #[should_panic(expected = "still holds 1 light(s)")]
    fn test_removing_non_empty_set_panics() {
        let key = LightSetKey(2);
        let mut registry = LightSetRegistry::new();
        registry.create_light_set(key).add(&sun(key));
        registry.remove_light_set(key);
    }
}
