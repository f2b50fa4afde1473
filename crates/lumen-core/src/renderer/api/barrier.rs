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

//! Batching of buffer state transitions.

use super::buffer::{BufferBarrier, BufferId, BufferState};
use crate::renderer::traits::CommandEncoder;

/// Accumulates buffer transitions so that they can be recorded in one call.
///
/// Passes that hand a resource over to a later consumer add the transition to
/// a batch owned by that consumer instead of recording it themselves, which
/// keeps a transition from being issued twice.
#[derive(Debug, Default, Clone)]
pub struct BarrierBatch {
    barriers: Vec<BufferBarrier>,
}

impl BarrierBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transition of `buffer` from `before` to `after`.
    pub fn add(&mut self, buffer: BufferId, before: BufferState, after: BufferState) {
        self.barriers.push(BufferBarrier {
            buffer,
            before,
            after,
        });
    }

    /// The pending transitions, in insertion order.
    pub fn barriers(&self) -> &[BufferBarrier] {
        &self.barriers
    }

    /// Returns the number of pending transitions.
    pub fn len(&self) -> usize {
        self.barriers.len()
    }

    /// Returns `true` if no transition is pending.
    pub fn is_empty(&self) -> bool {
        self.barriers.is_empty()
    }

    /// Records all pending transitions on `encoder` and empties the batch.
    pub fn apply(&mut self, encoder: &mut dyn CommandEncoder) {
        if self.barriers.is_empty() {
            return;
        }
        log::trace!("Applying {} buffer barrier(s)", self.barriers.len());
        encoder.resource_barrier(&self.barriers);
        self.barriers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_keeps_insertion_order() {
        let mut batch = BarrierBatch::new();
        batch.add(BufferId(1), BufferState::UnorderedAccess, BufferState::ShaderRead);
        batch.add(BufferId(2), BufferState::ShaderRead, BufferState::UnorderedAccess);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.barriers()[0].buffer, BufferId(1));
        assert_eq!(batch.barriers()[1].after, BufferState::UnorderedAccess);
    }
}
