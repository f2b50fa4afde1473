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

//! A growable bitset for per-entity change flags.

/// A simple bitset wrapped around a `Vec<u64>`.
///
/// The transform system fills one of these when asked which entities moved;
/// bit `i` refers to the `i`-th entity of the queried slice, not to the
/// entity's own index.
#[derive(Debug, Default, Clone)]
pub struct ChangeBitset {
    bits: Vec<u64>,
}

impl ChangeBitset {
    /// Creates a new, empty bitset.
    pub fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// Clears every bit and makes room for at least `len` bits.
    ///
    /// The backing allocation is kept, so a bitset reused every frame does
    /// not reallocate once it has grown to the working-set size.
    pub fn reset(&mut self, len: usize) {
        self.bits.clear();
        self.bits.resize(len.div_ceil(64), 0);
    }

    /// Sets the bit at the specified index to 1.
    pub fn set(&mut self, index: usize) {
        let word_idx = index / 64;
        let bit_idx = index % 64;

        if word_idx >= self.bits.len() {
            self.bits.resize(word_idx + 1, 0);
        }

        self.bits[word_idx] |= 1 << bit_idx;
    }

    /// Returns true if the bit at the specified index is set.
    pub fn is_set(&self, index: usize) -> bool {
        let word_idx = index / 64;
        let bit_idx = index % 64;

        self.bits
            .get(word_idx)
            .is_some_and(|word| word & (1 << bit_idx) != 0)
    }
}
