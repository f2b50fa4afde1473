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

//! Per-frame-in-flight dirty masks.

/// A dirty mask with one bit per frame in flight, packed in one byte.
///
/// Bit `f` is set while the GPU copy of frame slot `f` has not incorporated
/// the latest CPU-side value. `N` is the number of frames in flight; using a
/// mask with more than eight frames fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDirtyBits<const N: usize>(u8);

impl<const N: usize> FrameDirtyBits<N> {
    const FITS: () = assert!(N > 0 && N <= u8::BITS as usize, "frame count must fit in a byte");

    /// Every frame bit set.
    pub const ALL: Self = {
        let () = Self::FITS;
        Self(((1u16 << N) - 1) as u8)
    };
    /// No bit set.
    pub const CLEAN: Self = {
        let () = Self::FITS;
        Self(0)
    };

    /// Marks every frame dirty.
    #[inline]
    pub fn mark_all(&mut self) {
        *self = Self::ALL;
    }

    /// Returns `true` if frame `frame_index` is dirty.
    #[inline]
    pub fn is_set(self, frame_index: usize) -> bool {
        debug_assert!(frame_index < N);
        self.0 & (1 << frame_index) != 0
    }

    /// Clears the bit of frame `frame_index`.
    #[inline]
    pub fn clear(&mut self, frame_index: usize) {
        debug_assert!(frame_index < N);
        self.0 &= !(1 << frame_index);
    }
}

impl<const N: usize> Default for FrameDirtyBits<N> {
    fn default() -> Self {
        Self::CLEAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sets_one_bit_per_frame() {
        let all = FrameDirtyBits::<3>::ALL;
        for frame in 0..3 {
            assert!(all.is_set(frame));
        }
        assert_eq!(all, FrameDirtyBits(0b111));
        assert_eq!(FrameDirtyBits::<8>::ALL, FrameDirtyBits(u8::MAX));
    }

    #[test]
    fn test_clear_only_touches_one_frame() {
        let mut bits = FrameDirtyBits::<2>::CLEAN;
        bits.mark_all();
        bits.clear(0);
        assert!(!bits.is_set(0));
        assert!(bits.is_set(1));
        bits.clear(1);
        assert_eq!(bits, FrameDirtyBits::default());
    }
}
