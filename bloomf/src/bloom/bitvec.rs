// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

/// Number of bits in one storage word.
pub(crate) const WORD_BITS: u32 = u64::BITS;

/// A fixed-length vector of bits packed into `u64` words.
///
/// Bit `i` lives in word `i / 64` at shift `i % 64`. Indexing past the last word panics; the
/// filter masks every probe into range before calling in here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVector {
    words: Vec<u64>,
}

impl BitVector {
    /// Creates an all-zero vector able to hold `num_bits` bits, rounded up to whole words.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomf::bloom::BitVector;
    /// let bits = BitVector::new(100);
    /// assert_eq!(bits.num_words(), 2);
    /// assert_eq!(bits.num_bits(), 128);
    /// ```
    pub fn new(num_bits: u32) -> Self {
        let num_words = num_bits.div_ceil(WORD_BITS) as usize;
        BitVector {
            words: vec![0; num_words],
        }
    }

    /// Wraps already packed words.
    pub fn from_words(words: Vec<u64>) -> Self {
        BitVector { words }
    }

    /// Returns the value of `bit`.
    #[inline]
    pub fn get(&self, bit: u32) -> bool {
        let (idx, mask) = locate(bit);
        self.words[idx] & mask != 0
    }

    /// Sets `bit` to 1.
    #[inline]
    pub fn set(&mut self, bit: u32) {
        let (idx, mask) = locate(bit);
        self.words[idx] |= mask;
    }

    /// Sets `bit` to 1 and returns the value it had before.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomf::bloom::BitVector;
    /// let mut bits = BitVector::new(64);
    /// assert!(!bits.test_and_set(3));
    /// assert!(bits.test_and_set(3));
    /// ```
    #[inline]
    pub fn test_and_set(&mut self, bit: u32) -> bool {
        let (idx, mask) = locate(bit);
        let word = self.words[idx];
        self.words[idx] = word | mask;
        word & mask != 0
    }

    /// Returns the number of storage words.
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Returns the number of addressable bits.
    pub fn num_bits(&self) -> u64 {
        self.words.len() as u64 * u64::from(WORD_BITS)
    }

    /// Returns the packed words.
    pub fn as_words(&self) -> &[u64] {
        &self.words
    }

    /// Returns the number of bits set to 1.
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Returns whether every bit is 0.
    pub fn is_clear(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Clears every bit.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// ORs every word of `other` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the two vectors have a different number of words.
    pub fn union_with(&mut self, other: &BitVector) {
        assert_eq!(
            self.words.len(),
            other.words.len(),
            "cannot union bit vectors of different widths"
        );
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word |= *other_word;
        }
    }

    /// Halves the width by ORing the upper half of the words onto the lower half.
    ///
    /// For a power-of-two width `w`, bit `b` ends up at `b & (w / 2 - 1)`, so everything that
    /// was set is still set once reduced modulo the new width.
    ///
    /// # Panics
    ///
    /// Panics if the word count is not a power of two, or is already a single word.
    pub fn fold_in_half(&mut self) {
        let width = self.words.len();
        assert!(width.is_power_of_two(), "width must be a power of two");
        assert!(width > 1, "cannot fold a single word");

        let half = width / 2;
        // Reallocate so the dropped half is actually released.
        let folded: Vec<u64> = (0..half)
            .map(|j| self.words[j] | self.words[j + half])
            .collect();
        self.words = folded;
    }
}

#[inline]
fn locate(bit: u32) -> (usize, u64) {
    ((bit / WORD_BITS) as usize, 1u64 << (bit % WORD_BITS))
}
