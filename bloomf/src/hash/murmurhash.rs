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

use crate::hash::ByteHasher;
use crate::hash::DEFAULT_SEED;

/// [`ByteHasher`] backed by MurmurHash3 x64 128, keeping the first 64-bit half of the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Murmur3Hasher {
    seed: u32,
}

impl Murmur3Hasher {
    /// Creates a hasher with the given seed.
    ///
    /// MurmurHash3 takes a 32-bit seed; the low 32 bits of `seed` are used.
    pub fn with_seed(seed: u64) -> Self {
        Murmur3Hasher { seed: seed as u32 }
    }

    /// Returns the seed in use.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for Murmur3Hasher {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl ByteHasher for Murmur3Hasher {
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        let (h1, _) = mur3::murmurhash3_x64_128(bytes, self.seed);
        h1
    }
}
