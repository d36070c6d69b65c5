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

//! Hash strategies for turning byte sequences into the 64-bit digest a filter probes with.
//!
//! A [`BloomFilter`](crate::bloom::BloomFilter) never owns the hash algorithm itself; it is handed
//! a [`ByteHasher`] at construction and again on every deserialization. Any closure or function
//! pointer of type `Fn(&[u8]) -> u64` is a `ByteHasher`, so callers can plug in whatever
//! general-purpose non-cryptographic hash they already use:
//!
//! ```rust
//! use bloomf::bloom::BloomFilter;
//!
//! fn fnv1a(bytes: &[u8]) -> u64 {
//!     bytes.iter().fold(0xcbf29ce484222325, |h, &b| {
//!         (h ^ u64::from(b)).wrapping_mul(0x100000001b3)
//!     })
//! }
//!
//! let mut filter = BloomFilter::new(1000, 0.01, fnv1a).unwrap();
//! filter.insert(b"apple");
//! assert!(filter.contains(b"apple"));
//! ```

mod murmurhash;

pub use self::murmurhash::Murmur3Hasher;

/// The seed 9001 is the conventional default update seed of the DataSketches libraries.
///
/// Two filters can only be merged, and a serialized filter can only be read back, when the
/// hasher and its seed are identical to the ones that set the bits.
pub const DEFAULT_SEED: u64 = 9001;

/// Maps a byte sequence to a 64-bit digest.
///
/// Implementations must be deterministic and stable for the whole lifetime of a filter,
/// including across serialization. Nothing at runtime can detect a changed hasher; lookups
/// simply stop meaning anything.
pub trait ByteHasher {
    /// Hashes `bytes` into 64 bits.
    fn hash_bytes(&self, bytes: &[u8]) -> u64;
}

impl<F> ByteHasher for F
where
    F: Fn(&[u8]) -> u64,
{
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        self(bytes)
    }
}
