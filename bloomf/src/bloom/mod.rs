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

//! Bloom filter over byte sequences.
//!
//! A Bloom filter answers "was this element inserted?" with either "definitely not" or
//! "probably". It never reports a false negative; the false positive rate is chosen at
//! construction from the expected number of elements.
//!
//! # Usage
//!
//! ```rust
//! use bloomf::bloom::BloomFilter;
//!
//! // Sized for 10,000 elements at a 1% false positive rate.
//! let mut filter = BloomFilter::with_default_hasher(10_000, 0.01).unwrap();
//!
//! filter.insert(b"apple");
//! filter.insert(b"banana");
//!
//! assert!(filter.contains(b"apple"));
//! assert_eq!(filter.len(), 2);
//! ```
//!
//! # Sizing
//!
//! The bit vector holds `n * -ln(p) / ln(2)^2` bits, rounded up to the next power of two and
//! never fewer than 1024. Because the width is a power of two, every probe is reduced into range
//! with a mask instead of a modulo. The number of probes is `floor(0.7 * m / n)`, at least 2.
//!
//! # Trading space for accuracy
//!
//! [`BloomFilter::compress`] folds the upper half of the bit vector onto the lower half. Memory
//! halves and the false positive rate roughly doubles; nothing that was present disappears.
//! [`BloomFilter::merge`] ORs two filters of the same shape, producing the filter of the union.
//!
//! # Persistence
//!
//! The hash function is never written out. Reading a filter back requires the same hasher it was
//! built with:
//!
//! ```rust
//! use bloomf::bloom::BloomFilter;
//! use bloomf::hash::Murmur3Hasher;
//!
//! let mut filter = BloomFilter::with_default_hasher(100, 0.01).unwrap();
//! filter.insert(b"key");
//!
//! let bytes = filter.serialize();
//! let restored = BloomFilter::deserialize(&bytes, Murmur3Hasher::default()).unwrap();
//! assert!(restored.contains(b"key"));
//! ```
//!
//! # Concurrency
//!
//! Mutating operations take `&mut self`. Share a filter across threads behind a lock of your
//! choosing.

mod bitvec;
mod serialization;
mod sketch;

pub use self::bitvec::BitVector;
pub use self::sketch::BloomFilter;
pub use self::sketch::derive_num_hashes;
pub use self::sketch::filter_bits;
pub use self::sketch::MAX_NUM_BITS;
pub use self::sketch::MIN_NUM_BITS;
