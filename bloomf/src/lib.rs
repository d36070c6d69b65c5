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

//! # bloomf
//!
//! A compact Bloom filter over byte sequences, meant to sit in front of an expensive exact lookup
//! such as a disk read or a network call.
//!
//! - [`bloom`]: the filter, its packed bit vector and the sizing functions.
//! - [`hash`]: the [`ByteHasher`](hash::ByteHasher) strategy and a MurmurHash3 default.
//! - [`error`]: the error type returned by fallible operations.
//!
//! ```rust
//! use bloomf::bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::with_default_hasher(1000, 0.01).unwrap();
//! filter.insert(b"user:42");
//!
//! if filter.contains(b"user:42") {
//!     // probably present: do the real lookup
//! }
//! assert!(!filter.contains(b"user:43"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod bloom;
pub mod error;
pub mod hash;
