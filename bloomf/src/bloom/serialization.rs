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

//! Binary layout constants for serialized Bloom filters.
//!
//! ```text
//! Long || Start Byte Adr:
//! Adr:
//!      ||    7   |    6   |    5   |    4   |    3   |    2   |    1   |     0          |
//!  0   ||------------reserved (0)----------|  Flags | FamID  | SerVer | Preamble_Longs |
//!  1   ||----------------------------capacity (N, i64)----------------------------------|
//!  2   ||-----------------------------count (i64)----------------------------------------|
//!  3   ||-------num_hashes (K, u32)--------|-------num_bits (M, u32)---------------------|
//!  4   ||----------------------------num_words (u64)-------------------------------------|
//!  5+  ||----------------------------bit words (u64 each, omitted when empty)-----------|
//! ```
//!
//! All multi-byte fields are little-endian.

pub(super) const PREAMBLE_LONGS: u8 = 5;
pub(super) const SERIAL_VERSION: u8 = 1;
pub(super) const BLOOMF_FAMILY_ID: u8 = 25;
pub(super) const FLAGS_IS_EMPTY: u8 = 1 << 0;
pub(super) const LONG_SIZE_BYTES: usize = 8;
