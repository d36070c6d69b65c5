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

use std::f64::consts::LN_2;
use std::fmt;
use std::io::Read;
use std::io::Write;

use byteorder::LE;
use byteorder::ReadBytesExt;

use crate::bloom::bitvec::BitVector;
use crate::bloom::bitvec::WORD_BITS;
use crate::bloom::serialization::BLOOMF_FAMILY_ID;
use crate::bloom::serialization::FLAGS_IS_EMPTY;
use crate::bloom::serialization::LONG_SIZE_BYTES;
use crate::bloom::serialization::PREAMBLE_LONGS;
use crate::bloom::serialization::SERIAL_VERSION;
use crate::error::Error;
use crate::hash::ByteHasher;
use crate::hash::Murmur3Hasher;

/// Smallest bit vector the sizing formula will produce.
pub const MIN_NUM_BITS: u32 = 1024;
/// Largest bit vector a filter can address with 32-bit probe positions.
pub const MAX_NUM_BITS: u32 = 1 << 31;

const MIN_NUM_HASHES: u32 = 2;

/// A Bloom filter over byte sequences.
///
/// Provides membership queries with:
/// - No false negatives (inserted elements always return `true`)
/// - A false positive rate chosen at construction
/// - A power-of-two bit vector that can be halved with [`compress`](Self::compress)
///
/// The hash function is an injected [`ByteHasher`]; it is not part of the filter's state and is
/// never serialized.
#[derive(Clone)]
pub struct BloomFilter<H = Murmur3Hasher> {
    /// Expected number of elements (n)
    capacity: u64,
    /// Insertions that flipped at least one bit
    count: u64,
    /// Width of the bit vector in bits (m), always a power of two
    num_bits: u32,
    /// Probes per element (k)
    num_hashes: u32,
    bits: BitVector,
    hasher: H,
}

impl<H: ByteHasher> BloomFilter<H> {
    /// Creates an empty filter sized for `capacity` elements at `false_positive_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
    /// `capacity` is 0, `false_positive_rate` is not in the open interval (0, 1), or the
    /// resulting bit vector would exceed [`MAX_NUM_BITS`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomf::bloom::BloomFilter;
    /// # use bloomf::hash::Murmur3Hasher;
    /// let filter = BloomFilter::new(10_000, 0.01, Murmur3Hasher::with_seed(7)).unwrap();
    /// assert_eq!(filter.num_bits(), 131_072);
    /// assert_eq!(filter.num_hashes(), 9);
    ///
    /// assert!(BloomFilter::new(0, 0.01, Murmur3Hasher::default()).is_err());
    /// assert!(BloomFilter::new(100, 1.0, Murmur3Hasher::default()).is_err());
    /// ```
    pub fn new(capacity: u64, false_positive_rate: f64, hasher: H) -> Result<Self, Error> {
        let num_bits = filter_bits(capacity, false_positive_rate)?;
        let num_hashes = derive_num_hashes(num_bits, capacity);

        tracing::debug!(
            capacity,
            false_positive_rate,
            num_bits,
            num_hashes,
            "created bloom filter"
        );

        Ok(BloomFilter {
            capacity,
            count: 0,
            num_bits,
            num_hashes,
            bits: BitVector::new(num_bits),
            hasher,
        })
    }

    // ========================================================================
    // Update and Query Operations
    // ========================================================================

    /// Inserts `element`, returning whether it was already considered present.
    ///
    /// **The return value is probabilistic.** `false` is certain: at least one of the element's
    /// bits was unset, so it had never been inserted, and [`len`](Self::len) is incremented.
    /// `true` only means all of its bits were already set, which other elements may have done;
    /// it is a false positive with the same probability as [`contains`](Self::contains).
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomf::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_default_hasher(100, 0.01).unwrap();
    ///
    /// assert!(!filter.insert(b"apple")); // first insertion
    /// assert!(filter.insert(b"apple")); // now (probably) present
    /// assert_eq!(filter.len(), 1);
    /// ```
    pub fn insert(&mut self, element: &[u8]) -> bool {
        let mut already_present = true;
        for bit in self.probes(element) {
            // Non short-circuiting: every probe must be set.
            already_present &= self.bits.test_and_set(bit);
        }
        if !already_present {
            self.count += 1;
        }
        already_present
    }

    /// Tests whether `element` is possibly in the set.
    ///
    /// Returns:
    /// - `true`: the element was **possibly** inserted (or this is a false positive)
    /// - `false`: the element was **definitely not** inserted
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomf::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_default_hasher(100, 0.01).unwrap();
    /// filter.insert(b"apple");
    ///
    /// assert!(filter.contains(b"apple"));
    /// assert!(!filter.contains(b"grape")); // never inserted (probably)
    /// ```
    pub fn contains(&self, element: &[u8]) -> bool {
        self.probes(element).all(|bit| self.bits.get(bit))
    }

    /// Clears every bit and sets [`len`](Self::len) back to 0.
    ///
    /// Capacity, width, probe count and hasher are kept.
    pub fn reset(&mut self) {
        self.bits.clear();
        self.count = 0;
        tracing::debug!(num_bits = self.num_bits, "reset bloom filter");
    }

    // ========================================================================
    // Set Operations
    // ========================================================================

    /// Merges `other` into this filter via bitwise OR.
    ///
    /// Afterwards this filter recognizes every element either filter recognized. The insertion
    /// count is left untouched: it no longer tracks the size of the union, so callers that need
    /// an accurate count must keep their own.
    ///
    /// Both filters must have been built with the same hasher; that cannot be checked here.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if the
    /// filters differ in width or probe count (see [`is_compatible`](Self::is_compatible)).
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomf::bloom::BloomFilter;
    /// let mut f1 = BloomFilter::with_default_hasher(100, 0.01).unwrap();
    /// let mut f2 = BloomFilter::with_default_hasher(100, 0.01).unwrap();
    /// f1.insert(b"a");
    /// f2.insert(b"b");
    ///
    /// f1.merge(&f2).unwrap();
    /// assert!(f1.contains(b"a"));
    /// assert!(f1.contains(b"b"));
    /// ```
    pub fn merge(&mut self, other: &BloomFilter<H>) -> Result<(), Error> {
        if !self.is_compatible(other) {
            tracing::warn!(
                num_bits = self.num_bits,
                num_hashes = self.num_hashes,
                other_num_bits = other.num_bits,
                other_num_hashes = other.num_hashes,
                "rejected merge of incompatible bloom filters"
            );
            return Err(
                Error::invalid_argument("cannot merge incompatible Bloom filters")
                    .with_context("num_bits", self.num_bits)
                    .with_context("other_num_bits", other.num_bits)
                    .with_context("num_hashes", self.num_hashes)
                    .with_context("other_num_hashes", other.num_hashes),
            );
        }

        self.bits.union_with(&other.bits);
        tracing::debug!(num_bits = self.num_bits, "merged bloom filter");
        Ok(())
    }

    /// Halves the memory used by the filter at the cost of a higher false positive rate.
    ///
    /// Word `j` of the new bit vector is the OR of old words `j` and `j + new_width`. Every
    /// element that was present stays present; the false positive rate roughly doubles. The
    /// insertion count and probe count are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if the
    /// filter is already a single 64-bit word wide. The filter is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the bit vector's word count is not a power of two. Construction and
    /// deserialization never produce such a filter, so reaching it means the state is corrupt.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomf::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_default_hasher(100, 0.01).unwrap();
    /// filter.insert(b"apple");
    ///
    /// filter.compress().unwrap();
    /// assert_eq!(filter.num_bits(), 512);
    /// assert!(filter.contains(b"apple"));
    /// ```
    pub fn compress(&mut self) -> Result<(), Error> {
        if self.bits.num_words() <= 1 {
            return Err(
                Error::invalid_argument("cannot compress a filter narrower than two words")
                    .with_context("num_bits", self.num_bits),
            );
        }

        self.bits.fold_in_half();
        self.num_bits /= 2;
        tracing::debug!(num_bits = self.num_bits, "compressed bloom filter");
        Ok(())
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns the number of insertions that were not already considered present.
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Returns whether no bit is set.
    ///
    /// Unlike `len() == 0` this also sees elements brought in by [`merge`](Self::merge).
    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// Returns the expected number of elements the filter was sized for.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns the width of the bit vector (m).
    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }

    /// Returns the number of probes per element (k).
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.bits.count_ones()
    }

    /// Returns the fraction of bits set.
    ///
    /// Values approaching 0.5 mean the filter is saturating.
    pub fn load_factor(&self) -> f64 {
        self.bits_used() as f64 / f64::from(self.num_bits)
    }

    /// Estimates the current false positive probability as `(1 - e^(-k * load))^k`.
    ///
    /// This assumes uniformly distributed bits and is only an approximation.
    pub fn estimated_fpp(&self) -> f64 {
        let k = f64::from(self.num_hashes);
        // The load factor already equals 1 - e^(-k*n/m) for a uniformly filled vector.
        self.load_factor().powf(k)
    }

    /// Checks whether `other` can be merged into this filter.
    ///
    /// Filters are compatible if they have the same width and the same number of probes.
    pub fn is_compatible(&self, other: &BloomFilter<H>) -> bool {
        self.num_bits == other.num_bits && self.num_hashes == other.num_hashes
    }

    /// Returns the hasher the filter probes with.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns the underlying bit vector.
    pub fn bit_vector(&self) -> &BitVector {
        &self.bits
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serializes the filter to a byte vector.
    ///
    /// The hasher is not included.
    pub fn serialize(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let payload_size = if is_empty {
            0
        } else {
            self.bits.num_words() * LONG_SIZE_BYTES
        };
        let mut bytes = Vec::with_capacity(PREAMBLE_LONGS as usize * LONG_SIZE_BYTES + payload_size);

        bytes.push(PREAMBLE_LONGS);
        bytes.push(SERIAL_VERSION);
        bytes.push(BLOOMF_FAMILY_ID);
        bytes.push(if is_empty { FLAGS_IS_EMPTY } else { 0 });
        bytes.extend_from_slice(&0u32.to_le_bytes());

        // Both fit: capacity is validated against i64::MAX and count only grows when a bit flips.
        bytes.extend_from_slice(&(self.capacity as i64).to_le_bytes());
        bytes.extend_from_slice(&(self.count as i64).to_le_bytes());
        bytes.extend_from_slice(&self.num_bits.to_le_bytes());
        bytes.extend_from_slice(&self.num_hashes.to_le_bytes());
        bytes.extend_from_slice(&(self.bits.num_words() as u64).to_le_bytes());

        if !is_empty {
            for word in self.bits.as_words() {
                bytes.extend_from_slice(&word.to_le_bytes());
            }
        }
        bytes
    }

    /// Writes the serialized filter to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Io`](crate::error::ErrorKind::Io) if the writer fails.
    pub fn serialize_into<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writer
            .write_all(&self.serialize())
            .map_err(|err| Error::write_failed("bloom filter", err))
    }

    /// Deserializes a filter from `bytes`, probing with `hasher` from now on.
    ///
    /// `hasher` must be the hasher the filter was built with.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData) if the data is
    /// truncated, was not written by [`serialize`](Self::serialize), or describes an impossible
    /// filter.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomf::bloom::BloomFilter;
    /// # use bloomf::hash::Murmur3Hasher;
    /// let mut original = BloomFilter::with_default_hasher(100, 0.01).unwrap();
    /// original.insert(b"test");
    /// let bytes = original.serialize();
    ///
    /// let restored = BloomFilter::deserialize(&bytes, Murmur3Hasher::default()).unwrap();
    /// assert_eq!(original, restored);
    ///
    /// assert!(BloomFilter::deserialize(&bytes[..20], Murmur3Hasher::default()).is_err());
    /// ```
    pub fn deserialize(bytes: &[u8], hasher: H) -> Result<Self, Error> {
        Self::deserialize_from(bytes, hasher)
    }

    /// Reads a serialized filter from `reader`, probing with `hasher` from now on.
    ///
    /// Nothing is returned unless the whole filter was read and validated.
    ///
    /// # Errors
    ///
    /// As [`deserialize`](Self::deserialize); a failing reader is reported as
    /// [`ErrorKind::Io`](crate::error::ErrorKind::Io).
    pub fn deserialize_from<R: Read>(mut reader: R, hasher: H) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |err| Error::read_failed(tag, err)
        }

        let preamble_longs = reader.read_u8().map_err(make_error("preamble_longs"))?;
        let serial_version = reader.read_u8().map_err(make_error("serial_version"))?;
        let family_id = reader.read_u8().map_err(make_error("family_id"))?;
        let flags = reader.read_u8().map_err(make_error("flags"))?;
        reader.read_u32::<LE>().map_err(make_error("reserved"))?;

        if family_id != BLOOMF_FAMILY_ID {
            return Err(Error::invalid_family(
                BLOOMF_FAMILY_ID,
                family_id,
                "BloomFilter",
            ));
        }
        if serial_version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(
                SERIAL_VERSION,
                serial_version,
            ));
        }
        if preamble_longs != PREAMBLE_LONGS {
            return Err(Error::invalid_preamble_longs(PREAMBLE_LONGS, preamble_longs));
        }

        let capacity = reader.read_i64::<LE>().map_err(make_error("capacity"))?;
        let count = reader.read_i64::<LE>().map_err(make_error("count"))?;
        let num_bits = reader.read_u32::<LE>().map_err(make_error("num_bits"))?;
        let num_hashes = reader.read_u32::<LE>().map_err(make_error("num_hashes"))?;
        let num_words = reader.read_u64::<LE>().map_err(make_error("num_words"))?;

        if capacity <= 0 {
            return Err(Error::deserial(format!(
                "capacity must be positive, got {capacity}"
            )));
        }
        if count < 0 {
            return Err(Error::deserial(format!(
                "count must not be negative, got {count}"
            )));
        }
        if !num_bits.is_power_of_two() || !(WORD_BITS..=MAX_NUM_BITS).contains(&num_bits) {
            return Err(Error::deserial(format!(
                "num_bits must be a power of two in [{WORD_BITS}, {MAX_NUM_BITS}], got {num_bits}"
            )));
        }
        if num_hashes < MIN_NUM_HASHES {
            return Err(Error::deserial(format!(
                "num_hashes must be at least {MIN_NUM_HASHES}, got {num_hashes}"
            )));
        }
        let expected_words = u64::from(num_bits / WORD_BITS);
        if num_words != expected_words {
            return Err(Error::deserial(format!(
                "word count {num_words} is inconsistent with {num_bits} bits"
            ))
            .with_context("expected_words", expected_words));
        }

        let mut words = vec![0u64; expected_words as usize];
        if flags & FLAGS_IS_EMPTY == 0 {
            reader
                .read_u64_into::<LE>(&mut words)
                .map_err(make_error("bit_array"))?;
        }

        tracing::debug!(num_bits, num_hashes, count, "deserialized bloom filter");

        Ok(BloomFilter {
            capacity: capacity as u64,
            count: count as u64,
            num_bits,
            num_hashes,
            bits: BitVector::from_words(words),
            hasher,
        })
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Splits the element's digest into two 32-bit halves and walks the k probe positions.
    fn probes(&self, element: &[u8]) -> Probes {
        let hash = self.hasher.hash_bytes(element);
        Probes {
            h1: hash as u32,
            h2: (hash >> 32) as u32,
            mask: self.num_bits - 1,
            next: 0,
            num_hashes: self.num_hashes,
        }
    }
}

impl BloomFilter<Murmur3Hasher> {
    /// Creates a filter probing with [`Murmur3Hasher::default()`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`new`](Self::new).
    pub fn with_default_hasher(capacity: u64, false_positive_rate: f64) -> Result<Self, Error> {
        Self::new(capacity, false_positive_rate, Murmur3Hasher::default())
    }
}

/// Double hashing: probe `i` is `(h1 + i * h2) mod m`, computed with a mask since m is a power of
/// two.
struct Probes {
    h1: u32,
    h2: u32,
    mask: u32,
    next: u32,
    num_hashes: u32,
}

impl Iterator for Probes {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.next == self.num_hashes {
            return None;
        }
        let bit = self.h1.wrapping_add(self.next.wrapping_mul(self.h2)) & self.mask;
        self.next += 1;
        Some(bit)
    }
}

/// Returns the number of bits for `capacity` elements at `false_positive_rate`.
///
/// Computes `capacity * -ln(rate) / ln(2)^2`, rounds it up to the next power of two and clamps
/// it to at least [`MIN_NUM_BITS`].
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if
/// `capacity` is 0, `false_positive_rate` is not in the open interval (0, 1), or the result
/// would exceed [`MAX_NUM_BITS`].
///
/// # Examples
///
/// ```
/// # use bloomf::bloom::filter_bits;
/// assert_eq!(filter_bits(1, 0.5).unwrap(), 1024);
/// assert_eq!(filter_bits(1000, 0.01).unwrap(), 16_384);
/// ```
pub fn filter_bits(capacity: u64, false_positive_rate: f64) -> Result<u32, Error> {
    validate_params(capacity, false_positive_rate)?;

    let bits = capacity as f64 * -false_positive_rate.ln() / (LN_2 * LN_2);
    // Float to int casts saturate, so an absurd request lands above MAX_NUM_BITS.
    match (bits as u64).checked_next_power_of_two() {
        Some(m) if m <= u64::from(MAX_NUM_BITS) => Ok((m as u32).max(MIN_NUM_BITS)),
        _ => Err(
            Error::invalid_argument(format!("filter must not exceed {MAX_NUM_BITS} bits"))
                .with_context("capacity", capacity)
                .with_context("false_positive_rate", false_positive_rate),
        ),
    }
}

/// Returns the number of probes for a `num_bits` wide filter holding `capacity` elements.
///
/// `0.7 * m / n` approximates the optimal `ln(2) * m / n`; the result is at least 2.
///
/// ```
/// # use bloomf::bloom::derive_num_hashes;
/// assert_eq!(derive_num_hashes(131_072, 10_000), 9);
/// assert_eq!(derive_num_hashes(1024, 1000), 2);
/// ```
pub fn derive_num_hashes(num_bits: u32, capacity: u64) -> u32 {
    let k = 0.7 * f64::from(num_bits) / capacity as f64;
    (k as u32).max(MIN_NUM_HASHES)
}

fn validate_params(capacity: u64, false_positive_rate: f64) -> Result<(), Error> {
    if capacity == 0 || capacity > i64::MAX as u64 {
        return Err(Error::invalid_argument(format!(
            "capacity must be in [1, {}], got {capacity}",
            i64::MAX
        )));
    }
    // Written so that NaN fails too.
    if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
        return Err(Error::invalid_argument(format!(
            "false_positive_rate must be between 0.0 and 1.0 (exclusive), got {false_positive_rate}"
        )));
    }
    Ok(())
}

impl<H> fmt::Debug for BloomFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("capacity", &self.capacity)
            .field("count", &self.count)
            .field("num_bits", &self.num_bits)
            .field("num_hashes", &self.num_hashes)
            .finish_non_exhaustive()
    }
}

/// Filters are equal when their state is; the hasher is not state and is not compared.
impl<H> PartialEq for BloomFilter<H> {
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity
            && self.count == other.count
            && self.num_bits == other.num_bits
            && self.num_hashes == other.num_hashes
            && self.bits == other.bits
    }
}

// ============================================================================
// Tests
// ============================================================================
