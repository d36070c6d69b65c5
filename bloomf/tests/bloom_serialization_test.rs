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

use std::io;
use std::io::Cursor;

use bloomf::bloom::BloomFilter;
use bloomf::error::ErrorKind;
use bloomf::hash::Murmur3Hasher;
use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::eq;

fn sample_filter() -> BloomFilter {
    let mut filter = BloomFilter::with_default_hasher(1_000, 0.01).unwrap();
    for i in 0..500 {
        filter.insert(format!("key-{i}").as_bytes());
    }
    filter
}

fn load(bytes: &[u8]) -> Result<BloomFilter, bloomf::error::Error> {
    BloomFilter::deserialize(bytes, Murmur3Hasher::default())
}

#[test]
fn test_round_trip() {
    let filter = sample_filter();
    let restored = load(&filter.serialize()).unwrap();

    assert_eq!(filter, restored);
    assert_that!(restored.capacity(), eq(1_000));
    assert_that!(restored.len(), eq(filter.len()));
    assert_that!(restored.num_bits(), eq(filter.num_bits()));
    assert_that!(restored.num_hashes(), eq(filter.num_hashes()));

    for i in 0..2_000 {
        let key = format!("key-{i}");
        assert_eq!(filter.contains(key.as_bytes()), restored.contains(key.as_bytes()));
    }
}

#[test]
fn test_round_trip_empty() {
    let filter = BloomFilter::with_default_hasher(1_000, 0.01).unwrap();
    let bytes = filter.serialize();
    assert_that!(bytes.len(), eq(40));

    let restored = load(&bytes).unwrap();
    assert_eq!(filter, restored);
    assert!(restored.is_empty());
}

#[test]
fn test_round_trip_after_compress() {
    let mut filter = sample_filter();
    filter.compress().unwrap();

    let mut restored = load(&filter.serialize()).unwrap();
    assert_eq!(filter, restored);
    for i in 0..500 {
        assert!(restored.contains(format!("key-{i}").as_bytes()));
    }
    restored.compress().unwrap();
    assert_that!(restored.num_bits(), eq(filter.num_bits() / 2));
}

#[test]
fn test_restored_filter_keeps_counting() {
    let filter = sample_filter();
    let mut restored = load(&filter.serialize()).unwrap();
    assert!(restored.insert(b"key-0"));
    assert_that!(restored.len(), eq(filter.len()));
}

#[test]
fn test_stream_round_trip() {
    let first = sample_filter();
    let mut second = BloomFilter::with_default_hasher(10, 0.1).unwrap();
    second.insert(b"solo");

    let mut sink = Vec::new();
    first.serialize_into(&mut sink).unwrap();
    second.serialize_into(&mut sink).unwrap();

    let mut source = Cursor::new(sink);
    let first_back = BloomFilter::deserialize_from(&mut source, Murmur3Hasher::default()).unwrap();
    let second_back = BloomFilter::deserialize_from(&mut source, Murmur3Hasher::default()).unwrap();
    assert_eq!(first, first_back);
    assert_eq!(second, second_back);
    assert!(second_back.contains(b"solo"));
}

#[test]
fn test_truncated_data() {
    let bytes = sample_filter().serialize();
    for len in [0, 1, 7, 8, 20, 39, 40, 41, bytes.len() - 1] {
        let err = load(&bytes[..len]).unwrap_err();
        assert_that!(err.kind(), eq(ErrorKind::InvalidData));
        assert_that!(err.message(), contains_substring("insufficient data"));
    }
}

#[test]
fn test_wrong_family() {
    let mut bytes = sample_filter().serialize();
    bytes[2] = 21;
    let err = load(&bytes).unwrap_err();
    assert_that!(err.message(), contains_substring("invalid family"));
}

#[test]
fn test_wrong_serial_version() {
    let mut bytes = sample_filter().serialize();
    bytes[1] = 2;
    let err = load(&bytes).unwrap_err();
    assert_that!(err.message(), contains_substring("unsupported serial version"));
}

#[test]
fn test_wrong_preamble() {
    let mut bytes = sample_filter().serialize();
    bytes[0] = 4;
    let err = load(&bytes).unwrap_err();
    assert_that!(err.message(), contains_substring("invalid preamble longs"));
}

#[test]
fn test_invalid_fields() {
    let bytes = sample_filter().serialize();

    let corrupt = |offset: usize, value: &[u8]| {
        let mut bytes = bytes.clone();
        bytes[offset..offset + value.len()].copy_from_slice(value);
        load(&bytes).unwrap_err()
    };

    let err = corrupt(8, &0i64.to_le_bytes());
    assert_that!(err.message(), contains_substring("capacity must be positive"));

    let err = corrupt(8, &(-5i64).to_le_bytes());
    assert_that!(err.message(), contains_substring("capacity must be positive"));

    let err = corrupt(16, &(-1i64).to_le_bytes());
    assert_that!(err.message(), contains_substring("count must not be negative"));

    let err = corrupt(24, &10_000u32.to_le_bytes());
    assert_that!(err.message(), contains_substring("power of two"));

    let err = corrupt(24, &32u32.to_le_bytes());
    assert_that!(err.message(), contains_substring("power of two"));

    let err = corrupt(28, &1u32.to_le_bytes());
    assert_that!(err.message(), contains_substring("num_hashes"));

    let err = corrupt(32, &7u64.to_le_bytes());
    assert_that!(err.message(), contains_substring("inconsistent"));
    assert_that!(err.kind(), eq(ErrorKind::InvalidData));
}

#[test]
fn test_word_count_must_match_width() {
    // A claimed width twice as wide as the payload is rejected rather than padded.
    let mut bytes = sample_filter().serialize();
    bytes[24..28].copy_from_slice(&32_768u32.to_le_bytes());
    let err = load(&bytes).unwrap_err();
    assert_that!(err.message(), contains_substring("inconsistent"));
}

struct FailingWriter;

impl io::Write for FailingWriter {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct FailingReader;

impl io::Read for FailingReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("connection reset"))
    }
}

#[test]
fn test_sink_failure() {
    let err = sample_filter().serialize_into(FailingWriter).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::Io));
    assert_that!(err.to_string(), contains_substring("disk full"));
}

#[test]
fn test_source_failure() {
    let err = BloomFilter::deserialize_from(FailingReader, Murmur3Hasher::default()).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::Io));
    assert_that!(err.to_string(), contains_substring("connection reset"));
}
