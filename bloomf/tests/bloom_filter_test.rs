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

use bloomf::bloom::BloomFilter;
use bloomf::bloom::filter_bits;
use bloomf::hash::Murmur3Hasher;
use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::eq;
use googletest::prelude::le;

fn member(i: u64) -> Vec<u8> {
    format!("member-{i}").into_bytes()
}

fn absent(i: u64) -> Vec<u8> {
    format!("absent-{i}").into_bytes()
}

fn filled(capacity: u64, rate: f64, n: u64) -> BloomFilter {
    let mut filter = BloomFilter::with_default_hasher(capacity, rate).unwrap();
    for i in 0..n {
        filter.insert(&member(i));
    }
    filter
}

#[test]
fn test_no_false_negatives() {
    let filter = filled(10_000, 0.01, 10_000);
    for i in 0..10_000 {
        assert!(filter.contains(&member(i)), "lost member-{i}");
    }
}

#[test]
fn test_no_false_negatives_when_overfilled() {
    // Ten times the capacity: the false positive rate explodes but nothing is lost.
    let filter = filled(1_000, 0.01, 10_000);
    for i in 0..10_000 {
        assert!(filter.contains(&member(i)));
    }
}

#[test]
fn test_false_positive_rate_is_bounded() {
    let rate = 0.01;
    let filter = filled(10_000, rate, 10_000);

    let trials = 100_000;
    let false_positives = (0..trials).filter(|&i| filter.contains(&absent(i))).count();
    let observed = false_positives as f64 / trials as f64;

    assert_that!(observed, le(2.0 * rate));
    assert_that!(filter.estimated_fpp(), le(2.0 * rate));
}

#[test]
fn test_sizing_is_power_of_two() {
    let mut capacity = 1;
    while capacity <= 10_000_000 {
        for rate in [0.9, 0.5, 0.1, 0.05, 0.01, 0.001, 0.0001] {
            let bits = filter_bits(capacity, rate).unwrap();
            assert!(bits.is_power_of_two(), "filter_bits({capacity}, {rate}) = {bits}");
            assert!(bits >= 1024);
        }
        capacity *= 3;
    }
}

#[test]
fn test_tiny_filters_use_the_floor() {
    for (capacity, rate) in [(1, 0.5), (1, 0.001), (10, 0.1), (20, 0.01), (100, 0.5)] {
        assert_that!(filter_bits(capacity, rate).unwrap(), eq(1024));
    }
}

#[test]
fn test_invalid_construction() {
    let err = BloomFilter::with_default_hasher(0, 0.01).unwrap_err();
    assert_that!(err.message(), contains_substring("capacity"));

    let err = BloomFilter::with_default_hasher(100, 0.0).unwrap_err();
    assert_that!(err.message(), contains_substring("false_positive_rate"));

    let err = BloomFilter::with_default_hasher(100, f64::INFINITY).unwrap_err();
    assert_that!(err.message(), contains_substring("false_positive_rate"));
}

#[test]
fn test_repeated_insert_counts_once() {
    let mut filter = BloomFilter::with_default_hasher(1000, 0.01).unwrap();
    assert!(!filter.insert(b"apple"));
    for _ in 0..9 {
        assert!(filter.insert(b"apple"));
    }
    assert_that!(filter.len(), eq(1));

    filter.insert(b"banana");
    assert_that!(filter.len(), eq(2));
}

#[test]
fn test_merge_is_union() {
    let a = filled(5_000, 0.01, 2_000);
    let mut b = BloomFilter::with_default_hasher(5_000, 0.01).unwrap();
    for i in 2_000..4_000 {
        b.insert(&member(i));
    }

    let probes: Vec<Vec<u8>> = (0..4_000).map(member).chain((0..4_000).map(absent)).collect();
    let expected: Vec<bool> = probes
        .iter()
        .map(|p| a.contains(p) || b.contains(p))
        .collect();

    let mut merged = a.clone();
    merged.merge(&b).unwrap();
    for (probe, was_present) in probes.iter().zip(expected) {
        if was_present {
            assert!(merged.contains(probe));
        }
    }
    for i in 0..4_000 {
        assert!(merged.contains(&member(i)));
    }
    // The count is not a union cardinality.
    assert_that!(merged.len(), eq(a.len()));
}

#[test]
fn test_merge_rejects_mismatched_width() {
    let mut small = BloomFilter::with_default_hasher(100, 0.01).unwrap();
    let large = BloomFilter::with_default_hasher(100_000, 0.01).unwrap();

    let err = small.merge(&large).unwrap_err();
    assert_that!(err.message(), contains_substring("incompatible"));
    assert_that!(err.to_string(), contains_substring("other_num_bits: 1048576"));
}

#[test]
fn test_compress_is_monotone() {
    let mut filter = filled(10_000, 0.01, 10_000);
    let probes: Vec<Vec<u8>> = (0..10_000).map(member).chain((0..20_000).map(absent)).collect();
    let before: Vec<bool> = probes.iter().map(|p| filter.contains(p)).collect();
    let bits_before = filter.num_bits();
    let len_before = filter.len();

    filter.compress().unwrap();
    assert_that!(filter.num_bits(), eq(bits_before / 2));
    assert_that!(filter.len(), eq(len_before));
    for (probe, was_present) in probes.iter().zip(before) {
        if was_present {
            assert!(filter.contains(probe));
        }
    }

    // Keep inserting after compression: new elements mask against the narrower width.
    filter.insert(b"late arrival");
    assert!(filter.contains(b"late arrival"));
}

#[test]
fn test_compress_raises_false_positive_rate() {
    let mut filter = filled(10_000, 0.01, 10_000);
    let fpp_before = filter.estimated_fpp();
    filter.compress().unwrap();
    filter.compress().unwrap();
    assert!(filter.estimated_fpp() > fpp_before);
}

#[test]
fn test_reset_clears_everything() {
    let mut filter = filled(1_000, 0.01, 1_000);
    filter.reset();

    assert_that!(filter.len(), eq(0));
    assert_that!(filter.bits_used(), eq(0));
    assert!(filter.is_empty());
    for i in 0..1_000 {
        assert!(!filter.contains(&member(i)));
    }
    assert_that!(filter.capacity(), eq(1_000));
    assert_that!(filter.num_bits(), eq(16_384));
}

#[test]
fn test_custom_hasher() {
    fn fnv1a(bytes: &[u8]) -> u64 {
        bytes.iter().fold(0xcbf29ce484222325, |h, &b| {
            (h ^ u64::from(b)).wrapping_mul(0x100000001b3)
        })
    }

    let mut filter = BloomFilter::new(1_000, 0.01, fnv1a).unwrap();
    for i in 0..1_000 {
        filter.insert(&member(i));
    }
    for i in 0..1_000 {
        assert!(filter.contains(&member(i)));
    }
}

#[test]
fn test_seeded_hashers_give_different_layouts() {
    let mut a = BloomFilter::new(100, 0.01, Murmur3Hasher::with_seed(1)).unwrap();
    let mut b = BloomFilter::new(100, 0.01, Murmur3Hasher::with_seed(2)).unwrap();
    a.insert(b"apple");
    b.insert(b"apple");
    assert_ne!(a.bit_vector(), b.bit_vector());
}
