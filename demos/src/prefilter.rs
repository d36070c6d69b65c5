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

//! Uses a Bloom filter as a pre-filter in front of a slow key-value lookup.
//!
//! Run with `RUST_LOG=debug` to see the filter's own events.

use std::collections::HashMap;

use bloomf::bloom::BloomFilter;
use bloomf::hash::Murmur3Hasher;
use tracing_subscriber::EnvFilter;

/// Stands in for a disk or network backed store.
struct SlowStore {
    data: HashMap<String, String>,
    reads: usize,
}

impl SlowStore {
    fn get(&mut self, key: &str) -> Option<&String> {
        self.reads += 1;
        self.data.get(key)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let capacity = 10_000;
    let mut filter = BloomFilter::with_default_hasher(capacity, 0.01).unwrap();
    let mut store = SlowStore {
        data: HashMap::new(),
        reads: 0,
    };

    for i in 0..capacity {
        let key = format!("user:{i}");
        filter.insert(key.as_bytes());
        store.data.insert(key, format!("profile #{i}"));
    }

    println!(
        "Filter: {} bits, {} hashes, {} inserted",
        filter.num_bits(),
        filter.num_hashes(),
        filter.len()
    );
    println!("Load factor: {:.3}", filter.load_factor());
    println!("Est. FPP: {:.4}%", filter.estimated_fpp() * 100.0);

    // Half the lookups hit, half miss.
    let mut hits = 0;
    let mut skipped = 0;
    for i in 0..2 * capacity {
        let key = format!("user:{i}");
        if !filter.contains(key.as_bytes()) {
            skipped += 1;
            continue;
        }
        if store.get(&key).is_some() {
            hits += 1;
        }
    }
    let wasted = store.reads - hits;
    println!("\nLookups: {}", 2 * capacity);
    println!("Skipped by the filter: {skipped}");
    println!("Store reads: {} ({hits} hits, {wasted} false positives)", store.reads);

    println!("\nCompressing...");
    filter.compress().unwrap();
    println!(
        "Filter: {} bits, est. FPP: {:.4}%",
        filter.num_bits(),
        filter.estimated_fpp() * 100.0
    );

    println!("\nSerializing filter...");
    let bytes = filter.serialize();
    println!("Serialized size: {} bytes", bytes.len());

    let restored = BloomFilter::deserialize(&bytes, Murmur3Hasher::default()).unwrap();
    println!("Restored: {restored:?}");
    println!("Still contains user:42: {}", restored.contains(b"user:42"));
}
