// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stable bucketing for percentage rollouts.
//!
//! Every SDK and the server must agree on bucket assignment, so the hash is
//! MurmurHash3 x86 32-bit with seed 0 over `"{stickiness}:{flag_key}"`.
//!
//! The input bytes are the low 8 bits of each UTF-16 code unit, and the
//! length is the number of code units. This is what the JavaScript SDKs hash,
//! and it equals the UTF-8 bytes for ASCII input.

use std::io::Cursor;

use murmur3::murmur3_32;

const SEED: u32 = 0;

/// MurmurHash3 (x86, 32-bit) of `key`, one byte per UTF-16 code unit.
pub fn murmurhash3(key: &str) -> u32 {
	let units: Vec<u8> = key.encode_utf16().map(|unit| (unit & 0xff) as u8).collect();
	// Reading from an in-memory cursor cannot fail.
	murmur3_32(&mut Cursor::new(units), SEED).unwrap_or(0)
}

/// Maps a stickiness value and flag key to a bucket in `0..100`.
pub fn bucket(stickiness_value: &str, flag_key: &str) -> u32 {
	murmurhash3(&format!("{stickiness_value}:{flag_key}")) % 100
}


#[cfg(test)]
mod proptest_tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn bucket_is_deterministic(user_id in ".{0,64}", flag_key in "[a-z][a-z0-9_.-]{0,49}") {
			prop_assert_eq!(bucket(&user_id, &flag_key), bucket(&user_id, &flag_key));
		}

		#[test]
		fn ascii_hashes_like_utf8_bytes(key in "[ -~]{0,64}") {
			let utf8 = murmur3_32(&mut Cursor::new(key.as_bytes()), SEED).unwrap();
			prop_assert_eq!(murmurhash3(&key), utf8);
		}

		#[test]
		fn bucket_is_in_range(user_id in ".{0,64}", flag_key in ".{0,64}") {
			prop_assert!(bucket(&user_id, &flag_key) < 100);
		}
	}
}
