// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Prefix carried by every generated environment API key.
pub const API_KEY_PREFIX: &str = "ff_";

/// Generates a new raw environment API key: `ff_` followed by 48 hex chars.
pub fn generate_api_key() -> String {
	let mut bytes = [0u8; 24];
	rand::thread_rng().fill_bytes(&mut bytes);
	format!("{API_KEY_PREFIX}{}", hex::encode(bytes))
}

/// Hashes an environment API key for storage and lookup.
///
/// Lookups go by hash, so the digest is unsalted SHA-256 rendered as
/// lowercase hex.
pub fn hash_api_key(key: &str) -> String {
	hex::encode(Sha256::digest(key.as_bytes()))
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
	let (scheme, token) = header.trim().split_once(' ')?;
	if !scheme.eq_ignore_ascii_case("bearer") {
		return None;
	}
	let token = token.trim();
	(!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hash_is_sha256_hex() {
		assert_eq!(
			hash_api_key("abc"),
			"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
		);
	}

	#[test]
	fn test_hash_is_deterministic() {
		assert_eq!(hash_api_key("ff_dev_key"), hash_api_key("ff_dev_key"));
		assert_ne!(hash_api_key("ff_dev_key"), hash_api_key("ff_prod_key"));
	}

	#[test]
	fn test_generated_keys_are_unique_and_prefixed() {
		let a = generate_api_key();
		let b = generate_api_key();
		assert!(a.starts_with(API_KEY_PREFIX));
		assert_eq!(a.len(), API_KEY_PREFIX.len() + 48);
		assert_ne!(a, b);
	}

	#[test]
	fn test_bearer_token() {
		assert_eq!(bearer_token("Bearer ff_123"), Some("ff_123"));
		assert_eq!(bearer_token("bearer  ff_123 "), Some("ff_123"));
		assert_eq!(bearer_token("Basic abc"), None);
		assert_eq!(bearer_token("Bearer "), None);
		assert_eq!(bearer_token("ff_123"), None);
	}
}
