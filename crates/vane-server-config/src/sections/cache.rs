// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Snapshot cache configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_SNAPSHOT_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
	pub snapshot_ttl_secs: u64,
}

impl CacheConfig {
	pub fn snapshot_ttl(&self) -> Duration {
		Duration::from_secs(self.snapshot_ttl_secs)
	}
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			snapshot_ttl_secs: DEFAULT_SNAPSHOT_TTL_SECS,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfigLayer {
	#[serde(default)]
	pub snapshot_ttl_secs: Option<u64>,
}

impl CacheConfigLayer {
	pub fn merge(&mut self, other: CacheConfigLayer) {
		if other.snapshot_ttl_secs.is_some() {
			self.snapshot_ttl_secs = other.snapshot_ttl_secs;
		}
	}

	pub fn finalize(self) -> CacheConfig {
		CacheConfig {
			snapshot_ttl_secs: self.snapshot_ttl_secs.unwrap_or(DEFAULT_SNAPSHOT_TTL_SECS),
		}
	}
}
