// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared per-environment snapshot cache.
//!
//! Entries live in a keyed store with a fixed TTL. Each environment has two
//! keys: `env:{id}:snapshot` holding the snapshot and `env:{id}:version`
//! holding its version for cheap staleness checks. Concurrent rebuilds are not
//! serialized; the last `put` wins.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use vane_flags_core::Snapshot;

pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
enum CachedValue {
	Snapshot(Arc<Snapshot>),
	Version(u64),
}

#[derive(Debug)]
struct CacheEntry {
	value: CachedValue,
	expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct SnapshotCache {
	entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
	ttl: Duration,
}

fn snapshot_key(environment_id: &str) -> String {
	format!("env:{environment_id}:snapshot")
}

fn version_key(environment_id: &str) -> String {
	format!("env:{environment_id}:version")
}

impl Default for SnapshotCache {
	fn default() -> Self {
		Self::new(DEFAULT_SNAPSHOT_TTL)
	}
}

impl SnapshotCache {
	pub fn new(ttl: Duration) -> Self {
		Self {
			entries: Arc::new(RwLock::new(HashMap::new())),
			ttl,
		}
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	async fn lookup(&self, key: &str) -> Option<CachedValue> {
		let entries = self.entries.read().await;
		entries
			.get(key)
			.filter(|entry| entry.expires_at > Instant::now())
			.map(|entry| entry.value.clone())
	}

	/// Cached snapshot, or `None` on a miss or after expiry.
	pub async fn get(&self, environment_id: &str) -> Option<Arc<Snapshot>> {
		match self.lookup(&snapshot_key(environment_id)).await {
			Some(CachedValue::Snapshot(snapshot)) => Some(snapshot),
			_ => None,
		}
	}

	/// Version of the cached snapshot, if one is cached.
	pub async fn get_version(&self, environment_id: &str) -> Option<u64> {
		match self.lookup(&version_key(environment_id)).await {
			Some(CachedValue::Version(version)) => Some(version),
			_ => None,
		}
	}

	pub async fn put(&self, environment_id: &str, snapshot: Arc<Snapshot>) {
		let expires_at = Instant::now() + self.ttl;
		let version = snapshot.version;
		let mut entries = self.entries.write().await;
		entries.retain(|_, entry| entry.expires_at > Instant::now());
		entries.insert(
			snapshot_key(environment_id),
			CacheEntry {
				value: CachedValue::Snapshot(snapshot),
				expires_at,
			},
		);
		entries.insert(
			version_key(environment_id),
			CacheEntry {
				value: CachedValue::Version(version),
				expires_at,
			},
		);
		debug!(env_id = %environment_id, version, "snapshot cached");
	}

	/// Drops both the snapshot and its version.
	pub async fn invalidate(&self, environment_id: &str) {
		let mut entries = self.entries.write().await;
		entries.remove(&snapshot_key(environment_id));
		entries.remove(&version_key(environment_id));
		debug!(env_id = %environment_id, "snapshot cache invalidated");
	}
}
