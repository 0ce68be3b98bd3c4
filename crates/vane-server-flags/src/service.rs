// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Snapshot materialization and every flag write that affects it.
//!
//! Each write that creates a flag version, or changes which flags are live,
//! invalidates the environment's cached snapshot before returning.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use vane_flags_core::{
	etag_for_version, evaluate, EvaluationContext, EvaluationResult, FlagState, Snapshot,
};

use crate::cache::SnapshotCache;
use crate::error::{FlagsServerError, Result};
use crate::repository::{
	AuditAction, AuditEntry, AuditRecord, Environment, FlagVersion, FlagsRepository,
};
use crate::sdk_auth::{generate_api_key, hash_api_key};

/// Whether a snapshot read was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
	Hit,
	Miss,
}

impl CacheStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			CacheStatus::Hit => "HIT",
			CacheStatus::Miss => "MISS",
		}
	}
}

#[derive(Debug, Clone)]
pub enum SnapshotRead {
	/// The caller's entity tag is current.
	NotModified { etag: String, cache: CacheStatus },
	Fresh {
		snapshot: Arc<Snapshot>,
		etag: String,
		cache: CacheStatus,
	},
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagEvaluation {
	pub result: EvaluationResult,
	pub flag_version: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollbackOutcome {
	pub key: String,
	pub rolled_back_to: u64,
	pub version: FlagVersion,
}

/// A newly created environment and its raw API key, which is not stored.
#[derive(Debug, Clone)]
pub struct CreatedEnvironment {
	pub environment: Environment,
	pub api_key: String,
}

/// Whether an `If-None-Match` header value names `etag`.
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
	if_none_match
		.split(',')
		.map(str::trim)
		.any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

#[derive(Clone)]
pub struct SnapshotService {
	repository: Arc<dyn FlagsRepository>,
	cache: SnapshotCache,
}

impl SnapshotService {
	pub fn new(repository: Arc<dyn FlagsRepository>, cache: SnapshotCache) -> Self {
		Self { repository, cache }
	}

	pub fn repository(&self) -> &Arc<dyn FlagsRepository> {
		&self.repository
	}

	pub fn cache(&self) -> &SnapshotCache {
		&self.cache
	}

	/// Materializes the latest state of every live flag in an environment.
	///
	/// The snapshot version is the highest flag version included, or 0 when the
	/// environment has no live flags.
	#[instrument(skip(self))]
	pub async fn build_snapshot(&self, environment_id: &str) -> Result<Snapshot> {
		let flags = self.repository.list_non_archived_flags(environment_id).await?;
		let version = flags.iter().map(|f| f.version).max().unwrap_or(0);

		Ok(Snapshot {
			environment_id: environment_id.to_string(),
			version,
			flags: flags.into_iter().map(|f| (f.key, f.state)).collect(),
		})
	}

	/// Reads the environment snapshot, rebuilding and caching it on a miss.
	#[instrument(skip(self))]
	pub async fn read_snapshot(
		&self,
		environment_id: &str,
		if_none_match: Option<&str>,
	) -> Result<SnapshotRead> {
		if let Some(tag) = if_none_match {
			if let Some(version) = self.cache.get_version(environment_id).await {
				let etag = etag_for_version(version);
				if etag_matches(tag, &etag) {
					return Ok(SnapshotRead::NotModified {
						etag,
						cache: CacheStatus::Hit,
					});
				}
			}
		}

		let (snapshot, cache) = match self.cache.get(environment_id).await {
			Some(snapshot) => (snapshot, CacheStatus::Hit),
			None => {
				let snapshot = Arc::new(self.build_snapshot(environment_id).await?);
				self.cache.put(environment_id, Arc::clone(&snapshot)).await;
				(snapshot, CacheStatus::Miss)
			}
		};

		let etag = snapshot.etag();
		if if_none_match.is_some_and(|tag| etag_matches(tag, &etag)) {
			return Ok(SnapshotRead::NotModified { etag, cache });
		}

		Ok(SnapshotRead::Fresh {
			snapshot,
			etag,
			cache,
		})
	}

	/// Evaluates one flag, preferring the cached snapshot over storage.
	#[instrument(skip(self, context))]
	pub async fn evaluate(
		&self,
		environment_id: &str,
		flag_key: &str,
		context: &EvaluationContext,
	) -> Result<FlagEvaluation> {
		if let Some(snapshot) = self.cache.get(environment_id).await {
			if let Some(state) = snapshot.flag(flag_key) {
				return Ok(FlagEvaluation {
					result: evaluate(state, flag_key, context),
					flag_version: snapshot.version,
				});
			}
		}

		let latest = self
			.repository
			.find_latest_flag_version(environment_id, flag_key)
			.await?
			.ok_or_else(|| FlagsServerError::FlagNotFound(flag_key.to_string()))?;

		Ok(FlagEvaluation {
			result: evaluate(&latest.state, flag_key, context),
			flag_version: latest.version,
		})
	}

	#[instrument(skip(self, state))]
	pub async fn create_flag(
		&self,
		environment_id: &str,
		key: &str,
		state: &FlagState,
		actor: &str,
	) -> Result<FlagVersion> {
		FlagState::validate_key(key)?;
		state.validate()?;

		let audit = AuditRecord::new(actor, AuditAction::Create, json!({ "state": state }));
		let written = self
			.repository
			.create_flag(environment_id, key, state, &audit)
			.await;
		let created = self.invalidate_after(environment_id, written).await?;

		info!(env_id = %environment_id, flag_key = %key, "flag created");
		Ok(created)
	}

	/// Records `state` as the flag's next version.
	#[instrument(skip(self, state))]
	pub async fn update_state(
		&self,
		environment_id: &str,
		key: &str,
		state: &FlagState,
		actor: &str,
	) -> Result<FlagVersion> {
		state.validate()?;

		let previous = self.latest(environment_id, key).await?;
		let audit = AuditRecord::new(
			actor,
			AuditAction::Update,
			json!({ "old": previous.state, "new": state }),
		);
		let written = self
			.repository
			.record_new_version(environment_id, key, state, &audit)
			.await;
		let version = self
			.invalidate_after(environment_id, written)
			.await?
			.ok_or_else(|| FlagsServerError::FlagNotFound(key.to_string()))?;

		info!(env_id = %environment_id, flag_key = %key, version = version.version, "flag state updated");
		Ok(version)
	}

	/// Re-issues the latest state as a new version.
	#[instrument(skip(self))]
	pub async fn publish(&self, environment_id: &str, key: &str, actor: &str) -> Result<FlagVersion> {
		let latest = self.latest(environment_id, key).await?;
		let audit = AuditRecord::new(actor, AuditAction::Publish, json!({ "state": latest.state }));
		let written = self
			.repository
			.record_new_version(environment_id, key, &latest.state, &audit)
			.await;
		let version = self
			.invalidate_after(environment_id, written)
			.await?
			.ok_or_else(|| FlagsServerError::FlagNotFound(key.to_string()))?;

		info!(env_id = %environment_id, flag_key = %key, version = version.version, "flag published");
		Ok(version)
	}

	/// Records the state of `target_version` as a new version.
	#[instrument(skip(self))]
	pub async fn rollback(
		&self,
		environment_id: &str,
		key: &str,
		target_version: u64,
		actor: &str,
	) -> Result<RollbackOutcome> {
		if target_version < 1 {
			return Err(FlagsServerError::InvalidVersion(target_version.to_string()));
		}

		let latest = self.latest(environment_id, key).await?;
		let target = self
			.repository
			.find_flag_version(environment_id, key, target_version)
			.await?
			.ok_or_else(|| FlagsServerError::VersionNotFound {
				key: key.to_string(),
				version: target_version,
			})?;

		let audit = AuditRecord::new(
			actor,
			AuditAction::Rollback,
			json!({
				"fromVersion": latest.version,
				"toVersion": target_version,
				"state": target.state,
			}),
		);
		let written = self
			.repository
			.record_new_version(environment_id, key, &target.state, &audit)
			.await;
		let version = self
			.invalidate_after(environment_id, written)
			.await?
			.ok_or_else(|| FlagsServerError::FlagNotFound(key.to_string()))?;

		info!(
			env_id = %environment_id,
			flag_key = %key,
			from_version = latest.version,
			to_version = target_version,
			new_version = version.version,
			"flag rolled back"
		);
		Ok(RollbackOutcome {
			key: key.to_string(),
			rolled_back_to: target_version,
			version,
		})
	}

	#[instrument(skip(self))]
	pub async fn archive(&self, environment_id: &str, key: &str, actor: &str) -> Result<()> {
		self.set_archived(environment_id, key, true, actor).await
	}

	#[instrument(skip(self))]
	pub async fn unarchive(&self, environment_id: &str, key: &str, actor: &str) -> Result<()> {
		self.set_archived(environment_id, key, false, actor).await
	}

	async fn set_archived(
		&self,
		environment_id: &str,
		key: &str,
		archived: bool,
		actor: &str,
	) -> Result<()> {
		let action = if archived {
			AuditAction::Archive
		} else {
			AuditAction::Unarchive
		};
		let audit = AuditRecord::new(actor, action, json!({ "isArchived": archived }));
		let written = self
			.repository
			.set_archived(environment_id, key, archived, &audit)
			.await;
		if !self.invalidate_after(environment_id, written).await? {
			return Err(FlagsServerError::FlagNotFound(key.to_string()));
		}

		info!(env_id = %environment_id, flag_key = %key, archived, "flag archive state changed");
		Ok(())
	}

	/// Drops the cached snapshot, then hands back the write's outcome.
	///
	/// Runs on failures too: an error surfaced after the commit must not leave
	/// a stale snapshot behind.
	async fn invalidate_after<T>(&self, environment_id: &str, written: Result<T>) -> Result<T> {
		self.cache.invalidate(environment_id).await;
		written
	}

	/// Creates an environment with a freshly generated API key.
	#[instrument(skip(self))]
	pub async fn create_environment(&self, name: &str) -> Result<CreatedEnvironment> {
		let api_key = generate_api_key();
		let environment = self
			.register_environment(&uuid::Uuid::new_v4().to_string(), name, &api_key)
			.await?;
		Ok(CreatedEnvironment {
			environment,
			api_key,
		})
	}

	/// Creates an environment that authenticates with an existing raw key.
	#[instrument(skip(self, api_key))]
	pub async fn register_environment(&self, id: &str, name: &str, api_key: &str) -> Result<Environment> {
		let environment = Environment {
			id: id.to_string(),
			name: name.to_string(),
			api_key_hash: hash_api_key(api_key),
			created_at: Utc::now(),
		};
		self.repository.create_environment(&environment).await?;

		info!(env_id = %environment.id, name = %environment.name, "environment created");
		Ok(environment)
	}

	/// Resolves the environment owning a raw API key.
	pub async fn authenticate(&self, api_key: &str) -> Result<Option<Environment>> {
		self
			.repository
			.find_environment_by_api_key_hash(&hash_api_key(api_key))
			.await
	}

	pub async fn audit_log(
		&self,
		environment_id: &str,
		limit: u32,
		offset: u32,
	) -> Result<(Vec<AuditEntry>, u64)> {
		self.repository.list_audit(environment_id, limit, offset).await
	}

	/// Latest version of every live flag, ordered by key.
	pub async fn list_flags(&self, environment_id: &str) -> Result<Vec<FlagVersion>> {
		self.repository.list_non_archived_flags(environment_id).await
	}

	pub async fn list_environments(&self) -> Result<Vec<Environment>> {
		self.repository.list_environments().await
	}

	async fn latest(&self, environment_id: &str, key: &str) -> Result<FlagVersion> {
		self
			.repository
			.find_latest_flag_version(environment_id, key)
			.await?
			.ok_or_else(|| FlagsServerError::FlagNotFound(key.to_string()))
	}
}
