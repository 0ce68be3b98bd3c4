// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feature flags server implementation for Vane.
//!
//! # Architecture
//!
//! - `repository` - SQLite storage for environments, the append-only flag
//!   version history and the audit log
//! - `cache` - Per-environment snapshot cache with a fixed TTL
//! - `service` - Snapshot reads with entity tags, evaluation, and the writes
//!   (create, update, publish, rollback, archive) that invalidate the cache
//! - `sdk_auth` - Environment API key generation and hashing
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vane_server_flags::{SnapshotCache, SnapshotService, SqliteFlagsRepository};
//!
//! let repo = SqliteFlagsRepository::new(pool);
//! let service = SnapshotService::new(Arc::new(repo), SnapshotCache::default());
//!
//! service.publish("production", "new-checkout", "alice").await?;
//! let read = service.read_snapshot("production", Some("\"v3\"")).await?;
//! ```

pub mod cache;
pub mod error;
pub mod repository;
pub mod sdk_auth;
pub mod service;

pub use cache::{SnapshotCache, DEFAULT_SNAPSHOT_TTL};
pub use error::{FlagsServerError, Result};
pub use repository::{
	create_pool, create_schema, AuditAction, AuditEntry, AuditRecord, Environment, FlagVersion,
	FlagsRepository, SqliteFlagsRepository,
};
pub use sdk_auth::{bearer_token, generate_api_key, hash_api_key};
pub use service::{
	etag_matches, CacheStatus, CreatedEnvironment, FlagEvaluation, RollbackOutcome, SnapshotRead,
	SnapshotService,
};
