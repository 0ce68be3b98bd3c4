// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{
	SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqliteSynchronous,
};
use std::str::FromStr;
use tracing::instrument;

use vane_flags_core::FlagState;

use crate::error::{FlagsServerError, Result};

/// An environment owning a set of flags and one API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
	pub id: String,
	pub name: String,
	pub api_key_hash: String,
	pub created_at: DateTime<Utc>,
}

/// One immutable version of a flag's state.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagVersion {
	pub environment_id: String,
	pub key: String,
	pub version: u64,
	pub state: FlagState,
	pub created_by: Option<String>,
	pub created_at: DateTime<Utc>,
}

/// Kind of change recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
	Create,
	Update,
	Publish,
	Rollback,
	Archive,
	Unarchive,
}

impl AuditAction {
	pub fn as_str(&self) -> &'static str {
		match self {
			AuditAction::Create => "CREATE",
			AuditAction::Update => "UPDATE",
			AuditAction::Publish => "PUBLISH",
			AuditAction::Rollback => "ROLLBACK",
			AuditAction::Archive => "ARCHIVE",
			AuditAction::Unarchive => "UNARCHIVE",
		}
	}
}

impl FromStr for AuditAction {
	type Err = FlagsServerError;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"CREATE" => Ok(AuditAction::Create),
			"UPDATE" => Ok(AuditAction::Update),
			"PUBLISH" => Ok(AuditAction::Publish),
			"ROLLBACK" => Ok(AuditAction::Rollback),
			"ARCHIVE" => Ok(AuditAction::Archive),
			"UNARCHIVE" => Ok(AuditAction::Unarchive),
			other => Err(FlagsServerError::Internal(format!(
				"unknown audit action {other}"
			))),
		}
	}
}

/// Audit row written in the same transaction as the change it describes.
///
/// Writes that create a flag version stamp the committed version into `diff`
/// under `version`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
	pub actor: String,
	pub action: AuditAction,
	pub diff: serde_json::Value,
}

impl AuditRecord {
	pub fn new(actor: &str, action: AuditAction, diff: serde_json::Value) -> Self {
		Self {
			actor: actor.to_string(),
			action,
			diff,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
	pub id: i64,
	pub environment_id: String,
	pub actor: String,
	pub action: AuditAction,
	pub entity_key: String,
	pub diff: serde_json::Value,
	pub created_at: DateTime<Utc>,
}

/// Storage for environments and the append-only flag version history.
#[async_trait]
pub trait FlagsRepository: Send + Sync {
	// Environment operations
	async fn create_environment(&self, env: &Environment) -> Result<()>;
	async fn find_environment_by_api_key_hash(&self, hash: &str) -> Result<Option<Environment>>;
	async fn list_environments(&self) -> Result<Vec<Environment>>;

	// Flag operations

	/// Creates a flag with `state` as version 1, authored by `audit.actor`.
	async fn create_flag(
		&self,
		environment_id: &str,
		key: &str,
		state: &FlagState,
		audit: &AuditRecord,
	) -> Result<FlagVersion>;
	/// `false` if the flag does not exist, in which case nothing is audited.
	async fn set_archived(
		&self,
		environment_id: &str,
		key: &str,
		archived: bool,
		audit: &AuditRecord,
	) -> Result<bool>;

	// Version operations

	/// Latest version of a non-archived flag.
	async fn find_latest_flag_version(
		&self,
		environment_id: &str,
		key: &str,
	) -> Result<Option<FlagVersion>>;
	async fn find_flag_version(
		&self,
		environment_id: &str,
		key: &str,
		version: u64,
	) -> Result<Option<FlagVersion>>;
	/// Latest version of every non-archived flag, ordered by key.
	async fn list_non_archived_flags(&self, environment_id: &str) -> Result<Vec<FlagVersion>>;
	/// Appends `state` as the flag's next version. `None` if the flag does not exist.
	async fn record_new_version(
		&self,
		environment_id: &str,
		key: &str,
		state: &FlagState,
		audit: &AuditRecord,
	) -> Result<Option<FlagVersion>>;

	// Audit operations

	/// Newest entries first, with the total count for pagination.
	async fn list_audit(
		&self,
		environment_id: &str,
		limit: u32,
		offset: u32,
	) -> Result<(Vec<AuditEntry>, u64)>;
}

/// Opens a SQLite pool with WAL journaling.
#[instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| FlagsServerError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

/// Creates the flag tables if they do not exist yet.
#[instrument(skip(pool))]
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS flag_environments (
			id TEXT PRIMARY KEY,
			name TEXT NOT NULL,
			api_key_hash TEXT NOT NULL UNIQUE,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS flags (
			environment_id TEXT NOT NULL REFERENCES flag_environments(id),
			key TEXT NOT NULL,
			archived INTEGER NOT NULL DEFAULT 0,
			created_at TEXT NOT NULL,
			PRIMARY KEY (environment_id, key)
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS flag_versions (
			environment_id TEXT NOT NULL,
			flag_key TEXT NOT NULL,
			version INTEGER NOT NULL,
			state TEXT NOT NULL,
			created_by TEXT,
			created_at TEXT NOT NULL,
			PRIMARY KEY (environment_id, flag_key, version)
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS flag_audit_log (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			environment_id TEXT NOT NULL,
			actor TEXT NOT NULL,
			action TEXT NOT NULL,
			entity_key TEXT NOT NULL,
			diff TEXT NOT NULL,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	Ok(())
}

pub struct SqliteFlagsRepository {
	pool: SqlitePool,
}

impl SqliteFlagsRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl FlagsRepository for SqliteFlagsRepository {
	#[instrument(skip(self, env), fields(env_id = %env.id))]
	async fn create_environment(&self, env: &Environment) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO flag_environments (id, name, api_key_hash, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(&env.id)
		.bind(&env.name)
		.bind(&env.api_key_hash)
		.bind(env.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[instrument(skip(self, hash))]
	async fn find_environment_by_api_key_hash(&self, hash: &str) -> Result<Option<Environment>> {
		let row = sqlx::query_as::<_, EnvironmentRow>(
			r#"
			SELECT id, name, api_key_hash, created_at
			FROM flag_environments
			WHERE api_key_hash = ?
			"#,
		)
		.bind(hash)
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self))]
	async fn list_environments(&self) -> Result<Vec<Environment>> {
		let rows = sqlx::query_as::<_, EnvironmentRow>(
			r#"
			SELECT id, name, api_key_hash, created_at
			FROM flag_environments
			ORDER BY created_at ASC, id ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self, state, audit), fields(env_id = %environment_id, flag_key = %key))]
	async fn create_flag(
		&self,
		environment_id: &str,
		key: &str,
		state: &FlagState,
		audit: &AuditRecord,
	) -> Result<FlagVersion> {
		let now = Utc::now();
		let state_json = serde_json::to_string(state)?;
		let mut tx = self.pool.begin().await?;

		let inserted = sqlx::query(
			r#"
			INSERT INTO flags (environment_id, key, archived, created_at)
			VALUES (?, ?, 0, ?)
			ON CONFLICT (environment_id, key) DO NOTHING
			"#,
		)
		.bind(environment_id)
		.bind(key)
		.bind(now.to_rfc3339())
		.execute(&mut *tx)
		.await?;

		if inserted.rows_affected() == 0 {
			return Err(FlagsServerError::DuplicateFlag(key.to_string()));
		}

		sqlx::query(
			r#"
			INSERT INTO flag_versions (environment_id, flag_key, version, state, created_by, created_at)
			VALUES (?, ?, 1, ?, ?, ?)
			"#,
		)
		.bind(environment_id)
		.bind(key)
		.bind(&state_json)
		.bind(&audit.actor)
		.bind(now.to_rfc3339())
		.execute(&mut *tx)
		.await?;

		insert_audit(&mut *tx, environment_id, key, audit, Some(1)).await?;
		tx.commit().await?;

		Ok(FlagVersion {
			environment_id: environment_id.to_string(),
			key: key.to_string(),
			version: 1,
			state: state.clone(),
			created_by: Some(audit.actor.clone()),
			created_at: now,
		})
	}

	#[instrument(skip(self, audit), fields(env_id = %environment_id, flag_key = %key))]
	async fn set_archived(
		&self,
		environment_id: &str,
		key: &str,
		archived: bool,
		audit: &AuditRecord,
	) -> Result<bool> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query(
			r#"
			UPDATE flags SET archived = ?
			WHERE environment_id = ? AND key = ?
			"#,
		)
		.bind(archived)
		.bind(environment_id)
		.bind(key)
		.execute(&mut *tx)
		.await?;

		if result.rows_affected() == 0 {
			return Ok(false);
		}

		insert_audit(&mut *tx, environment_id, key, audit, None).await?;
		tx.commit().await?;
		Ok(true)
	}

	#[instrument(skip(self), fields(env_id = %environment_id, flag_key = %key))]
	async fn find_latest_flag_version(
		&self,
		environment_id: &str,
		key: &str,
	) -> Result<Option<FlagVersion>> {
		let row = sqlx::query_as::<_, FlagVersionRow>(
			r#"
			SELECT v.environment_id, v.flag_key, v.version, v.state, v.created_by, v.created_at
			FROM flag_versions v
			JOIN flags f ON f.environment_id = v.environment_id AND f.key = v.flag_key
			WHERE v.environment_id = ? AND v.flag_key = ? AND f.archived = 0
			ORDER BY v.version DESC
			LIMIT 1
			"#,
		)
		.bind(environment_id)
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(env_id = %environment_id, flag_key = %key))]
	async fn find_flag_version(
		&self,
		environment_id: &str,
		key: &str,
		version: u64,
	) -> Result<Option<FlagVersion>> {
		let row = sqlx::query_as::<_, FlagVersionRow>(
			r#"
			SELECT environment_id, flag_key, version, state, created_by, created_at
			FROM flag_versions
			WHERE environment_id = ? AND flag_key = ? AND version = ?
			"#,
		)
		.bind(environment_id)
		.bind(key)
		.bind(to_db_version(version)?)
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(env_id = %environment_id))]
	async fn list_non_archived_flags(&self, environment_id: &str) -> Result<Vec<FlagVersion>> {
		let rows = sqlx::query_as::<_, FlagVersionRow>(
			r#"
			SELECT v.environment_id, v.flag_key, v.version, v.state, v.created_by, v.created_at
			FROM flag_versions v
			JOIN flags f ON f.environment_id = v.environment_id AND f.key = v.flag_key
			WHERE v.environment_id = ?
				AND f.archived = 0
				AND v.version = (
					SELECT MAX(version) FROM flag_versions
					WHERE environment_id = v.environment_id AND flag_key = v.flag_key
				)
			ORDER BY v.flag_key ASC
			"#,
		)
		.bind(environment_id)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self, state, audit), fields(env_id = %environment_id, flag_key = %key))]
	async fn record_new_version(
		&self,
		environment_id: &str,
		key: &str,
		state: &FlagState,
		audit: &AuditRecord,
	) -> Result<Option<FlagVersion>> {
		let now = Utc::now();
		let state_json = serde_json::to_string(state)?;
		let mut tx = self.pool.begin().await?;

		let latest: Option<i64> = sqlx::query_scalar(
			r#"
			SELECT MAX(version) FROM flag_versions
			WHERE environment_id = ? AND flag_key = ?
			"#,
		)
		.bind(environment_id)
		.bind(key)
		.fetch_one(&mut *tx)
		.await?;

		let Some(latest) = latest else {
			return Ok(None);
		};
		let next = latest + 1;

		sqlx::query(
			r#"
			INSERT INTO flag_versions (environment_id, flag_key, version, state, created_by, created_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(environment_id)
		.bind(key)
		.bind(next)
		.bind(&state_json)
		.bind(&audit.actor)
		.bind(now.to_rfc3339())
		.execute(&mut *tx)
		.await?;

		insert_audit(&mut *tx, environment_id, key, audit, Some(next)).await?;
		tx.commit().await?;

		Ok(Some(FlagVersion {
			environment_id: environment_id.to_string(),
			key: key.to_string(),
			version: from_db_version(next)?,
			state: state.clone(),
			created_by: Some(audit.actor.clone()),
			created_at: now,
		}))
	}

	#[instrument(skip(self), fields(env_id = %environment_id))]
	async fn list_audit(
		&self,
		environment_id: &str,
		limit: u32,
		offset: u32,
	) -> Result<(Vec<AuditEntry>, u64)> {
		let rows = sqlx::query_as::<_, AuditRow>(
			r#"
			SELECT id, environment_id, actor, action, entity_key, diff, created_at
			FROM flag_audit_log
			WHERE environment_id = ?
			ORDER BY id DESC
			LIMIT ? OFFSET ?
			"#,
		)
		.bind(environment_id)
		.bind(i64::from(limit))
		.bind(i64::from(offset))
		.fetch_all(&self.pool)
		.await?;

		let total: i64 = sqlx::query_scalar(
			r#"
			SELECT COUNT(*) FROM flag_audit_log WHERE environment_id = ?
			"#,
		)
		.bind(environment_id)
		.fetch_one(&self.pool)
		.await?;

		let entries = rows
			.into_iter()
			.map(TryInto::try_into)
			.collect::<Result<Vec<_>>>()?;
		Ok((entries, total.max(0) as u64))
	}
}

async fn insert_audit(
	conn: &mut SqliteConnection,
	environment_id: &str,
	entity_key: &str,
	audit: &AuditRecord,
	version: Option<i64>,
) -> Result<()> {
	let mut diff = audit.diff.clone();
	if let (Some(version), Some(fields)) = (version, diff.as_object_mut()) {
		fields.insert("version".to_string(), version.into());
	}

	sqlx::query(
		r#"
		INSERT INTO flag_audit_log (environment_id, actor, action, entity_key, diff, created_at)
		VALUES (?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(environment_id)
	.bind(&audit.actor)
	.bind(audit.action.as_str())
	.bind(entity_key)
	.bind(serde_json::to_string(&diff)?)
	.bind(Utc::now().to_rfc3339())
	.execute(&mut *conn)
	.await?;

	Ok(())
}

fn to_db_version(version: u64) -> Result<i64> {
	i64::try_from(version).map_err(|_| FlagsServerError::InvalidVersion(version.to_string()))
}

fn from_db_version(version: i64) -> Result<u64> {
	u64::try_from(version)
		.map_err(|_| FlagsServerError::Internal(format!("negative flag version {version}")))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
	Ok(
		DateTime::parse_from_rfc3339(value)
			.map_err(|_| FlagsServerError::Internal("Invalid created_at".to_string()))?
			.with_timezone(&Utc),
	)
}

// Database row types for sqlx

#[derive(sqlx::FromRow)]
struct EnvironmentRow {
	id: String,
	name: String,
	api_key_hash: String,
	created_at: String,
}

impl TryFrom<EnvironmentRow> for Environment {
	type Error = FlagsServerError;

	fn try_from(row: EnvironmentRow) -> Result<Self> {
		Ok(Environment {
			id: row.id,
			name: row.name,
			api_key_hash: row.api_key_hash,
			created_at: parse_timestamp(&row.created_at)?,
		})
	}
}

#[derive(sqlx::FromRow)]
struct FlagVersionRow {
	environment_id: String,
	flag_key: String,
	version: i64,
	state: String,
	created_by: Option<String>,
	created_at: String,
}

impl TryFrom<FlagVersionRow> for FlagVersion {
	type Error = FlagsServerError;

	fn try_from(row: FlagVersionRow) -> Result<Self> {
		Ok(FlagVersion {
			environment_id: row.environment_id,
			key: row.flag_key,
			version: from_db_version(row.version)?,
			state: serde_json::from_str(&row.state)?,
			created_by: row.created_by,
			created_at: parse_timestamp(&row.created_at)?,
		})
	}
}

#[derive(sqlx::FromRow)]
struct AuditRow {
	id: i64,
	environment_id: String,
	actor: String,
	action: String,
	entity_key: String,
	diff: String,
	created_at: String,
}

impl TryFrom<AuditRow> for AuditEntry {
	type Error = FlagsServerError;

	fn try_from(row: AuditRow) -> Result<Self> {
		Ok(AuditEntry {
			id: row.id,
			environment_id: row.environment_id,
			actor: row.actor,
			action: row.action.parse()?,
			entity_key: row.entity_key,
			diff: serde_json::from_str(&row.diff)?,
			created_at: parse_timestamp(&row.created_at)?,
		})
	}
}


#[cfg(test)]
mod tests {
	use super::testing::*;
	use super::*;

	#[tokio::test]
	async fn test_environment_lookup_by_hash() {
		let repo = create_test_repo().await;
		let env = environment("production");
		repo.create_environment(&env).await.unwrap();

		let found = repo
			.find_environment_by_api_key_hash(&env.api_key_hash)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(found.id, "production");

		let missing = repo.find_environment_by_api_key_hash("nope").await.unwrap();
		assert!(missing.is_none());
	}

	#[tokio::test]
	async fn test_create_flag_starts_at_version_one() {
		let repo = create_test_repo().await;
		repo.create_environment(&environment("dev")).await.unwrap();

		let created = repo
			.create_flag(
				"dev",
				"dark-mode",
				&FlagState::boolean(true),
				&audit("alice", AuditAction::Create),
			)
			.await
			.unwrap();
		assert_eq!(created.version, 1);

		let latest = repo
			.find_latest_flag_version("dev", "dark-mode")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(latest.version, 1);
		assert_eq!(latest.state, FlagState::boolean(true));
		assert_eq!(latest.created_by.as_deref(), Some("alice"));
	}

	#[tokio::test]
	async fn test_duplicate_flag_is_rejected() {
		let repo = create_test_repo().await;
		repo.create_environment(&environment("dev")).await.unwrap();
		let record = audit("alice", AuditAction::Create);
		repo
			.create_flag("dev", "dark-mode", &FlagState::boolean(true), &record)
			.await
			.unwrap();

		let err = repo
			.create_flag("dev", "dark-mode", &FlagState::boolean(false), &record)
			.await
			.unwrap_err();
		assert!(matches!(err, FlagsServerError::DuplicateFlag(_)));

		let (_, total) = repo.list_audit("dev", 10, 0).await.unwrap();
		assert_eq!(total, 1);
	}

	#[tokio::test]
	async fn test_versions_are_append_only() {
		let repo = create_test_repo().await;
		repo.create_environment(&environment("dev")).await.unwrap();
		repo
			.create_flag(
				"dev",
				"dark-mode",
				&FlagState::boolean(false),
				&audit("alice", AuditAction::Create),
			)
			.await
			.unwrap();

		let v2 = repo
			.record_new_version(
				"dev",
				"dark-mode",
				&FlagState::boolean(true),
				&audit("bob", AuditAction::Update),
			)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(v2.version, 2);
		assert_eq!(v2.created_by.as_deref(), Some("bob"));

		let v1 = repo
			.find_flag_version("dev", "dark-mode", 1)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(v1.state, FlagState::boolean(false));

		let latest = repo
			.find_latest_flag_version("dev", "dark-mode")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(latest.version, 2);
		assert!(latest.state.enabled);
	}

	#[tokio::test]
	async fn test_record_new_version_for_unknown_flag() {
		let repo = create_test_repo().await;
		let result = repo
			.record_new_version(
				"dev",
				"missing",
				&FlagState::boolean(true),
				&audit("alice", AuditAction::Update),
			)
			.await
			.unwrap();
		assert!(result.is_none());

		let (_, total) = repo.list_audit("dev", 10, 0).await.unwrap();
		assert_eq!(total, 0);
	}

	#[tokio::test]
	async fn test_version_and_audit_commit_together() {
		let repo = create_test_repo().await;
		repo.create_environment(&environment("dev")).await.unwrap();
		repo
			.create_flag(
				"dev",
				"dark-mode",
				&FlagState::boolean(false),
				&audit("alice", AuditAction::Create),
			)
			.await
			.unwrap();

		drop_audit_log(&repo).await;

		let result = repo
			.record_new_version(
				"dev",
				"dark-mode",
				&FlagState::boolean(true),
				&audit("bob", AuditAction::Update),
			)
			.await;
		assert!(result.is_err());

		let latest = repo
			.find_latest_flag_version("dev", "dark-mode")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(latest.version, 1);
		assert!(!latest.state.enabled);

		let archived = repo
			.set_archived("dev", "dark-mode", true, &audit("bob", AuditAction::Archive))
			.await;
		assert!(archived.is_err());
		assert!(repo
			.find_latest_flag_version("dev", "dark-mode")
			.await
			.unwrap()
			.is_some());
	}

	#[tokio::test]
	async fn test_list_returns_latest_of_non_archived() {
		let repo = create_test_repo().await;
		repo.create_environment(&environment("dev")).await.unwrap();
		repo.create_environment(&environment("prod")).await.unwrap();
		let create = audit("alice", AuditAction::Create);

		for key in ["a-flag", "b-flag", "c-flag"] {
			repo
				.create_flag("dev", key, &FlagState::boolean(false), &create)
				.await
				.unwrap();
		}
		repo
			.create_flag("prod", "a-flag", &FlagState::boolean(true), &create)
			.await
			.unwrap();
		repo
			.record_new_version(
				"dev",
				"b-flag",
				&FlagState::boolean(true),
				&audit("alice", AuditAction::Update),
			)
			.await
			.unwrap();
		assert!(repo
			.set_archived("dev", "c-flag", true, &audit("alice", AuditAction::Archive))
			.await
			.unwrap());

		let flags = repo.list_non_archived_flags("dev").await.unwrap();
		let summary: Vec<(&str, u64)> = flags.iter().map(|f| (f.key.as_str(), f.version)).collect();
		assert_eq!(summary, vec![("a-flag", 1), ("b-flag", 2)]);

		assert!(repo
			.find_latest_flag_version("dev", "c-flag")
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn test_audit_log_newest_first() {
		let repo = create_test_repo().await;
		repo.create_environment(&environment("dev")).await.unwrap();
		repo.create_environment(&environment("prod")).await.unwrap();

		repo
			.create_flag(
				"dev",
				"a-flag",
				&FlagState::boolean(false),
				&AuditRecord::new("alice", AuditAction::Create, serde_json::json!({"k": "a-flag"})),
			)
			.await
			.unwrap();
		repo
			.record_new_version(
				"dev",
				"a-flag",
				&FlagState::boolean(false),
				&audit("alice", AuditAction::Publish),
			)
			.await
			.unwrap();
		repo
			.set_archived("dev", "a-flag", true, &audit("alice", AuditAction::Archive))
			.await
			.unwrap();
		repo
			.create_flag(
				"prod",
				"c-flag",
				&FlagState::boolean(true),
				&audit("bob", AuditAction::Create),
			)
			.await
			.unwrap();

		let (entries, total) = repo.list_audit("dev", 2, 0).await.unwrap();
		assert_eq!(total, 3);
		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].action, AuditAction::Archive);
		assert!(entries[0].diff.get("version").is_none());
		assert_eq!(entries[1].action, AuditAction::Publish);
		assert_eq!(entries[1].diff["version"], 2);

		let (rest, _) = repo.list_audit("dev", 2, 2).await.unwrap();
		assert_eq!(rest.len(), 1);
		assert_eq!(rest[0].diff["k"], "a-flag");
		assert_eq!(rest[0].diff["version"], 1);
	}

	#[tokio::test]
	async fn test_list_environments() {
		let repo = create_test_repo().await;
		repo.create_environment(&environment("dev")).await.unwrap();
		repo.create_environment(&environment("prod")).await.unwrap();
		let ids: Vec<String> = repo
			.list_environments()
			.await
			.unwrap()
			.into_iter()
			.map(|e| e.id)
			.collect();
		assert_eq!(ids.len(), 2);
		assert!(ids.contains(&"prod".to_string()));
	}

	#[tokio::test]
	async fn test_set_archived_unknown_flag() {
		let repo = create_test_repo().await;
		assert!(!repo
			.set_archived("dev", "missing", true, &audit("alice", AuditAction::Archive))
			.await
			.unwrap());
	}
}
