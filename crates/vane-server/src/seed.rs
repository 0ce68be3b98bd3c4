// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Startup seed data.
//!
//! A seed file lists environments with fixed API keys and the initial state of
//! their flags:
//!
//! ```json
//! { "environments": [ { "id": "dev", "name": "development", "apiKey": "ff_dev",
//!   "flags": { "new-checkout": { "enabled": true, "defaultVariant": "off", "variants": ["on"] } } } ] }
//! ```
//!
//! Environments that are already registered and flags that already exist are
//! left untouched, so the same file can be applied on every start. A changed
//! `apiKey` for a known environment id does not rotate the stored key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};
use vane_flags_core::FlagState;
use vane_server_flags::{FlagsServerError, SnapshotService};

/// Actor recorded for flags created from seed data.
pub const SEED_ACTOR: &str = "seed";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
	#[serde(default)]
	pub environments: Vec<SeedEnvironment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedEnvironment {
	pub id: String,
	pub name: String,
	pub api_key: String,
	#[serde(default)]
	pub flags: BTreeMap<String, FlagState>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
	pub environments_created: usize,
	pub flags_created: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
	#[error("failed to read seed file {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse seed file {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("seed environment {id} uses the API key of environment {owner}")]
	ApiKeyInUse { id: String, owner: String },

	#[error(transparent)]
	Flags(#[from] FlagsServerError),
}

pub async fn load_seed_file(
	service: &SnapshotService,
	path: &Path,
) -> Result<SeedSummary, SeedError> {
	let content = tokio::fs::read_to_string(path)
		.await
		.map_err(|source| SeedError::Read {
			path: path.to_path_buf(),
			source,
		})?;
	let seed: SeedFile = serde_json::from_str(&content).map_err(|source| SeedError::Parse {
		path: path.to_path_buf(),
		source,
	})?;

	let summary = apply_seed(service, seed).await?;
	info!(
		path = %path.display(),
		environments_created = summary.environments_created,
		flags_created = summary.flags_created,
		"seed data applied"
	);
	Ok(summary)
}

pub async fn apply_seed(
	service: &SnapshotService,
	seed: SeedFile,
) -> Result<SeedSummary, SeedError> {
	let mut summary = SeedSummary::default();

	for env in seed.environments {
		match service.authenticate(&env.api_key).await? {
			Some(owner) if owner.id == env.id => {
				debug!(env_id = %env.id, "seed environment already registered");
			}
			Some(owner) => {
				return Err(SeedError::ApiKeyInUse {
					id: env.id,
					owner: owner.id,
				});
			}
			None => {
				let known = service
					.list_environments()
					.await?
					.iter()
					.any(|existing| existing.id == env.id);
				if known {
					warn!(
						env_id = %env.id,
						"seed environment already registered with a different API key, keeping the stored key"
					);
				} else {
					service
						.register_environment(&env.id, &env.name, &env.api_key)
						.await?;
					summary.environments_created += 1;
				}
			}
		}

		for (key, state) in &env.flags {
			match service.create_flag(&env.id, key, state, SEED_ACTOR).await {
				Ok(_) => summary.flags_created += 1,
				Err(FlagsServerError::DuplicateFlag(_)) => {
					debug!(env_id = %env.id, flag_key = %key, "seed flag already exists");
				}
				Err(e) => return Err(e.into()),
			}
		}
	}

	Ok(summary)
}
