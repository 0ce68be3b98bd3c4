// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors specific to the feature flags server.
#[derive(Debug, Error)]
pub enum FlagsServerError {
	#[error(transparent)]
	Core(#[from] vane_flags_core::FlagsError),

	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("flag not found: {0}")]
	FlagNotFound(String),

	#[error("flag {key} has no version {version}")]
	VersionNotFound { key: String, version: u64 },

	#[error("invalid version: {0}")]
	InvalidVersion(String),

	#[error("duplicate flag key: {0}")]
	DuplicateFlag(String),

	#[error("internal error: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, FlagsServerError>;
