// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors raised when validating flag data. Evaluation itself never fails.
#[derive(Debug, Error)]
pub enum FlagsError {
	#[error("invalid flag key: {0}")]
	InvalidFlagKey(String),

	#[error("flag state must declare at least one variant")]
	NoVariants,

	#[error("rollout percentage must be between 0 and 100, got {0}")]
	InvalidPercentage(u32),

	#[error("duplicate rule id: {0}")]
	DuplicateRuleId(String),

	#[error("serialization error: {0}")]
	Serialization(String),
}

impl From<serde_json::Error> for FlagsError {
	fn from(err: serde_json::Error) -> Self {
		FlagsError::Serialization(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, FlagsError>;
