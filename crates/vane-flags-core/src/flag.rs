// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::error::{FlagsError, Result};

/// The versioned configuration of a single flag, as evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagState {
	pub enabled: bool,
	pub default_variant: String,
	pub variants: Vec<String>,
	#[serde(default)]
	pub rules: Vec<Rule>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rollout: Option<RolloutConfig>,
}

impl FlagState {
	/// A disabled on/off flag with no targeting.
	pub fn boolean(enabled: bool) -> Self {
		Self {
			enabled,
			default_variant: "off".to_string(),
			variants: vec!["on".to_string(), "off".to_string()],
			rules: Vec::new(),
			rollout: None,
		}
	}

	/// The variant handed out to contexts included in a rollout.
	pub fn treatment_variant(&self) -> &str {
		self
			.variants
			.first()
			.map(String::as_str)
			.unwrap_or(&self.default_variant)
	}

	/// Checks the invariants a stored flag state must satisfy.
	pub fn validate(&self) -> Result<()> {
		if self.variants.is_empty() {
			return Err(FlagsError::NoVariants);
		}

		if let Some(rollout) = &self.rollout {
			if rollout.percentage > 100 {
				return Err(FlagsError::InvalidPercentage(rollout.percentage));
			}
		}

		let mut seen = HashSet::new();
		for rule in &self.rules {
			if !seen.insert(rule.id.as_str()) {
				return Err(FlagsError::DuplicateRuleId(rule.id.clone()));
			}
		}

		Ok(())
	}

	/// Validates a flag key.
	///
	/// Keys start with a lowercase letter or digit, followed by up to 127
	/// lowercase letters, digits, dots, underscores or hyphens.
	pub fn validate_key(key: &str) -> Result<()> {
		let mut chars = key.chars();
		let valid = match chars.next() {
			Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {
				key.len() <= 128
					&& chars.all(|c| {
						c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')
					})
			}
			_ => false,
		};

		if valid {
			Ok(())
		} else {
			Err(FlagsError::InvalidFlagKey(key.to_string()))
		}
	}
}

/// A targeting rule: when every condition holds, `result` is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
	pub id: String,
	#[serde(default)]
	pub conditions: Vec<Condition>,
	pub result: RuleResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
	pub enabled: bool,
	pub variant: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloutType {
	#[default]
	#[serde(rename = "PERCENT")]
	Percent,
}

/// Deterministic percentage rollout keyed on a context attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutConfig {
	#[serde(rename = "type", default)]
	pub rollout_type: RolloutType,
	pub percentage: u32,
	pub stickiness_key: String,
}

impl RolloutConfig {
	pub fn percent(percentage: u32, stickiness_key: impl Into<String>) -> Self {
		Self {
			rollout_type: RolloutType::Percent,
			percentage,
			stickiness_key: stickiness_key.into(),
		}
	}
}
