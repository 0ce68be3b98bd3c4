// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::EvaluationContext;
use crate::evaluation::{evaluate, EvaluationResult};
use crate::flag::FlagState;

/// Every non-archived flag of an environment at one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
	pub environment_id: String,
	pub version: u64,
	#[serde(default)]
	pub flags: BTreeMap<String, FlagState>,
}

impl Snapshot {
	pub fn empty(environment_id: impl Into<String>) -> Self {
		Self {
			environment_id: environment_id.into(),
			version: 0,
			flags: BTreeMap::new(),
		}
	}

	/// HTTP entity tag for this snapshot, quotes included.
	pub fn etag(&self) -> String {
		etag_for_version(self.version)
	}

	pub fn flag(&self, key: &str) -> Option<&FlagState> {
		self.flags.get(key)
	}

	/// Evaluates `key`, failing closed when the flag is not in the snapshot.
	pub fn evaluate(&self, key: &str, context: &EvaluationContext) -> EvaluationResult {
		match self.flags.get(key) {
			Some(state) => evaluate(state, key, context),
			None => EvaluationResult::safe_default(),
		}
	}
}

pub fn etag_for_version(version: u64) -> String {
	format!("\"v{version}\"")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::evaluation::EvaluationReason;
	use serde_json::json;

	#[test]
	fn test_etag_format() {
		let mut snapshot = Snapshot::empty("env-1");
		assert_eq!(snapshot.etag(), "\"v0\"");
		snapshot.version = 17;
		assert_eq!(snapshot.etag(), "\"v17\"");
	}

	#[test]
	fn test_wire_format() {
		let snapshot: Snapshot = serde_json::from_value(json!({
			"environmentId": "production",
			"version": 3,
			"flags": {
				"dark-mode": {"enabled": true, "defaultVariant": "off", "variants": ["on", "off"], "rules": []}
			}
		}))
		.unwrap();
		assert_eq!(snapshot.version, 3);
		assert!(snapshot.flag("dark-mode").is_some());

		let back = serde_json::to_value(&snapshot).unwrap();
		assert_eq!(back["environmentId"], "production");
		assert_eq!(back["flags"]["dark-mode"]["defaultVariant"], "off");
	}

	#[test]
	fn test_unknown_flag_is_safe_default() {
		let snapshot = Snapshot::empty("env-1");
		let ctx = EvaluationContext::new().with_attribute("userId", "u1");
		let result = snapshot.evaluate("missing", &ctx);
		assert!(!result.enabled);
		assert_eq!(result.variant, "control");
		assert_eq!(result.reason, EvaluationReason::Disabled);
	}

	#[test]
	fn test_known_flag_is_evaluated() {
		let mut snapshot = Snapshot::empty("env-1");
		snapshot
			.flags
			.insert("dark-mode".to_string(), FlagState::boolean(true));
		let result = snapshot.evaluate("dark-mode", &EvaluationContext::new());
		assert!(result.enabled);
		assert_eq!(result.reason, EvaluationReason::Default);
	}
}
