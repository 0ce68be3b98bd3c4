// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::context::EvaluationContext;
use crate::flag::RolloutConfig;
use crate::hash::bucket;

/// Whether `context` falls inside the rollout for `flag_key`.
///
/// A context without the stickiness attribute is always excluded, even at 100%.
pub fn evaluate_rollout(rollout: &RolloutConfig, flag_key: &str, context: &EvaluationContext) -> bool {
	match context.get(&rollout.stickiness_key) {
		Some(value) => bucket(&value.to_stickiness_string(), flag_key) < rollout.percentage,
		None => false,
	}
}
