// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::condition::evaluate_rule;
use crate::context::EvaluationContext;
use crate::flag::FlagState;
use crate::rollout::evaluate_rollout;

/// Variant returned for flags that cannot be evaluated.
pub const SAFE_DEFAULT_VARIANT: &str = "control";

/// Why an evaluation produced its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationReason {
	Disabled,
	RuleMatch,
	Rollout,
	Default,
}

impl std::fmt::Display for EvaluationReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			EvaluationReason::Disabled => "DISABLED",
			EvaluationReason::RuleMatch => "RULE_MATCH",
			EvaluationReason::Rollout => "ROLLOUT",
			EvaluationReason::Default => "DEFAULT",
		};
		f.write_str(s)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
	pub enabled: bool,
	pub variant: String,
	pub reason: EvaluationReason,
}

impl EvaluationResult {
	pub fn new(enabled: bool, variant: impl Into<String>, reason: EvaluationReason) -> Self {
		Self {
			enabled,
			variant: variant.into(),
			reason,
		}
	}

	/// The fail-closed result for unknown flags or a client without a snapshot.
	pub fn safe_default() -> Self {
		Self::new(false, SAFE_DEFAULT_VARIANT, EvaluationReason::Disabled)
	}
}

/// Evaluates a flag state for a context.
///
/// The first applicable step wins:
/// 1. Disabled flag
/// 2. First matching rule
/// 3. Percentage rollout, if configured
/// 4. Default variant
pub fn evaluate(state: &FlagState, flag_key: &str, context: &EvaluationContext) -> EvaluationResult {
	if !state.enabled {
		return EvaluationResult::new(false, &state.default_variant, EvaluationReason::Disabled);
	}

	if let Some(rule) = state.rules.iter().find(|rule| evaluate_rule(rule, context)) {
		return EvaluationResult::new(
			rule.result.enabled,
			&rule.result.variant,
			EvaluationReason::RuleMatch,
		);
	}

	if let Some(rollout) = &state.rollout {
		return if evaluate_rollout(rollout, flag_key, context) {
			EvaluationResult::new(true, state.treatment_variant(), EvaluationReason::Rollout)
		} else {
			EvaluationResult::new(false, &state.default_variant, EvaluationReason::Rollout)
		};
	}

	EvaluationResult::new(state.enabled, &state.default_variant, EvaluationReason::Default)
}
