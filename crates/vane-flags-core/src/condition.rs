// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute conditions and rule matching.
//!
//! Matching never fails: a missing attribute, a type mismatch or an operator
//! this build does not know all resolve to "no match".

use serde::{Deserialize, Serialize};

use crate::context::EvaluationContext;
use crate::flag::Rule;
use crate::value::AttributeValue;

/// Comparison operators for attribute conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
	Eq,
	Neq,
	In,
	NotIn,
	Gt,
	Lt,
	Contains,
	/// Any operator name not listed above.
	#[serde(other)]
	Unknown,
}

impl Operator {
	/// Evaluates this operator with a present, non-null context value.
	pub fn evaluate(&self, actual: &AttributeValue, expected: &AttributeValue) -> bool {
		match self {
			Operator::Eq => actual == expected,
			Operator::Neq => actual != expected,
			Operator::In => expected
				.as_list()
				.is_some_and(|items| items.contains(actual)),
			Operator::NotIn => expected
				.as_list()
				.is_some_and(|items| !items.contains(actual)),
			Operator::Gt => compare_numbers(actual, expected, |a, b| a > b),
			Operator::Lt => compare_numbers(actual, expected, |a, b| a < b),
			Operator::Contains => match (actual.as_str(), expected.as_str()) {
				(Some(haystack), Some(needle)) => haystack.contains(needle),
				_ => false,
			},
			Operator::Unknown => false,
		}
	}
}

fn compare_numbers<F>(actual: &AttributeValue, expected: &AttributeValue, cmp: F) -> bool
where
	F: Fn(f64, f64) -> bool,
{
	match (actual.as_f64(), expected.as_f64()) {
		(Some(a), Some(b)) => cmp(a, b),
		_ => false,
	}
}

/// A single attribute test, e.g. `plan EQ "enterprise"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
	#[serde(alias = "attribute")]
	pub attr: String,
	#[serde(alias = "operator")]
	pub op: Operator,
	#[serde(default)]
	pub value: AttributeValue,
}

impl Condition {
	pub fn new(attr: impl Into<String>, op: Operator, value: impl Into<AttributeValue>) -> Self {
		Self {
			attr: attr.into(),
			op,
			value: value.into(),
		}
	}
}

pub fn evaluate_condition(condition: &Condition, context: &EvaluationContext) -> bool {
	match context.get(&condition.attr) {
		Some(actual) => condition.op.evaluate(actual, &condition.value),
		None => false,
	}
}

/// All conditions must hold. A rule without conditions never matches.
pub fn evaluate_rule(rule: &Rule, context: &EvaluationContext) -> bool {
	!rule.conditions.is_empty()
		&& rule
			.conditions
			.iter()
			.all(|cond| evaluate_condition(cond, context))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::flag::RuleResult;
	use serde_json::json;

	fn ctx() -> EvaluationContext {
		EvaluationContext::new()
			.with_attribute("userId", "user-1")
			.with_attribute("plan", "enterprise")
			.with_attribute("age", 30)
			.with_attribute("email", "dev@example.com")
			.with_attribute("beta", true)
			.with_attribute("nothing", AttributeValue::Null)
	}

	fn rule(conditions: Vec<Condition>) -> Rule {
		Rule {
			id: "r".to_string(),
			conditions,
			result: RuleResult {
				enabled: true,
				variant: "on".to_string(),
			},
		}
	}

	#[test]
	fn test_eq_and_neq() {
		assert!(evaluate_condition(&Condition::new("plan", Operator::Eq, "enterprise"), &ctx()));
		assert!(!evaluate_condition(&Condition::new("plan", Operator::Eq, "free"), &ctx()));
		assert!(evaluate_condition(&Condition::new("plan", Operator::Neq, "free"), &ctx()));
		assert!(evaluate_condition(&Condition::new("beta", Operator::Eq, true), &ctx()));
	}

	#[test]
	fn test_eq_is_type_strict() {
		assert!(!evaluate_condition(&Condition::new("age", Operator::Eq, "30"), &ctx()));
		assert!(evaluate_condition(&Condition::new("age", Operator::Eq, 30), &ctx()));
	}

	#[test]
	fn test_missing_or_null_attribute_never_matches() {
		for op in [
			Operator::Eq,
			Operator::Neq,
			Operator::In,
			Operator::NotIn,
			Operator::Gt,
			Operator::Lt,
			Operator::Contains,
		] {
			assert!(!evaluate_condition(&Condition::new("missing", op, "x"), &ctx()));
			assert!(!evaluate_condition(
				&Condition::new("nothing", op, vec!["x"]),
				&ctx()
			));
		}
	}

	#[test]
	fn test_in_and_not_in() {
		let plans = vec!["pro", "enterprise"];
		assert!(evaluate_condition(&Condition::new("plan", Operator::In, plans.clone()), &ctx()));
		assert!(!evaluate_condition(&Condition::new("plan", Operator::NotIn, plans), &ctx()));
		assert!(evaluate_condition(
			&Condition::new("plan", Operator::NotIn, vec!["free"]),
			&ctx()
		));
	}

	#[test]
	fn test_in_requires_a_list() {
		assert!(!evaluate_condition(&Condition::new("plan", Operator::In, "enterprise"), &ctx()));
		assert!(!evaluate_condition(&Condition::new("plan", Operator::NotIn, "free"), &ctx()));
	}

	#[test]
	fn test_gt_and_lt_require_numbers() {
		assert!(evaluate_condition(&Condition::new("age", Operator::Gt, 18), &ctx()));
		assert!(!evaluate_condition(&Condition::new("age", Operator::Gt, 30), &ctx()));
		assert!(evaluate_condition(&Condition::new("age", Operator::Lt, 30.5), &ctx()));
		assert!(!evaluate_condition(&Condition::new("age", Operator::Lt, "40"), &ctx()));
		assert!(!evaluate_condition(&Condition::new("plan", Operator::Gt, 1), &ctx()));
	}

	#[test]
	fn test_contains_requires_strings() {
		assert!(evaluate_condition(
			&Condition::new("email", Operator::Contains, "@example.com"),
			&ctx()
		));
		assert!(!evaluate_condition(
			&Condition::new("email", Operator::Contains, "@other.org"),
			&ctx()
		));
		assert!(!evaluate_condition(&Condition::new("age", Operator::Contains, "3"), &ctx()));
	}

	#[test]
	fn test_unknown_operator_deserializes_and_never_matches() {
		let cond: Condition =
			serde_json::from_value(json!({"attr": "plan", "op": "STARTS_WITH", "value": "ent"}))
				.unwrap();
		assert_eq!(cond.op, Operator::Unknown);
		assert!(!evaluate_condition(&cond, &ctx()));
	}

	#[test]
	fn test_condition_accepts_long_field_names() {
		let cond: Condition = serde_json::from_value(
			json!({"attribute": "plan", "operator": "NOT_IN", "value": ["free"]}),
		)
		.unwrap();
		assert_eq!(cond.op, Operator::NotIn);
		assert!(evaluate_condition(&cond, &ctx()));
	}

	#[test]
	fn test_rule_is_a_conjunction() {
		let matching = rule(vec![
			Condition::new("plan", Operator::Eq, "enterprise"),
			Condition::new("age", Operator::Gt, 21),
		]);
		assert!(evaluate_rule(&matching, &ctx()));

		let one_fails = rule(vec![
			Condition::new("plan", Operator::Eq, "enterprise"),
			Condition::new("age", Operator::Gt, 65),
		]);
		assert!(!evaluate_rule(&one_fails, &ctx()));
	}

	#[test]
	fn test_empty_rule_never_matches() {
		assert!(!evaluate_rule(&rule(vec![]), &ctx()));
		assert!(!evaluate_rule(&rule(vec![]), &EvaluationContext::new()));
	}
}
