// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dynamically typed attribute values used in conditions and contexts.

use serde::{Deserialize, Serialize};

/// A context attribute or condition operand.
///
/// Converts to and from JSON. JSON objects have no counterpart here and are
/// read as [`AttributeValue::Null`], which never matches any condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum AttributeValue {
	#[default]
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	List(Vec<AttributeValue>),
}

impl AttributeValue {
	pub fn is_null(&self) -> bool {
		matches!(self, AttributeValue::Null)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			AttributeValue::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			AttributeValue::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[AttributeValue]> {
		match self {
			AttributeValue::List(items) => Some(items),
			_ => None,
		}
	}

	/// Renders the value the way rollout stickiness expects it, so that a
	/// numeric `42` and the string `"42"` land in the same bucket.
	pub fn to_stickiness_string(&self) -> String {
		match self {
			AttributeValue::Null => "null".to_string(),
			AttributeValue::Bool(b) => b.to_string(),
			AttributeValue::Number(n) => format_number(*n),
			AttributeValue::String(s) => s.clone(),
			AttributeValue::List(items) => items
				.iter()
				.map(|item| match item {
					AttributeValue::Null => String::new(),
					other => other.to_stickiness_string(),
				})
				.collect::<Vec<_>>()
				.join(","),
		}
	}
}

fn format_number(n: f64) -> String {
	if n.is_nan() {
		"NaN".to_string()
	} else if n.is_infinite() {
		if n > 0.0 {
			"Infinity".to_string()
		} else {
			"-Infinity".to_string()
		}
	} else if n == 0.0 {
		"0".to_string()
	} else {
		n.to_string()
	}
}

impl From<serde_json::Value> for AttributeValue {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null | serde_json::Value::Object(_) => AttributeValue::Null,
			serde_json::Value::Bool(b) => AttributeValue::Bool(b),
			serde_json::Value::Number(n) => n
				.as_f64()
				.map(AttributeValue::Number)
				.unwrap_or(AttributeValue::Null),
			serde_json::Value::String(s) => AttributeValue::String(s),
			serde_json::Value::Array(items) => {
				AttributeValue::List(items.into_iter().map(AttributeValue::from).collect())
			}
		}
	}
}

impl From<AttributeValue> for serde_json::Value {
	fn from(value: AttributeValue) -> Self {
		match value {
			AttributeValue::Null => serde_json::Value::Null,
			AttributeValue::Bool(b) => serde_json::Value::Bool(b),
			AttributeValue::Number(n) => {
				if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
					serde_json::Value::from(n as i64)
				} else {
					serde_json::Number::from_f64(n)
						.map(serde_json::Value::Number)
						.unwrap_or(serde_json::Value::Null)
				}
			}
			AttributeValue::String(s) => serde_json::Value::String(s),
			AttributeValue::List(items) => {
				serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
			}
		}
	}
}

impl From<bool> for AttributeValue {
	fn from(b: bool) -> Self {
		AttributeValue::Bool(b)
	}
}

impl From<f64> for AttributeValue {
	fn from(n: f64) -> Self {
		AttributeValue::Number(n)
	}
}

impl From<i64> for AttributeValue {
	fn from(n: i64) -> Self {
		AttributeValue::Number(n as f64)
	}
}

impl From<i32> for AttributeValue {
	fn from(n: i32) -> Self {
		AttributeValue::Number(f64::from(n))
	}
}

impl From<u32> for AttributeValue {
	fn from(n: u32) -> Self {
		AttributeValue::Number(f64::from(n))
	}
}

impl From<&str> for AttributeValue {
	fn from(s: &str) -> Self {
		AttributeValue::String(s.to_string())
	}
}

impl From<String> for AttributeValue {
	fn from(s: String) -> Self {
		AttributeValue::String(s)
	}
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
	fn from(items: Vec<T>) -> Self {
		AttributeValue::List(items.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(AttributeValue::Null)
	}
}
