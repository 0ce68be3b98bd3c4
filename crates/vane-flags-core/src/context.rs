// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value::AttributeValue;

/// Per-call attributes describing the subject of an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationContext {
	pub attributes: HashMap<String, AttributeValue>,
}

impl EvaluationContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
		self.attributes.insert(name.into(), value.into());
	}

	/// Returns the attribute unless it is absent or null.
	pub fn get(&self, name: &str) -> Option<&AttributeValue> {
		self.attributes.get(name).filter(|v| !v.is_null())
	}

	pub fn is_empty(&self) -> bool {
		self.attributes.is_empty()
	}
}

impl<K, V> FromIterator<(K, V)> for EvaluationContext
where
	K: Into<String>,
	V: Into<AttributeValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			attributes: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}
