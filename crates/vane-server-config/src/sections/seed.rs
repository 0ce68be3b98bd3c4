// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Seed data configuration.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedConfig {
	/// JSON file of environments and flags loaded at startup.
	pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfigLayer {
	#[serde(default)]
	pub path: Option<PathBuf>,
}

impl SeedConfigLayer {
	pub fn merge(&mut self, other: SeedConfigLayer) {
		if other.path.is_some() {
			self.path = other.path;
		}
	}

	pub fn finalize(self) -> SeedConfig {
		SeedConfig { path: self.path }
	}
}
