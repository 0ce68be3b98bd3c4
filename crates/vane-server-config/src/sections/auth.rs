// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin authentication configuration.

use serde::Deserialize;

#[derive(Clone, Default)]
pub struct AuthConfig {
	/// Bearer token for `/v1/admin` routes. Admin routes are closed when unset.
	pub admin_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthConfig")
			.field(
				"admin_token",
				&self.admin_token.as_ref().map(|_| "[REDACTED]"),
			)
			.finish()
	}
}

#[derive(Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub admin_token: Option<String>,
}

impl std::fmt::Debug for AuthConfigLayer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthConfigLayer")
			.field(
				"admin_token",
				&self.admin_token.as_ref().map(|_| "[REDACTED]"),
			)
			.finish()
	}
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.admin_token.is_some() {
			self.admin_token = other.admin_token;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			admin_token: self.admin_token.filter(|t| !t.is_empty()),
		}
	}
}
