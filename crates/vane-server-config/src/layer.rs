// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	AuthConfigLayer, CacheConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer,
	SeedConfigLayer,
};

/// Server configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub cache: Option<CacheConfigLayer>,
	#[serde(default)]
	pub auth: Option<AuthConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub seed: Option<SeedConfigLayer>,
}

impl ServerConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_option(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_option(
			&mut self.database,
			other.database,
			DatabaseConfigLayer::merge,
		);
		merge_option(&mut self.cache, other.cache, CacheConfigLayer::merge);
		merge_option(&mut self.auth, other.auth, AuthConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_option(&mut self.seed, other.seed, SeedConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_empty_layers() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer::default());
		assert!(base.http.is_none());
		assert!(base.cache.is_none());
	}

	#[test]
	fn test_merge_preserves_base_when_other_empty() {
		let mut base = ServerConfigLayer {
			http: Some(HttpConfigLayer {
				port: Some(9000),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(ServerConfigLayer::default());
		assert_eq!(base.http.as_ref().unwrap().port, Some(9000));
	}

	#[test]
	fn test_merge_field_by_field() {
		let mut base = ServerConfigLayer {
			cache: Some(CacheConfigLayer {
				snapshot_ttl_secs: Some(60),
			}),
			http: Some(HttpConfigLayer {
				host: Some("127.0.0.1".to_string()),
				port: Some(3000),
			}),
			..Default::default()
		};
		let overlay = ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: None,
				port: Some(4000),
			}),
			..Default::default()
		};
		base.merge(overlay);

		let http = base.http.unwrap();
		assert_eq!(http.host.as_deref(), Some("127.0.0.1"));
		assert_eq!(http.port, Some(4000));
		assert_eq!(base.cache.unwrap().snapshot_ttl_secs, Some(60));
	}

	#[test]
	fn test_deserialize_from_toml() {
		let layer: ServerConfigLayer = toml::from_str(
			r#"
[http]
port = 9090

[cache]
snapshot_ttl_secs = 120

[seed]
path = "/etc/vane/seed.json"
"#,
		)
		.unwrap();
		assert_eq!(layer.http.unwrap().port, Some(9090));
		assert_eq!(layer.cache.unwrap().snapshot_ttl_secs, Some(120));
		assert_eq!(
			layer.seed.unwrap().path.as_deref(),
			Some(std::path::Path::new("/etc/vane/seed.json"))
		);
		assert!(layer.auth.is_none());
	}
}
