// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Vane flag server.
//!
//! Layers are merged from defaults, a TOML file and `VANE_SERVER_*`
//! environment variables, in that order of increasing precedence.
//!
//! ```ignore
//! use vane_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

use std::path::PathBuf;
use std::time::Duration;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub cache: CacheConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,
	pub seed: SeedConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}

	pub fn snapshot_ttl(&self) -> Duration {
		self.cache.snapshot_ttl()
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`VANE_SERVER_*`)
/// 2. Config file (`/etc/vane/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let cache = layer.cache.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let seed = layer.seed.unwrap_or_default().finalize();

	if cache.snapshot_ttl_secs == 0 {
		return Err(ConfigError::Validation(
			"cache.snapshot_ttl_secs must be greater than zero".to_string(),
		));
	}

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		snapshot_ttl_secs = cache.snapshot_ttl_secs,
		admin_enabled = auth.admin_token.is_some(),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		cache,
		auth,
		logging,
		seed,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_finalize_defaults() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config.socket_addr(), "0.0.0.0:8080");
		assert_eq!(config.snapshot_ttl(), Duration::from_secs(300));
		assert!(config.auth.admin_token.is_none());
		assert!(config.seed.path.is_none());
	}

	#[test]
	fn test_finalize_rejects_zero_ttl() {
		let layer = ServerConfigLayer {
			cache: Some(CacheConfigLayer {
				snapshot_ttl_secs: Some(0),
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_file_layer_overrides_defaults() {
		let layer: ServerConfigLayer = toml::from_str(
			r#"
[http]
host = "127.0.0.1"
port = 7070

[seed]
path = "/srv/vane/seed.json"
"#,
		)
		.unwrap();
		let config = finalize(layer).unwrap();
		assert_eq!(config.socket_addr(), "127.0.0.1:7070");
		assert_eq!(config.seed.path, Some(PathBuf::from("/srv/vane/seed.json")));
	}
}
