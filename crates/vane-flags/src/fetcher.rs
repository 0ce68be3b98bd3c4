// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Snapshot transport.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, instrument};
use vane_flags_core::Snapshot;

use crate::error::{FlagsError, Result};

/// Result of one fetch attempt that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
	Modified {
		snapshot: Snapshot,
		etag: Option<String>,
	},
	/// The entity tag sent with the request is still current.
	NotModified,
}

/// Retrieves the environment snapshot.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
	/// Fetches the snapshot, sending `etag` for conditional retrieval when held.
	async fn fetch(&self, etag: Option<&str>) -> Result<FetchOutcome>;
}

/// Fetches `GET {base_url}/v1/flags/snapshot` with a bearer API key.
pub struct HttpSnapshotFetcher {
	http_client: Client,
	snapshot_url: String,
	api_key: String,
}

impl HttpSnapshotFetcher {
	pub fn new(http_client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
		Self {
			http_client,
			snapshot_url: format!("{}/v1/flags/snapshot", base_url.trim_end_matches('/')),
			api_key: api_key.into(),
		}
	}

	pub fn snapshot_url(&self) -> &str {
		&self.snapshot_url
	}
}

#[async_trait]
impl SnapshotFetcher for HttpSnapshotFetcher {
	#[instrument(skip(self), fields(url = %self.snapshot_url))]
	async fn fetch(&self, etag: Option<&str>) -> Result<FetchOutcome> {
		let mut request = self
			.http_client
			.get(&self.snapshot_url)
			.bearer_auth(&self.api_key);
		if let Some(etag) = etag {
			request = request.header(header::IF_NONE_MATCH, etag);
		}

		let response = request.send().await.map_err(FlagsError::RequestFailed)?;
		let status = response.status();

		if status == StatusCode::NOT_MODIFIED {
			debug!("snapshot not modified");
			return Ok(FetchOutcome::NotModified);
		}

		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			return Err(FlagsError::ServerError {
				status: status.as_u16(),
				message,
			});
		}

		let etag = response
			.headers()
			.get(header::ETAG)
			.and_then(|v| v.to_str().ok())
			.map(str::to_string);
		let body = response.text().await.map_err(FlagsError::RequestFailed)?;
		let snapshot: Snapshot =
			serde_json::from_str(&body).map_err(|e| FlagsError::ParseFailed(e.to_string()))?;

		debug!(version = snapshot.version, "snapshot fetched");
		Ok(FetchOutcome::Modified { snapshot, etag })
	}
}
