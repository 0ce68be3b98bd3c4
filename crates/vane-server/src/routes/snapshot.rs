// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Snapshot distribution for SDKs.

use axum::{
	extract::State,
	http::{
		header::{ETAG, IF_NONE_MATCH},
		HeaderMap, HeaderName, StatusCode,
	},
	response::{IntoResponse, Response},
	Json,
};
use vane_server_flags::SnapshotRead;

use crate::api::AppState;
use crate::auth::SdkEnvironment;
use crate::error::Result;

/// Diagnostic header telling whether the snapshot came from the cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// GET /v1/flags/snapshot
///
/// Answers 304 with no body when `If-None-Match` names the current version,
/// otherwise the full snapshot with its `ETag`.
#[tracing::instrument(skip_all, fields(env_id = %environment.id))]
pub async fn get_snapshot(
	State(state): State<AppState>,
	SdkEnvironment(environment): SdkEnvironment,
	headers: HeaderMap,
) -> Result<Response> {
	let if_none_match = headers.get(IF_NONE_MATCH).and_then(|v| v.to_str().ok());

	let response = match state
		.service
		.read_snapshot(&environment.id, if_none_match)
		.await?
	{
		SnapshotRead::NotModified { etag, cache } => (
			StatusCode::NOT_MODIFIED,
			[(ETAG, etag), (X_CACHE, cache.as_str().to_string())],
		)
			.into_response(),
		SnapshotRead::Fresh {
			snapshot,
			etag,
			cache,
		} => {
			tracing::debug!(version = snapshot.version, cache = cache.as_str(), "serving snapshot");
			(
				StatusCode::OK,
				[(ETAG, etag), (X_CACHE, cache.as_str().to_string())],
				Json(snapshot.as_ref()),
			)
				.into_response()
		}
	};

	Ok(response)
}
