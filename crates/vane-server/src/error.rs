// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP error type for vane-server handlers.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::{Deserialize, Serialize};
use vane_server_flags::FlagsServerError;

/// Error body returned by every failing route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("unauthorized: {0}")]
	Unauthorized(String),

	#[error("bad request: {0}")]
	BadRequest(String),

	#[error("not found: {0}")]
	NotFound(String),

	#[error("conflict: {0}")]
	Conflict(String),

	#[error("internal error: {0}")]
	Internal(String),
}

impl ServerError {
	fn parts(&self) -> (StatusCode, &'static str, String) {
		match self {
			ServerError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
			ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
			ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
			ServerError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
			ServerError::Internal(_) => (
				StatusCode::INTERNAL_SERVER_ERROR,
				"internal_error",
				"Internal server error".to_string(),
			),
		}
	}
}

impl From<FlagsServerError> for ServerError {
	fn from(e: FlagsServerError) -> Self {
		match e {
			FlagsServerError::FlagNotFound(key) => {
				ServerError::NotFound(format!("Flag not found: {key}"))
			}
			FlagsServerError::VersionNotFound { key, version } => {
				ServerError::NotFound(format!("Flag {key} has no version {version}"))
			}
			FlagsServerError::InvalidVersion(v) => {
				ServerError::BadRequest(format!("Invalid version number: {v}"))
			}
			FlagsServerError::DuplicateFlag(key) => {
				ServerError::Conflict(format!("Flag already exists: {key}"))
			}
			FlagsServerError::Core(e) => ServerError::BadRequest(e.to_string()),
			other => ServerError::Internal(other.to_string()),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error, message) = self.parts();
		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		}

		(
			status,
			Json(ErrorResponse {
				error: error.to_string(),
				message,
			}),
		)
			.into_response()
	}
}

pub type Result<T> = std::result::Result<T, ServerError>;
