// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the feature flags SDK.

use thiserror::Error;
use vane_common_http::RetryableError;

/// Result type alias for the flags SDK.
pub type Result<T> = std::result::Result<T, FlagsError>;

/// Errors that can occur in the feature flags SDK.
#[derive(Error, Debug)]
pub enum FlagsError {
	/// API key is missing.
	#[error("Invalid or missing API key")]
	InvalidApiKey,

	/// Base URL is missing.
	#[error("Invalid or missing base URL")]
	InvalidBaseUrl,

	/// Failed to build the HTTP client or reach the server.
	#[error("Failed to connect to server: {0}")]
	ConnectionFailed(#[source] reqwest::Error),

	#[error("HTTP request failed: {0}")]
	RequestFailed(#[source] reqwest::Error),

	/// Server answered with a status other than 2xx or 304.
	#[error("Server returned an error: {status} - {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Response body, if any.
		message: String,
	},

	/// Failed to parse the snapshot body.
	#[error("Failed to parse server response: {0}")]
	ParseFailed(String),
}

impl RetryableError for FlagsError {
	/// Every failure to obtain a snapshot is retried; only client
	/// misconfiguration is not.
	fn is_retryable(&self) -> bool {
		!matches!(self, FlagsError::InvalidApiKey | FlagsError::InvalidBaseUrl)
	}
}
