// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request authentication.
//!
//! SDK routes authenticate with an environment API key; admin routes with the
//! static admin token from configuration.

use std::sync::Arc;

use axum::{
	extract::{FromRequestParts, Request, State},
	http::{header::AUTHORIZATION, request::Parts},
	middleware::Next,
	response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::{debug, instrument, warn};
use vane_server_flags::{bearer_token, Environment};

use crate::api::AppState;
use crate::error::ServerError;

/// Actor recorded in the audit log for requests carrying the admin token.
pub const ADMIN_ACTOR: &str = "admin";

/// The environment whose API key authenticated the request.
#[derive(Debug, Clone)]
pub struct SdkEnvironment(pub Environment);

impl FromRequestParts<AppState> for SdkEnvironment {
	type Rejection = ServerError;

	#[instrument(name = "SdkEnvironment::from_request_parts", skip_all)]
	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let Some(key) = parts
			.headers
			.get(AUTHORIZATION)
			.and_then(|h| h.to_str().ok())
			.and_then(bearer_token)
		else {
			debug!("missing or malformed Authorization header");
			return Err(ServerError::Unauthorized(
				"Missing or invalid Authorization header".to_string(),
			));
		};

		match state.service.authenticate(key).await? {
			Some(environment) => {
				debug!(env_id = %environment.id, "api key accepted");
				Ok(SdkEnvironment(environment))
			}
			None => {
				warn!("api key rejected");
				Err(ServerError::Unauthorized("Invalid API key".to_string()))
			}
		}
	}
}

pub async fn admin_auth_middleware(
	State(expected_token): State<Option<Arc<str>>>,
	request: Request,
	next: Next,
) -> Response {
	let Some(expected) = expected_token else {
		warn!("admin auth failed: no admin token configured");
		return ServerError::Unauthorized("Admin API is disabled".to_string()).into_response();
	};

	let Some(token) = request
		.headers()
		.get(AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(bearer_token)
	else {
		warn!("admin auth failed: missing Authorization header");
		return ServerError::Unauthorized("Missing or invalid Authorization header".to_string())
			.into_response();
	};

	let expected_bytes = expected.as_bytes();
	let token_bytes = token.as_bytes();
	if expected_bytes.len() == token_bytes.len() && bool::from(expected_bytes.ct_eq(token_bytes)) {
		next.run(request).await
	} else {
		warn!("admin auth failed: invalid token");
		ServerError::Unauthorized("Invalid or expired token".to_string()).into_response()
	}
}
