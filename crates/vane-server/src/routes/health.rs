// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api::AppState;

/// GET /health - checks that storage answers.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	match state.service.list_environments().await {
		Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
		Err(e) => {
			tracing::error!(error = %e, "health check failed");
			(
				StatusCode::SERVICE_UNAVAILABLE,
				Json(json!({ "status": "unhealthy" })),
			)
		}
	}
}
