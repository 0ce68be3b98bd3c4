// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::{Result, ServerError};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEnvironmentRequest {
	pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentResponse {
	pub id: String,
	pub name: String,
	pub created_at: DateTime<Utc>,
}

/// Returned once at creation; the raw key cannot be retrieved again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEnvironmentResponse {
	pub id: String,
	pub name: String,
	pub api_key: String,
	pub created_at: DateTime<Utc>,
}

/// POST /v1/admin/environments
pub async fn create_environment(
	State(state): State<AppState>,
	Json(body): Json<CreateEnvironmentRequest>,
) -> Result<impl IntoResponse> {
	let name = body.name.trim();
	if name.is_empty() || name.len() > 50 {
		return Err(ServerError::BadRequest(
			"name must be between 1 and 50 characters".to_string(),
		));
	}

	let created = state.service.create_environment(name).await?;
	Ok((
		StatusCode::CREATED,
		Json(CreatedEnvironmentResponse {
			id: created.environment.id,
			name: created.environment.name,
			api_key: created.api_key,
			created_at: created.environment.created_at,
		}),
	))
}

/// GET /v1/admin/environments
pub async fn list_environments(
	State(state): State<AppState>,
) -> Result<Json<Vec<EnvironmentResponse>>> {
	let environments = state.service.list_environments().await?;
	Ok(Json(
		environments
			.into_iter()
			.map(|e| EnvironmentResponse {
				id: e.id,
				name: e.name,
				created_at: e.created_at,
			})
			.collect(),
	))
}
