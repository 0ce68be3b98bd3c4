// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin routes for flag lifecycle within an environment.
//!
//! Every write here creates a flag version or changes which flags are live,
//! and the service invalidates the environment's snapshot before answering.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vane_flags_core::FlagState;
use vane_server_flags::FlagVersion;

use crate::api::AppState;
use crate::auth::ADMIN_ACTOR;
use crate::error::{Result, ServerError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentQuery {
	pub environment_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentBody {
	pub environment_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlagRequest {
	pub key: String,
	pub environment_id: String,
	pub initial_state: FlagState,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlagRequest {
	pub environment_id: String,
	#[serde(alias = "state")]
	pub state_json: FlagState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagVersionResponse {
	pub key: String,
	pub environment_id: String,
	pub version: u64,
	pub state: FlagState,
	pub created_by: Option<String>,
	pub created_at: DateTime<Utc>,
}

impl From<FlagVersion> for FlagVersionResponse {
	fn from(v: FlagVersion) -> Self {
		Self {
			key: v.key,
			environment_id: v.environment_id,
			version: v.version,
			state: v.state,
			created_by: v.created_by,
			created_at: v.created_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
	pub key: String,
	pub version: u64,
	pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackResponse {
	pub key: String,
	pub rolled_back_to_version: u64,
	pub new_version: u64,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveResponse {
	pub key: String,
	pub archived: bool,
}

/// GET /v1/admin/flags?environmentId=
pub async fn list_flags(
	State(state): State<AppState>,
	Query(query): Query<EnvironmentQuery>,
) -> Result<Json<Vec<FlagVersionResponse>>> {
	let flags = state.service.list_flags(&query.environment_id).await?;
	Ok(Json(flags.into_iter().map(Into::into).collect()))
}

/// POST /v1/admin/flags
pub async fn create_flag(
	State(state): State<AppState>,
	Json(body): Json<CreateFlagRequest>,
) -> Result<impl IntoResponse> {
	let created = state
		.service
		.create_flag(&body.environment_id, &body.key, &body.initial_state, ADMIN_ACTOR)
		.await?;

	Ok((
		StatusCode::CREATED,
		Json(FlagVersionResponse::from(created)),
	))
}

/// PUT /v1/admin/flags/{key} - records the new state as the next version.
pub async fn update_flag(
	State(state): State<AppState>,
	Path(key): Path<String>,
	Json(body): Json<UpdateFlagRequest>,
) -> Result<Json<FlagVersionResponse>> {
	let version = state
		.service
		.update_state(&body.environment_id, &key, &body.state_json, ADMIN_ACTOR)
		.await?;
	Ok(Json(version.into()))
}

/// POST /v1/admin/flags/{key}/publish
pub async fn publish_flag(
	State(state): State<AppState>,
	Path(key): Path<String>,
	Json(body): Json<EnvironmentBody>,
) -> Result<Json<PublishResponse>> {
	let version = state
		.service
		.publish(&body.environment_id, &key, ADMIN_ACTOR)
		.await?;

	Ok(Json(PublishResponse {
		key,
		version: version.version,
		published_at: version.created_at,
	}))
}

/// POST /v1/admin/flags/{key}/rollback/{version}
pub async fn rollback_flag(
	State(state): State<AppState>,
	Path((key, version)): Path<(String, String)>,
	Json(body): Json<EnvironmentBody>,
) -> Result<Json<RollbackResponse>> {
	let target: u64 = version
		.parse()
		.ok()
		.filter(|v| *v >= 1)
		.ok_or_else(|| ServerError::BadRequest("Invalid version number".to_string()))?;

	let outcome = state
		.service
		.rollback(&body.environment_id, &key, target, ADMIN_ACTOR)
		.await?;

	Ok(Json(RollbackResponse {
		key: outcome.key,
		rolled_back_to_version: outcome.rolled_back_to,
		new_version: outcome.version.version,
		created_at: outcome.version.created_at,
	}))
}

pub async fn archive_flag(
	State(state): State<AppState>,
	Path(key): Path<String>,
	Json(body): Json<EnvironmentBody>,
) -> Result<Json<ArchiveResponse>> {
	state
		.service
		.archive(&body.environment_id, &key, ADMIN_ACTOR)
		.await?;
	Ok(Json(ArchiveResponse {
		key,
		archived: true,
	}))
}

pub async fn unarchive_flag(
	State(state): State<AppState>,
	Path(key): Path<String>,
	Json(body): Json<EnvironmentBody>,
) -> Result<Json<ArchiveResponse>> {
	state
		.service
		.unarchive(&body.environment_id, &key, ADMIN_ACTOR)
		.await?;
	Ok(Json(ArchiveResponse {
		key,
		archived: false,
	}))
}
