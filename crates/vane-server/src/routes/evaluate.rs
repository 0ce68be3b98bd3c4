// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use vane_flags_core::{EvaluationContext, EvaluationReason};

use crate::api::AppState;
use crate::auth::SdkEnvironment;
use crate::error::{Result, ServerError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
	pub flag_key: String,
	#[serde(default)]
	pub context: EvaluationContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
	pub enabled: bool,
	pub variant: String,
	pub reason: EvaluationReason,
	pub flag_version: u64,
}

/// POST /v1/evaluate - server-side evaluation of one flag.
#[tracing::instrument(skip_all, fields(env_id = %environment.id, flag_key = %body.flag_key))]
pub async fn evaluate_flag(
	State(state): State<AppState>,
	SdkEnvironment(environment): SdkEnvironment,
	Json(body): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>> {
	if body.flag_key.is_empty() {
		return Err(ServerError::BadRequest("flagKey must not be empty".to_string()));
	}

	let evaluation = state
		.service
		.evaluate(&environment.id, &body.flag_key, &body.context)
		.await?;

	Ok(Json(EvaluateResponse {
		enabled: evaluation.result.enabled,
		variant: evaluation.result.variant,
		reason: evaluation.result.reason,
		flag_version: evaluation.flag_version,
	}))
}
