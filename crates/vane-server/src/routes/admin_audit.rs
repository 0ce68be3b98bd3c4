// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	extract::{Query, State},
	Json,
};
use serde::{Deserialize, Serialize};
use vane_server_flags::AuditEntry;

use crate::api::AppState;
use crate::error::{Result, ServerError};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
	pub environment_id: String,
	#[serde(default = "default_page")]
	pub page: u32,
	#[serde(default = "default_limit")]
	pub limit: u32,
}

fn default_page() -> u32 {
	1
}

fn default_limit() -> u32 {
	DEFAULT_LIMIT
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub page: u32,
	pub limit: u32,
	pub total: u64,
	pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditResponse {
	pub data: Vec<AuditEntry>,
	pub pagination: Pagination,
}

/// GET /v1/admin/audit?environmentId=&page=&limit= - newest first.
pub async fn list_audit(
	State(state): State<AppState>,
	Query(query): Query<AuditQuery>,
) -> Result<Json<AuditResponse>> {
	if query.page < 1 || query.limit < 1 || query.limit > MAX_LIMIT {
		return Err(ServerError::BadRequest(format!(
			"page must be >= 1 and limit between 1 and {MAX_LIMIT}"
		)));
	}

	let offset = (query.page - 1).saturating_mul(query.limit);
	let (data, total) = state
		.service
		.audit_log(&query.environment_id, query.limit, offset)
		.await?;

	Ok(Json(AuditResponse {
		data,
		pagination: Pagination {
			page: query.page,
			limit: query.limit,
			total,
			total_pages: total.div_ceil(u64::from(query.limit)),
		},
	}))
}
