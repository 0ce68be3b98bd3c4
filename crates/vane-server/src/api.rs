// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::{
	middleware::from_fn_with_state,
	routing::{get, post, put},
	Router,
};
use vane_server_config::ServerConfig;
use vane_server_flags::{FlagsRepository, SnapshotCache, SnapshotService};

use crate::auth::admin_auth_middleware;
use crate::routes;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub service: SnapshotService,
	pub admin_token: Option<Arc<str>>,
}

pub fn create_app_state(repository: Arc<dyn FlagsRepository>, config: &ServerConfig) -> AppState {
	let cache = SnapshotCache::new(config.snapshot_ttl());

	AppState {
		service: SnapshotService::new(repository, cache),
		admin_token: config.auth.admin_token.as_deref().map(Arc::from),
	}
}

pub fn create_router(state: AppState) -> Router {
	let admin = Router::new()
		.route(
			"/flags",
			get(routes::admin_flags::list_flags).post(routes::admin_flags::create_flag),
		)
		.route("/flags/{key}", put(routes::admin_flags::update_flag))
		.route("/flags/{key}/publish", post(routes::admin_flags::publish_flag))
		.route(
			"/flags/{key}/rollback/{version}",
			post(routes::admin_flags::rollback_flag),
		)
		.route(
			"/flags/{key}/archive",
			post(routes::admin_flags::archive_flag).patch(routes::admin_flags::archive_flag),
		)
		.route(
			"/flags/{key}/unarchive",
			post(routes::admin_flags::unarchive_flag).patch(routes::admin_flags::unarchive_flag),
		)
		.route(
			"/environments",
			get(routes::admin_environments::list_environments)
				.post(routes::admin_environments::create_environment),
		)
		.route("/audit", get(routes::admin_audit::list_audit))
		.route_layer(from_fn_with_state(
			state.admin_token.clone(),
			admin_auth_middleware,
		));

	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/v1/flags/snapshot", get(routes::snapshot::get_snapshot))
		.route("/v1/evaluate", post(routes::evaluate::evaluate_flag))
		.nest("/v1/admin", admin)
		.with_state(state)
}
