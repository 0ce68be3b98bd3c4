// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Vane feature flag server.
//!
//! Serves environment snapshots to SDKs (with `ETag` revalidation), evaluates
//! single flags server-side, and exposes the admin API that publishes,
//! rolls back and archives flag versions.

pub mod api;
pub mod auth;
pub mod error;
pub mod routes;
pub mod seed;

pub use api::{create_app_state, create_router, AppState};
pub use error::{ErrorResponse, ServerError};
pub use seed::{apply_seed, load_seed_file, SeedError, SeedFile, SeedSummary};
pub use vane_server_config::ServerConfig;
