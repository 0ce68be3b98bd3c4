// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for vane-server.

pub mod auth;
pub mod cache;
pub mod database;
pub mod http;
pub mod logging;
pub mod seed;

pub use auth::{AuthConfig, AuthConfigLayer};
pub use cache::{CacheConfig, CacheConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use seed::{SeedConfig, SeedConfigLayer};
