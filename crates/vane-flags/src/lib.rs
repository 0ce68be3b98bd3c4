// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feature flags Rust SDK for Vane.
//!
//! The client polls the environment snapshot, holds it behind an atomic
//! pointer, and evaluates flags locally.
//!
//! # Example
//!
//! ```ignore
//! use vane_flags::{EvaluationContext, FlagsClient};
//!
//! let client = FlagsClient::builder()
//!     .api_key("ff_...")
//!     .base_url("https://flags.example.com")
//!     .build()?;
//! client.init().await;
//!
//! let context = EvaluationContext::new().with_attribute("userId", "user-42");
//! if client.is_enabled("new-checkout", &context) {
//!     // ...
//! }
//!
//! client.close();
//! ```

mod client;
mod error;
mod fetcher;

pub use client::{ClientConfig, FlagsClient, FlagsClientBuilder, SyncOutcome};
pub use error::{FlagsError, Result};
pub use fetcher::{FetchOutcome, HttpSnapshotFetcher, SnapshotFetcher};

pub use vane_common_http::RetryConfig;
pub use vane_flags_core::{
	EvaluationContext, EvaluationReason, EvaluationResult, FlagState, Snapshot,
};
