// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types and the evaluation engine for Vane feature flags.
//!
//! This crate is shared by the server (`vane-server-flags`) and the client
//! SDK (`vane-flags`). Everything here is synchronous and side-effect free,
//! so evaluation can run on any thread without coordination.
//!
//! # Example
//!
//! ```
//! use vane_flags_core::{evaluate, EvaluationContext, EvaluationReason, FlagState, RolloutConfig};
//!
//! let mut state = FlagState::boolean(true);
//! state.rollout = Some(RolloutConfig::percent(100, "userId"));
//!
//! let ctx = EvaluationContext::new().with_attribute("userId", "user-1");
//! let result = evaluate(&state, "dark-mode", &ctx);
//! assert!(result.enabled);
//! assert_eq!(result.reason, EvaluationReason::Rollout);
//! ```

pub mod condition;
pub mod context;
pub mod error;
pub mod evaluation;
pub mod flag;
pub mod hash;
pub mod rollout;
pub mod snapshot;
pub mod value;

pub use condition::{evaluate_condition, evaluate_rule, Condition, Operator};
pub use context::EvaluationContext;
pub use error::{FlagsError, Result};
pub use evaluation::{evaluate, EvaluationReason, EvaluationResult, SAFE_DEFAULT_VARIANT};
pub use flag::{FlagState, RolloutConfig, RolloutType, Rule, RuleResult};
pub use hash::{bucket, murmurhash3};
pub use rollout::evaluate_rollout;
pub use snapshot::{etag_for_version, Snapshot};
pub use value::AttributeValue;
