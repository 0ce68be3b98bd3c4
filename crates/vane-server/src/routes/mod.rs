// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod admin_audit;
pub mod admin_environments;
pub mod admin_flags;
pub mod evaluate;
pub mod health;
pub mod snapshot;
