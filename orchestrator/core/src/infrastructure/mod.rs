// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod db;
pub mod rate_limiter;
pub mod repositories;

pub use rate_limiter::{KeyedRateLimitStore, RateLimitDecision, RateLimitStore};
