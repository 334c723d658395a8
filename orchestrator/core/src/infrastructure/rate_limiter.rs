// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Request Rate Limiting
//!
//! Per-caller admission control for the HTTP surface. Callers are keyed by
//! the resolved principal name, or by peer address when names are not
//! verified. Each key gets its own GCRA bucket from `governor`.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{anyhow, Result};
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

use crate::domain::config::RateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: Duration },
}

/// Admission check keyed by caller identity.
pub trait RateLimitStore: Send + Sync {
    fn check(&self, key: &str) -> RateLimitDecision;
}

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// `RateLimitStore` backed by a keyed governor limiter.
pub struct KeyedRateLimitStore {
    limiter: KeyedLimiter,
    clock: DefaultClock,
}

impl KeyedRateLimitStore {
    pub fn new(requests_per_minute: u32, burst: u32) -> Result<Self> {
        let rate = NonZeroU32::new(requests_per_minute)
            .ok_or_else(|| anyhow!("requests_per_minute must be greater than 0"))?;
        // A burst of zero means "same as the per-minute rate".
        let burst = NonZeroU32::new(burst).unwrap_or(rate);

        Ok(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(rate).allow_burst(burst)),
            clock: DefaultClock::default(),
        })
    }

    /// Build from config. `None` when rate limiting is disabled.
    pub fn from_config(config: &RateLimitConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        Self::new(config.requests_per_minute, config.burst).map(Some)
    }

    /// Drop buckets that have fully refilled.
    pub fn prune(&self) {
        self.limiter.retain_recent();
    }

    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }
}

impl RateLimitStore for KeyedRateLimitStore {
    fn check(&self, key: &str) -> RateLimitDecision {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => RateLimitDecision::Allowed,
            Err(not_until) => RateLimitDecision::Limited {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }
}
