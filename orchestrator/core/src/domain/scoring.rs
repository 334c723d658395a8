// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Match Scorer
//!
//! Deterministic score in `[0, 1]` for one pre-filtered candidate against a
//! caller's preferences. External SDKs filter on these exact values, so the
//! additive scheme below is contractual:
//!
//! | Term | Tenths | Condition |
//! |------|--------|-----------|
//! | base | 8 | candidate passed the task filter |
//! | negotiation | +1 | caller prefers negotiation **and** agent is negotiation-capable |
//! | budget | +1 | agent budget ≥ preferred budget (missing or negative preference always satisfied) |
//!
//! The sum is capped at 10 tenths. Arithmetic is done on integer tenths and
//! converted once, so results are exactly the doubles `0.8`, `0.9` and `1.0`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::agent::AgentCapabilityRecord;

const BASE_TENTHS: u8 = 8;
const NEGOTIATION_BONUS_TENTHS: u8 = 1;
const BUDGET_BONUS_TENTHS: u8 = 1;
const MAX_TENTHS: u8 = 10;

/// Capabilities a negotiating agent would like its counterpart to have.
///
/// Only `negotiation` and `tokenBudget` influence scoring. Every other key is
/// preserved in `extra` and passed through untouched.
///
/// Parsing is lenient: a `negotiation` value that is not a boolean means "not
/// preferred", and a non-numeric budget means "no minimum". Such values stay
/// in `extra`. Fractional budgets round up. `tokenBudget` wins over
/// `token_budget` when both are present; the loser stays in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct PreferredCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiation: Option<bool>,

    #[serde(rename = "tokenBudget", skip_serializing_if = "Option::is_none")]
    pub token_budget: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const BUDGET_KEYS: [&str; 2] = ["tokenBudget", "token_budget"];

impl From<Map<String, Value>> for PreferredCapabilities {
    fn from(mut raw: Map<String, Value>) -> Self {
        let negotiation = match raw.get("negotiation") {
            Some(Value::Bool(b)) => {
                let b = *b;
                raw.remove("negotiation");
                Some(b)
            }
            _ => None,
        };

        let mut token_budget = None;
        for key in BUDGET_KEYS {
            if let Some(budget) = raw.get(key).and_then(budget_from_json) {
                raw.remove(key);
                token_budget = Some(budget);
                break;
            }
        }

        Self {
            negotiation,
            token_budget,
            extra: raw,
        }
    }
}

fn budget_from_json(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    if number.as_u64().is_some() {
        return Some(i64::MAX);
    }
    // Saturating cast.
    number.as_f64().map(|f| f.ceil() as i64)
}

impl PreferredCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_negotiation(mut self, negotiation: bool) -> Self {
        self.negotiation = Some(negotiation);
        self
    }

    pub fn with_token_budget(mut self, token_budget: i64) -> Self {
        self.token_budget = Some(token_budget);
        self
    }

    fn wants_negotiation(&self) -> bool {
        self.negotiation.unwrap_or(false)
    }

    fn satisfied_by_budget(&self, budget: u64) -> bool {
        match self.token_budget {
            None => true,
            Some(min) if min <= 0 => true,
            Some(min) => budget >= min as u64,
        }
    }
}

/// Score a candidate that already passed the capability index filter.
pub fn score(record: &AgentCapabilityRecord, preferences: &PreferredCapabilities) -> f64 {
    let mut tenths = BASE_TENTHS;

    if preferences.wants_negotiation() && record.negotiation_capable() {
        tenths += NEGOTIATION_BONUS_TENTHS;
    }

    if preferences.satisfied_by_budget(record.token_budget()) {
        tenths += BUDGET_BONUS_TENTHS;
    }

    f64::from(tenths.min(MAX_TENTHS)) / 10.0
}
