// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Negotiation Values
//!
//! Transient request/response values for task negotiation. A
//! [`NegotiationRequest`] is built per call, consumed synchronously by
//! [`crate::application::negotiation::NegotiationService::negotiate`] and
//! discarded; the resulting [`CandidateAgent`] list is plain data.

use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentCapabilityRecord;
use crate::domain::scoring::PreferredCapabilities;
use crate::domain::session::ContextMap;

/// Upper bound on the number of candidates returned by one negotiation.
pub const MAX_CANDIDATES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationRequest {
    pub initiating_agent_name: String,
    pub requested_task: String,
    #[serde(default)]
    pub context: ContextMap,
    #[serde(default)]
    pub preferred_capabilities: PreferredCapabilities,
}

impl NegotiationRequest {
    pub fn new(initiating_agent_name: impl Into<String>, requested_task: impl Into<String>) -> Self {
        Self {
            initiating_agent_name: initiating_agent_name.into(),
            requested_task: requested_task.into(),
            context: ContextMap::new(),
            preferred_capabilities: PreferredCapabilities::default(),
        }
    }

    pub fn with_preferences(mut self, preferences: PreferredCapabilities) -> Self {
        self.preferred_capabilities = preferences;
        self
    }

    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = context;
        self
    }
}

/// An agent proposed as executor for a negotiated task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAgent {
    pub agent_name: String,
    pub match_score: f64,
    pub supported_tasks: Vec<String>,
    #[serde(rename = "negotiation")]
    pub negotiation_capable: bool,
    pub token_budget: u64,
}

impl CandidateAgent {
    pub fn from_record(record: &AgentCapabilityRecord, match_score: f64) -> Self {
        Self {
            agent_name: record.name().to_string(),
            match_score,
            supported_tasks: record.supported_tasks().to_vec(),
            negotiation_capable: record.negotiation_capable(),
            token_budget: record.token_budget(),
        }
    }
}

/// Order candidates by descending score and keep the best [`MAX_CANDIDATES`].
///
/// `Vec::sort_by` is stable, so candidates with equal scores keep the
/// directory's iteration order.
pub fn rank_candidates(mut candidates: Vec<CandidateAgent>) -> Vec<CandidateAgent> {
    candidates.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}
