// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Wire types and client-side candidate helpers.
//!
//! Request and response bodies are shared with `agora-core` so the SDK and
//! the server cannot drift apart.

use serde::Serialize;

pub use agora_core::application::negotiation::InitiateSessionRequest;
pub use agora_core::application::session_registry::UpdateSessionRequest;
pub use agora_core::domain::negotiation::{CandidateAgent, NegotiationRequest};
pub use agora_core::domain::scoring::PreferredCapabilities;
pub use agora_core::domain::session::{ContextMap, SessionStatus};
pub use agora_core::presentation::api::{
    AgentDescriptorResponse, InitiateSessionResponse, NegotiateResponse, SessionListResponse, SessionView,
    TerminateSessionResponse, UpdateSessionResponse,
};

/// Query parameters for `GET /a2a/sessions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListSessionsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiating_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl ListSessionsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initiating_agent(mut self, name: impl Into<String>) -> Self {
        self.initiating_agent = Some(name.into());
        self
    }

    pub fn target_agent(mut self, name: impl Into<String>) -> Self {
        self.target_agent = Some(name.into());
        self
    }

    pub fn status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Keep candidates meeting every threshold, preserving order.
pub fn filter_candidates(
    candidates: &[CandidateAgent],
    min_score: f64,
    requires_negotiation: bool,
    min_token_budget: u64,
) -> Vec<CandidateAgent> {
    candidates
        .iter()
        .filter(|c| c.match_score >= min_score)
        .filter(|c| !requires_negotiation || c.negotiation_capable)
        .filter(|c| c.token_budget >= min_token_budget)
        .cloned()
        .collect()
}

/// Weights for [`rank_by_criteria`]. A zero weight ignores the criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankingWeights {
    pub match_score: f64,
    pub negotiation: f64,
    /// Applied to the budget normalised against the largest budget in the set.
    pub token_budget: f64,
}

/// Re-order candidates by a weighted blend of score, negotiation support and
/// relative token budget. Ties keep their original order.
pub fn rank_by_criteria(candidates: &[CandidateAgent], weights: RankingWeights) -> Vec<(CandidateAgent, f64)> {
    let max_budget = candidates
        .iter()
        .map(|c| c.token_budget)
        .max()
        .filter(|&b| b > 0)
        .unwrap_or(1) as f64;

    let mut ranked: Vec<(CandidateAgent, f64)> = candidates
        .iter()
        .map(|c| {
            let negotiation = if c.negotiation_capable { 1.0 } else { 0.0 };
            let weighted = c.match_score * weights.match_score
                + negotiation * weights.negotiation
                + (c.token_budget as f64 / max_budget) * weights.token_budget;
            (c.clone(), weighted)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, score: f64, negotiation: bool, budget: u64) -> CandidateAgent {
        CandidateAgent {
            agent_name: name.to_string(),
            match_score: score,
            supported_tasks: vec!["translate".to_string()],
            negotiation_capable: negotiation,
            token_budget: budget,
        }
    }

    #[test]
    fn test_filter_candidates() {
        let all = vec![
            candidate("a", 1.0, true, 500),
            candidate("b", 0.9, false, 2000),
            candidate("c", 0.8, true, 50),
        ];

        let names = |v: Vec<CandidateAgent>| v.into_iter().map(|c| c.agent_name).collect::<Vec<_>>();
        assert_eq!(names(filter_candidates(&all, 0.0, false, 0)), vec!["a", "b", "c"]);
        assert_eq!(names(filter_candidates(&all, 0.9, false, 0)), vec!["a", "b"]);
        assert_eq!(names(filter_candidates(&all, 0.0, true, 0)), vec!["a", "c"]);
        assert_eq!(names(filter_candidates(&all, 0.0, false, 100)), vec!["a", "b"]);
        assert!(filter_candidates(&all, 0.95, true, 1000).is_empty());
    }

    #[test]
    fn test_rank_by_criteria_normalises_budget() {
        let all = vec![
            candidate("score", 1.0, false, 0),
            candidate("budget", 0.8, false, 1000),
        ];

        let by_budget = rank_by_criteria(
            &all,
            RankingWeights {
                token_budget: 1.0,
                ..Default::default()
            },
        );
        assert_eq!(by_budget[0].0.agent_name, "budget");
        assert_eq!(by_budget[0].1, 1.0);

        let by_score = rank_by_criteria(
            &all,
            RankingWeights {
                match_score: 1.0,
                ..Default::default()
            },
        );
        assert_eq!(by_score[0].0.agent_name, "score");
    }

    #[test]
    fn test_list_params_serialize_only_set_fields() {
        let params = ListSessionsParams::new().status(SessionStatus::Active).limit(2);
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, serde_json::json!({"status": "active", "limit": 2}));
    }
}
