// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for task negotiation and session initiation.
//!
//! Covers the candidate filter (case-insensitive substring, self-exclusion,
//! inactive agents), the additive score scale, ranking order and truncation,
//! and initiation failures for missing agents and unsupported tasks.

use std::sync::Arc;

use agora_core::application::negotiation::{
    InitiateSessionRequest, NegotiationService, StandardNegotiationService,
};
use agora_core::application::session_registry::SessionRegistry;
use agora_core::application::validation::RequestLimits;
use agora_core::domain::agent::{A2aDescriptor, AgentCapabilityRecord, AgentName};
use agora_core::domain::error::A2aError;
use agora_core::domain::negotiation::NegotiationRequest;
use agora_core::domain::scoring::PreferredCapabilities;
use agora_core::domain::session::{ContextMap, SessionStatus};
use agora_core::infrastructure::repositories::{InMemoryAgentDirectory, InMemorySessionStore};
use serde_json::Value;

fn agent(name: &str, tasks: &[&str], negotiation: bool, token_budget: u64) -> AgentCapabilityRecord {
    AgentCapabilityRecord::new(
        AgentName::from_registered(name),
        A2aDescriptor {
            supported_tasks: tasks.iter().map(|t| t.to_string()).collect(),
            negotiation,
            token_budget,
            ..Default::default()
        },
    )
}

fn service(records: Vec<AgentCapabilityRecord>) -> (StandardNegotiationService, Arc<InMemorySessionStore>) {
    let directory = Arc::new(InMemoryAgentDirectory::with_records(records));
    let store = Arc::new(InMemorySessionStore::new());
    let registry = Arc::new(SessionRegistry::new(store.clone(), RequestLimits::default()));
    (StandardNegotiationService::new(directory, registry), store)
}

#[tokio::test]
async fn test_initiator_is_never_its_own_candidate() {
    let (service, _) = service(vec![
        agent("alpha", &["translate"], true, 500),
        agent("beta", &["summarize"], false, 0),
    ]);

    let candidates = service
        .negotiate(NegotiationRequest::new("alpha", "translate"))
        .await
        .unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn test_full_preference_match_scores_one() {
    let (service, _) = service(vec![
        agent("caller", &[], false, 0),
        agent("translator", &["translate"], true, 500),
    ]);

    let prefs = PreferredCapabilities::new()
        .with_negotiation(true)
        .with_token_budget(100);
    let candidates = service
        .negotiate(NegotiationRequest::new("caller", "translate").with_preferences(prefs))
        .await
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].agent_name, "translator");
    assert_eq!(candidates[0].match_score, 1.0);
    assert!(candidates[0].negotiation_capable);
    assert_eq!(candidates[0].token_budget, 500);
}

#[tokio::test]
async fn test_negotiate_unknown_or_inactive_initiator_is_not_found() {
    let (service, _) = service(vec![
        agent("sleeper", &[], false, 0).with_active(false),
        agent("translator", &["translate"], false, 0),
    ]);

    for initiator in ["ghost", "sleeper"] {
        let err = service
            .negotiate(NegotiationRequest::new(initiator, "translate"))
            .await
            .unwrap_err();
        assert!(matches!(err, A2aError::NotFound(_)), "{}: {:?}", initiator, err);
    }
}

#[tokio::test]
async fn test_candidates_match_case_insensitive_substring_only() {
    let (service, _) = service(vec![
        agent("caller", &[], false, 0),
        agent("upper", &["TRANSLATE-Docs"], false, 0),
        agent("inner", &["batch translate jobs"], false, 0),
        agent("other", &["summarize"], false, 0),
        agent("sleepy", &["translate"], false, 0).with_active(false),
    ]);

    let candidates = service
        .negotiate(NegotiationRequest::new("caller", "Translate"))
        .await
        .unwrap();

    let names: Vec<_> = candidates.iter().map(|c| c.agent_name.as_str()).collect();
    assert_eq!(names, vec!["upper", "inner"]);
    for candidate in &candidates {
        assert!(candidate
            .supported_tasks
            .iter()
            .any(|t| t.to_lowercase().contains("translate")));
    }
}

#[tokio::test]
async fn test_scores_stay_on_the_additive_scale() {
    let (service, _) = service(vec![
        agent("caller", &[], false, 0),
        agent("both", &["translate"], true, 1000),
        agent("budget-only", &["translate"], false, 1000),
        agent("negotiator", &["translate"], true, 10),
        agent("neither", &["translate"], false, 10),
    ]);

    let prefs = PreferredCapabilities::new()
        .with_negotiation(true)
        .with_token_budget(500);
    let candidates = service
        .negotiate(NegotiationRequest::new("caller", "translate").with_preferences(prefs))
        .await
        .unwrap();

    let scored: Vec<_> = candidates
        .iter()
        .map(|c| (c.agent_name.as_str(), c.match_score))
        .collect();
    assert_eq!(
        scored,
        vec![
            ("both", 1.0),
            ("budget-only", 0.9),
            ("negotiator", 0.9),
            ("neither", 0.8),
        ]
    );
}

#[tokio::test]
async fn test_missing_budget_preference_always_earns_the_budget_bonus() {
    let (service, _) = service(vec![
        agent("caller", &[], false, 0),
        agent("zero", &["translate"], true, 0),
    ]);

    let candidates = service
        .negotiate(NegotiationRequest::new("caller", "translate"))
        .await
        .unwrap();
    // No negotiation preference, budget 0 >= 0.
    assert_eq!(candidates[0].match_score, 0.9);
}

#[tokio::test]
async fn test_ranking_is_stable_and_truncated_to_ten() {
    let mut records = vec![agent("caller", &[], false, 0)];
    for i in 0..12 {
        records.push(agent(&format!("plain-{:02}", i), &["translate"], false, 0));
    }
    records.push(agent("best", &["translate"], true, 0));

    let (service, _) = service(records);
    let prefs = PreferredCapabilities::new().with_negotiation(true).with_token_budget(1);
    let candidates = service
        .negotiate(NegotiationRequest::new("caller", "translate").with_preferences(prefs))
        .await
        .unwrap();

    assert_eq!(candidates.len(), 10);
    assert_eq!(candidates[0].agent_name, "best");
    assert_eq!(candidates[0].match_score, 0.9);
    let rest: Vec<_> = candidates[1..].iter().map(|c| c.agent_name.clone()).collect();
    let expected: Vec<_> = (0..9).map(|i| format!("plain-{:02}", i)).collect();
    assert_eq!(rest, expected);
    assert!(candidates
        .windows(2)
        .all(|w| w[0].match_score >= w[1].match_score));
}

#[tokio::test]
async fn test_negotiate_rejects_bad_task_and_oversized_context() {
    let (service, _) = service(vec![agent("caller", &[], false, 0)]);

    let err = service
        .negotiate(NegotiationRequest::new("caller", "  "))
        .await
        .unwrap_err();
    assert!(matches!(err, A2aError::InvalidRequest(_)));

    let mut context = ContextMap::new();
    context.insert("blob".into(), Value::from("x".repeat(20_000)));
    let err = service
        .negotiate(NegotiationRequest::new("caller", "translate").with_context(context))
        .await
        .unwrap_err();
    assert!(matches!(err, A2aError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_initiate_unsupported_task_is_invalid_request() {
    let (service, store) = service(vec![agent("a", &["X"], false, 0), agent("b", &["Y"], false, 0)]);

    let err = service
        .initiate_session(InitiateSessionRequest::new("a", "b", "X"))
        .await
        .unwrap_err();
    assert!(matches!(err, A2aError::InvalidRequest(_)));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_initiate_names_the_missing_agent() {
    let (service, store) = service(vec![agent("alpha", &["translate"], false, 0)]);

    let err = service
        .initiate_session(InitiateSessionRequest::new("ghost", "alpha", "translate"))
        .await
        .unwrap_err();
    assert!(matches!(&err, A2aError::NotFound(msg) if msg.contains("Initiating agent 'ghost'")));

    let err = service
        .initiate_session(InitiateSessionRequest::new("alpha", "ghost", "translate"))
        .await
        .unwrap_err();
    assert!(matches!(&err, A2aError::NotFound(msg) if msg.contains("Target agent 'ghost'")));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_initiate_creates_active_session_with_token() {
    let (service, store) = service(vec![
        agent("alpha", &[], false, 0),
        agent("beta", &["Translate documents"], false, 0),
    ]);

    let mut context = ContextMap::new();
    context.insert("lang".into(), Value::from("fr"));
    let session = service
        .initiate_session(InitiateSessionRequest::new("alpha", "beta", "translate").with_context(context.clone()))
        .await
        .unwrap();

    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(session.initiating_agent, "alpha");
    assert_eq!(session.target_agent, "beta");
    assert_eq!(session.context, context);
    assert_eq!(session.created_at, session.updated_at);
    assert!(session.token.expose().starts_with("a2a_session_"));
    assert_eq!(store.len().await, 1);
}
