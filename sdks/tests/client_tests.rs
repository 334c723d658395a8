// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

//! HTTP tests for `AgoraClient` against a mock directory.

use std::time::Duration;

use agora_sdk::{AgoraClient, ListSessionsParams, NegotiationRequest, PreferredCapabilities, SessionStatus};
use mockito::Matcher;
use serde_json::json;

const SESSION_ID: &str = "7f0c3c1e-2a52-4b53-9d59-0e2f1f0b8a11";

fn session_view(id: &str, status: &str, created_at: &str) -> serde_json::Value {
    json!({
        "sessionID": id,
        "initiatingAgent": "alpha.agents.test",
        "targetAgent": "beta.agents.test",
        "task": "translate",
        "status": status,
        "context": {},
        "createdAt": created_at,
        "updatedAt": created_at
    })
}

#[tokio::test]
async fn test_negotiate_sends_camel_case_and_auth() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/a2a/negotiate")
        .match_header("authorization", "Bearer secret")
        .match_header("x-agent-name", "alpha.agents.test")
        .match_body(Matcher::PartialJson(json!({
            "initiatingAgentName": "alpha.agents.test",
            "requestedTask": "translate",
            "preferredCapabilities": {"negotiation": true, "tokenBudget": 100}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidateAgents": [
                    {"agentName": "beta.agents.test", "matchScore": 1.0, "supportedTasks": ["translate"], "negotiation": true, "tokenBudget": 500},
                    {"agentName": "gamma.agents.test", "matchScore": 0.8, "supportedTasks": ["translate"], "negotiation": false, "tokenBudget": 10}
                ]
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let client = AgoraClient::new(server.url())
        .with_api_key("secret")
        .with_agent_name("alpha.agents.test");
    let request = NegotiationRequest::new("alpha.agents.test", "translate").with_preferences(
        PreferredCapabilities::new()
            .with_negotiation(true)
            .with_token_budget(100),
    );

    let candidates = client.negotiate(&request).await.unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].match_score, 1.0);
    assert!(candidates[0].negotiation_capable);

    let best = client.find_best_match(&request).await.unwrap().unwrap();
    assert_eq!(best.agent_name, "beta.agents.test");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_detail_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", format!("/api/v1/a2a/session/{}/status", SESSION_ID).as_str())
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(json!({"detail": format!("Session '{}' not found", SESSION_ID)}).to_string())
        .create_async()
        .await;

    let client = AgoraClient::new(server.url());
    let err = client.session_status(SESSION_ID).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_complete_and_fail_wrap_context() {
    let mut server = mockito::Server::new_async().await;
    let path = format!("/api/v1/a2a/session/{}", SESSION_ID);
    let complete = server
        .mock("PUT", path.as_str())
        .match_body(Matcher::Json(json!({"status": "completed", "context": {"results": {"words": 42}}})))
        .with_status(200)
        .with_body(json!({"sessionID": SESSION_ID, "status": "completed", "updatedAt": "2026-01-01T00:00:00Z"}).to_string())
        .create_async()
        .await;
    let fail = server
        .mock("PUT", path.as_str())
        .match_body(Matcher::Json(json!({"status": "failed", "context": {"error": "timeout"}})))
        .with_status(200)
        .with_body(json!({"sessionID": SESSION_ID, "status": "failed", "updatedAt": "2026-01-01T00:00:01Z"}).to_string())
        .create_async()
        .await;

    let client = AgoraClient::new(server.url());
    let done = client
        .complete_session(SESSION_ID, Some(json!({"words": 42})))
        .await
        .unwrap();
    assert_eq!(done.status, SessionStatus::Completed);

    let failed = client.fail_session(SESSION_ID, Some("timeout")).await.unwrap();
    assert_eq!(failed.status, SessionStatus::Failed);

    complete.assert_async().await;
    fail.assert_async().await;
}

#[tokio::test]
async fn test_list_sessions_sends_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/a2a/sessions")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("status".into(), "active".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "sessions": [session_view(SESSION_ID, "active", "2026-01-01T00:00:00Z")],
                "total": 1,
                "offset": 0,
                "limit": 2
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = AgoraClient::new(server.url());
    let page = client
        .list_sessions(&ListSessionsParams::new().status(SessionStatus::Active).limit(2))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.sessions[0].session_id, SESSION_ID);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_session_history_merges_both_sides() {
    let mut server = mockito::Server::new_async().await;
    let other = "0d9e4f7a-61a4-4a77-8d0e-3c5b0f2a9c44";
    server
        .mock("GET", "/api/v1/a2a/sessions")
        .match_query(Matcher::UrlEncoded("initiating_agent".into(), "alpha.agents.test".into()))
        .with_status(200)
        .with_body(
            json!({
                "sessions": [session_view(SESSION_ID, "active", "2026-01-01T00:00:00Z")],
                "total": 1, "offset": 0, "limit": 5
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/a2a/sessions")
        .match_query(Matcher::UrlEncoded("target_agent".into(), "alpha.agents.test".into()))
        .with_status(200)
        .with_body(
            json!({
                "sessions": [
                    session_view(other, "completed", "2026-01-02T00:00:00Z"),
                    session_view(SESSION_ID, "active", "2026-01-01T00:00:00Z")
                ],
                "total": 2, "offset": 0, "limit": 5
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = AgoraClient::new(server.url());
    let history = client.session_history("alpha.agents.test", 10).await.unwrap();
    let ids: Vec<_> = history.iter().map(|s| s.session_id.as_str()).collect();
    assert_eq!(ids, vec![other, SESSION_ID]);
}

#[tokio::test]
async fn test_wait_for_completion_times_out_on_active_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", format!("/api/v1/a2a/session/{}/status", SESSION_ID).as_str())
        .with_status(200)
        .with_body(session_view(SESSION_ID, "active", "2026-01-01T00:00:00Z").to_string())
        .expect_at_least(1)
        .create_async()
        .await;

    let client = AgoraClient::new(server.url());
    let err = client
        .wait_for_completion(SESSION_ID, Duration::from_millis(200), Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, agora_sdk::SdkError::Timeout { .. }));
}

#[tokio::test]
async fn test_a2a_descriptor_decodes_snake_case() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/agents/beta.agents.test/a2a")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "agent_name": "beta.agents.test",
                "supported_tasks": ["translate"],
                "negotiation": true,
                "context_required": ["source_lang"],
                "token_budget": 500
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = AgoraClient::new(server.url());
    let descriptor = client.a2a_descriptor("beta.agents.test").await.unwrap();
    assert_eq!(descriptor.context_required, vec!["source_lang".to_string()]);
    assert_eq!(descriptor.token_budget, 500);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_a2a_descriptor_rejects_invalid_name_locally() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = AgoraClient::new(server.url());
    let err = client.a2a_descriptor("../sessions").await.unwrap_err();
    assert!(matches!(err, agora_sdk::SdkError::InvalidAgentName(_)));
    mock.assert_async().await;
}
