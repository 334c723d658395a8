// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

use std::collections::HashSet;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use agora_core::domain::agent::AgentName;

use crate::error::{Result, SdkError};
use crate::types::{
    AgentDescriptorResponse, CandidateAgent, ContextMap, InitiateSessionRequest, InitiateSessionResponse, ListSessionsParams,
    NegotiateResponse, NegotiationRequest, SessionListResponse, SessionView, TerminateSessionResponse,
    UpdateSessionRequest, UpdateSessionResponse,
};

const API_PREFIX: &str = "/api/v1";
const AGENT_NAME_HEADER: &str = "x-agent-name";

/// Client for the Agora negotiation and session API.
pub struct AgoraClient {
    base_url: String,
    client: Client,
    api_key: Option<String>,
    agent_name: Option<String>,
}

impl AgoraClient {
    /// Create a new client for a directory at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
            api_key: None,
            agent_name: None,
        }
    }

    /// Set the API key sent as a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Identify the calling agent on every request.
    pub fn with_agent_name(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = Some(agent_name.into());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}{}", self.base_url, API_PREFIX, path);
        let mut req = self.client.request(method, url);

        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }
        if let Some(name) = &self.agent_name {
            req = req.header(AGENT_NAME_HEADER, name);
        }
        req
    }

    /// Ask the directory for agents able to take over a task, best first.
    pub async fn negotiate(&self, request: &NegotiationRequest) -> Result<Vec<CandidateAgent>> {
        let response = self
            .request(Method::POST, "/a2a/negotiate")
            .json(request)
            .send()
            .await?;
        let body: NegotiateResponse = decode(response).await?;
        Ok(body.candidate_agents)
    }

    /// Highest-scoring candidate, or `None` when nobody supports the task.
    pub async fn find_best_match(&self, request: &NegotiationRequest) -> Result<Option<CandidateAgent>> {
        let candidates = self.negotiate(request).await?;
        Ok(candidates.into_iter().fold(None, |best: Option<CandidateAgent>, c| match best {
            Some(b) if b.match_score >= c.match_score => Some(b),
            _ => Some(c),
        }))
    }

    /// Open a session. The returned token is not retrievable later.
    pub async fn initiate_session(&self, request: &InitiateSessionRequest) -> Result<InitiateSessionResponse> {
        let response = self
            .request(Method::POST, "/a2a/session/initiate")
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    /// Published `a2a` descriptor of `agent_name`.
    ///
    /// The name is checked locally before any request is sent.
    pub async fn a2a_descriptor(&self, agent_name: &str) -> Result<AgentDescriptorResponse> {
        let name = AgentName::new(agent_name)?;
        let response = self
            .request(Method::GET, &format!("/agents/{}/a2a", name))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn session_status(&self, session_id: &str) -> Result<SessionView> {
        let response = self
            .request(Method::GET, &format!("/a2a/session/{}/status", session_id))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn update_session(
        &self,
        session_id: &str,
        request: &UpdateSessionRequest,
    ) -> Result<UpdateSessionResponse> {
        let response = self
            .request(Method::PUT, &format!("/a2a/session/{}", session_id))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    /// Mark a session completed, storing `results` under the `results` context key.
    pub async fn complete_session(&self, session_id: &str, results: Option<Value>) -> Result<UpdateSessionResponse> {
        let mut request = UpdateSessionRequest::new("completed");
        if let Some(results) = results {
            let mut context = ContextMap::new();
            context.insert("results".to_string(), results);
            request = request.with_context(context);
        }
        self.update_session(session_id, &request).await
    }

    /// Mark a session failed, storing `error` under the `error` context key.
    pub async fn fail_session(&self, session_id: &str, error: Option<&str>) -> Result<UpdateSessionResponse> {
        let mut request = UpdateSessionRequest::new("failed");
        if let Some(error) = error {
            let mut context = ContextMap::new();
            context.insert("error".to_string(), Value::from(error));
            request = request.with_context(context);
        }
        self.update_session(session_id, &request).await
    }

    pub async fn terminate_session(&self, session_id: &str) -> Result<TerminateSessionResponse> {
        let response = self
            .request(Method::DELETE, &format!("/a2a/session/{}", session_id))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list_sessions(&self, params: &ListSessionsParams) -> Result<SessionListResponse> {
        let response = self
            .request(Method::GET, "/a2a/sessions")
            .query(params)
            .send()
            .await?;
        decode(response).await
    }

    /// Sessions where `agent_name` is either side, newest first, at most `limit`.
    pub async fn session_history(&self, agent_name: &str, limit: usize) -> Result<Vec<SessionView>> {
        let per_side = (limit / 2).max(1);
        let as_initiator = self
            .list_sessions(&ListSessionsParams::new().initiating_agent(agent_name).limit(per_side))
            .await?;
        let as_target = self
            .list_sessions(&ListSessionsParams::new().target_agent(agent_name).limit(per_side))
            .await?;

        let mut seen = HashSet::new();
        let mut sessions: Vec<SessionView> = as_initiator
            .sessions
            .into_iter()
            .chain(as_target.sessions)
            .filter(|s| seen.insert(s.session_id.clone()))
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions.truncate(limit);
        Ok(sessions)
    }

    /// Poll until the session leaves `active` or `timeout` elapses.
    pub async fn wait_for_completion(
        &self,
        session_id: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<SessionView> {
        let poll = async {
            loop {
                let view = self.session_status(session_id).await?;
                if view.status.is_terminal() {
                    return Ok::<_, SdkError>(view);
                }
                debug!("Session {} still {}, polling again", session_id, view.status);
                tokio::time::sleep(poll_interval).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| SdkError::Timeout {
                session_id: session_id.to_string(),
                timeout,
            })?
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    Err(SdkError::Api {
        status: status.as_u16(),
        detail,
    })
}
