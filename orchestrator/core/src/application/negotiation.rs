// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Negotiation Orchestrator
//!
//! Entry points for task negotiation and session initiation. Composes the
//! [`CapabilityIndex`], [`crate::domain::scoring::score`] and the
//! [`SessionRegistry`].
//!
//! ```text
//! negotiate(request)
//!   ├─ validate task + context
//!   ├─ directory.find_by_name(initiator)      → NotFound if missing/inactive
//!   ├─ index.find_candidates(task, initiator)
//!   ├─ score(candidate, preferences)           per candidate
//!   └─ rank_candidates(..)                     stable desc, ≤ 10
//!
//! initiate_session(request)
//!   ├─ directory.find_by_name(initiator)      → NotFound
//!   ├─ directory.find_by_name(target)         → NotFound
//!   ├─ target.supports_task(task)             → InvalidRequest
//!   └─ registry.create(A2aSession::initiate(..))
//! ```
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Implements the negotiation and initiation use cases

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::application::capability_index::CapabilityIndex;
use crate::application::session_registry::SessionRegistry;
use crate::domain::agent::{A2aDescriptor, AgentCapabilityRecord};
use crate::domain::error::A2aError;
use crate::domain::negotiation::{rank_candidates, CandidateAgent, NegotiationRequest};
use crate::domain::repository::AgentDirectory;
use crate::domain::scoring::score;
use crate::domain::session::{A2aSession, ContextMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateSessionRequest {
    pub initiating_agent_name: String,
    pub target_agent_name: String,
    pub task: String,
    #[serde(default)]
    pub context: ContextMap,
}

impl InitiateSessionRequest {
    pub fn new(
        initiating_agent_name: impl Into<String>,
        target_agent_name: impl Into<String>,
        task: impl Into<String>,
    ) -> Self {
        Self {
            initiating_agent_name: initiating_agent_name.into(),
            target_agent_name: target_agent_name.into(),
            task: task.into(),
            context: ContextMap::new(),
        }
    }

    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = context;
        self
    }
}

#[async_trait]
pub trait NegotiationService: Send + Sync {
    /// Rank the agents able to take over `request.requested_task`.
    async fn negotiate(&self, request: NegotiationRequest) -> Result<Vec<CandidateAgent>, A2aError>;

    /// Open an `active` session between two registered agents.
    async fn initiate_session(&self, request: InitiateSessionRequest) -> Result<A2aSession, A2aError>;

    /// The published `a2a` descriptor of one agent.
    async fn describe_agent(&self, agent_name: &str) -> Result<A2aDescriptor, A2aError>;
}

pub struct StandardNegotiationService {
    directory: Arc<dyn AgentDirectory>,
    index: CapabilityIndex,
    sessions: Arc<SessionRegistry>,
}

impl StandardNegotiationService {
    pub fn new(directory: Arc<dyn AgentDirectory>, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            index: CapabilityIndex::new(directory.clone()),
            directory,
            sessions,
        }
    }

    async fn lookup(&self, name: &str) -> Result<Option<AgentCapabilityRecord>, A2aError> {
        self.directory.find_by_name(name).await.map_err(|e| {
            error!("Agent lookup for '{}' failed: {}", name, e);
            A2aError::from(e)
        })
    }
}

#[async_trait]
impl NegotiationService for StandardNegotiationService {
    async fn negotiate(&self, request: NegotiationRequest) -> Result<Vec<CandidateAgent>, A2aError> {
        let limits = self.sessions.limits();
        limits.validate_task(&request.requested_task)?;
        limits.validate_context(&request.context)?;

        let initiator = &request.initiating_agent_name;
        match self.lookup(initiator).await? {
            Some(record) if record.active => {}
            _ => {
                return Err(A2aError::NotFound(format!(
                    "Initiating agent '{}' not found or inactive",
                    initiator
                )))
            }
        }

        let records = self
            .index
            .find_candidates(&request.requested_task, initiator)
            .await?;

        let prefs = &request.preferred_capabilities;
        let scored: Vec<CandidateAgent> = records
            .iter()
            .map(|record| CandidateAgent::from_record(record, score(record, prefs)))
            .collect();
        debug!("Scored {} candidate(s) for task '{}'", scored.len(), request.requested_task);

        let ranked = rank_candidates(scored);
        metrics::counter!("agora_negotiations_total").increment(1);
        info!(
            initiating_agent = %initiator,
            task = %request.requested_task,
            candidates = ranked.len(),
            "Negotiation completed"
        );
        Ok(ranked)
    }

    async fn initiate_session(&self, request: InitiateSessionRequest) -> Result<A2aSession, A2aError> {
        let limits = self.sessions.limits();
        limits.validate_task(&request.task)?;
        limits.validate_context(&request.context)?;

        let initiator = request.initiating_agent_name;
        let target = request.target_agent_name;

        if !matches!(self.lookup(&initiator).await?, Some(r) if r.active) {
            return Err(A2aError::NotFound(format!(
                "Initiating agent '{}' not found or inactive",
                initiator
            )));
        }

        let target_record = match self.lookup(&target).await? {
            Some(record) if record.active => record,
            _ => {
                return Err(A2aError::NotFound(format!(
                    "Target agent '{}' not found or inactive",
                    target
                )))
            }
        };

        if !target_record.supports_task(&request.task) {
            return Err(A2aError::InvalidRequest(format!(
                "Target agent does not support task '{}'",
                request.task
            )));
        }

        let session = A2aSession::initiate(initiator, target, request.task, request.context);
        let created = self.sessions.create(session).await?;
        metrics::counter!("agora_sessions_initiated_total").increment(1);
        Ok(created)
    }

    async fn describe_agent(&self, agent_name: &str) -> Result<A2aDescriptor, A2aError> {
        self.index.describe(agent_name).await
    }
}
