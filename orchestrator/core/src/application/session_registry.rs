// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Session Registry
//!
//! Create/read/update/terminate/list over [`A2aSession`] records, built on the
//! [`SessionStore`] collaborator. The registry is stateless; every call is a
//! read followed by at most one compare-and-swap write, so a failed write
//! leaves the previously stored session untouched.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Enforces the session state machine on every mutation

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::application::validation::RequestLimits;
use crate::domain::error::A2aError;
use crate::domain::repository::{RepositoryError, SessionQuery, SessionStore};
use crate::domain::session::{A2aSession, ContextMap, SessionId, SessionStatus};

/// Caller-requested session change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSessionRequest {
    /// Target status: `active`, `completed` or `failed`.
    pub status: String,
    /// Replacement context. `None` keeps the current one.
    #[serde(default)]
    pub context: Option<ContextMap>,
}

impl UpdateSessionRequest {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = Some(context);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSessionsQuery {
    #[serde(default)]
    pub initiating_agent: Option<String>,
    #[serde(default)]
    pub target_agent: Option<String>,
    /// One of `active`, `completed`, `failed`.
    #[serde(default, alias = "status_filter")]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionPage {
    pub sessions: Vec<A2aSession>,
    /// Number of sessions on this page.
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

pub struct SessionRegistry {
    store: Arc<dyn SessionStore>,
    limits: RequestLimits,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn SessionStore>, limits: RequestLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    /// Persist a freshly initiated session. All-or-nothing.
    pub async fn create(&self, session: A2aSession) -> Result<A2aSession, A2aError> {
        match self.store.create(&session).await {
            Ok(created) => {
                info!(
                    session_id = %created.id,
                    initiating_agent = %created.initiating_agent,
                    target_agent = %created.target_agent,
                    "A2A session created"
                );
                Ok(created)
            }
            Err(RepositoryError::Conflict(detail)) => {
                warn!(session_id = %session.id, "Session id collision on create: {}", detail);
                Err(A2aError::Conflict(format!("Session '{}' already exists", session.id)))
            }
            Err(e) => {
                error!(session_id = %session.id, "Failed to persist session: {}", e);
                Err(A2aError::Internal(format!("Failed to initiate session: {}", e)))
            }
        }
    }

    pub async fn get(&self, raw_id: &str) -> Result<A2aSession, A2aError> {
        let id = parse_session_id(raw_id)?;
        self.load(id, raw_id).await
    }

    /// Apply a status change and optional context replacement.
    ///
    /// A session that already reached a terminal status can still be moved
    /// to any assignable status; the reopen is logged at `warn`.
    pub async fn update_session(
        &self,
        raw_id: &str,
        request: UpdateSessionRequest,
    ) -> Result<A2aSession, A2aError> {
        let id = parse_session_id(raw_id)?;
        let mut session = self.load(id, raw_id).await?;

        let status = SessionStatus::parse_assignable(&request.status)?;
        if let Some(context) = &request.context {
            self.limits.validate_context(context)?;
        }

        let transition = session.apply_update(status, request.context)?;
        if transition.reopened_terminal {
            // TODO: reject transitions out of a terminal status once clients stop reopening sessions.
            warn!(
                session_id = %session.id,
                from = %transition.from,
                to = %transition.to,
                "Session reopened from a terminal status"
            );
        }

        let stored = self.write(&session, raw_id).await?;
        metrics::counter!("agora_session_transitions_total", "to" => transition.to.as_str())
            .increment(1);
        info!(session_id = %stored.id, from = %transition.from, to = %transition.to, "Session updated");
        Ok(stored)
    }

    /// Force a session to `failed`. Succeeds again on an already failed session.
    pub async fn terminate_session(&self, raw_id: &str) -> Result<A2aSession, A2aError> {
        let id = parse_session_id(raw_id)?;
        let mut session = self.load(id, raw_id).await?;

        let transition = session.terminate();
        let stored = self.write(&session, raw_id).await?;
        metrics::counter!("agora_session_transitions_total", "to" => transition.to.as_str())
            .increment(1);
        info!(session_id = %stored.id, from = %transition.from, "Session terminated");
        Ok(stored)
    }

    pub async fn list(&self, query: ListSessionsQuery) -> Result<SessionPage, A2aError> {
        let status = query
            .status
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                SessionStatus::parse_assignable(raw).map_err(|_| {
                    A2aError::InvalidRequest(
                        "Invalid status filter. Must be one of: active, completed, failed".to_string(),
                    )
                })
            })
            .transpose()?;

        let filter = SessionQuery {
            initiating_agent: query.initiating_agent.filter(|s| !s.is_empty()),
            target_agent: query.target_agent.filter(|s| !s.is_empty()),
            status,
        };
        let limit = self.limits.page_size(query.limit);

        let sessions = self
            .store
            .query(&filter, limit, query.offset)
            .await
            .map_err(|e| {
                error!("Failed to list sessions: {}", e);
                A2aError::from(e)
            })?;

        Ok(SessionPage {
            total: sessions.len(),
            sessions,
            offset: query.offset,
            limit,
        })
    }

    async fn load(&self, id: SessionId, raw_id: &str) -> Result<A2aSession, A2aError> {
        self.store
            .get_by_id(id)
            .await
            .map_err(|e| {
                error!(session_id = %id, "Failed to load session: {}", e);
                A2aError::from(e)
            })?
            .ok_or_else(|| A2aError::NotFound(format!("Session '{}' not found", raw_id)))
    }

    async fn write(&self, session: &A2aSession, raw_id: &str) -> Result<A2aSession, A2aError> {
        self.store.update(session).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => {
                A2aError::NotFound(format!("Session '{}' not found", raw_id))
            }
            RepositoryError::Conflict(_) => A2aError::Conflict(format!(
                "Session '{}' was modified concurrently; retry with fresh state",
                raw_id
            )),
            other => {
                error!(session_id = %session.id, "Failed to update session: {}", other);
                A2aError::from(other)
            }
        })
    }
}

fn parse_session_id(raw: &str) -> Result<SessionId, A2aError> {
    SessionId::parse_str(raw)
        .map_err(|_| A2aError::InvalidRequest("Invalid session ID format".to_string()))
}
