// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the collaborator interfaces defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Read agent registrations, persist A2A sessions
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL
//!
//! - **PostgresAgentDirectory** - reads the `agents` table
//! - **PostgresSessionStore** - `a2a_sessions` with versioned updates
//!
//! ## In-Memory
//!
//! Lightweight implementations for tests and single-node development:
//! - **InMemoryAgentDirectory** - registration-ordered record list
//! - **InMemorySessionStore** - HashMap keyed by session id

pub mod postgres_agent;
pub mod postgres_session;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::agent::{AgentCapabilityRecord, AgentName, AgentNameError};
use crate::domain::repository::{AgentDirectory, RepositoryError, SessionQuery, SessionStore};
use crate::domain::session::{A2aSession, SessionId};

/// In-memory agent directory. Iteration order is registration order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAgentDirectory {
    agents: Arc<RwLock<Vec<AgentCapabilityRecord>>>,
}

impl InMemoryAgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = AgentCapabilityRecord>) -> Self {
        Self {
            agents: Arc::new(RwLock::new(records.into_iter().collect())),
        }
    }

    /// Validate the agent name, then [`upsert`](Self::upsert) the record.
    pub async fn register(&self, record: AgentCapabilityRecord) -> Result<(), AgentNameError> {
        AgentName::validate(record.name())?;
        self.upsert(record).await;
        Ok(())
    }

    /// Register or replace an agent, keeping its original position on replace.
    pub async fn upsert(&self, record: AgentCapabilityRecord) {
        let mut agents = self.agents.write().await;
        match agents.iter_mut().find(|r| r.agent_name == record.agent_name) {
            Some(existing) => *existing = record,
            None => agents.push(record),
        }
    }

    pub async fn set_active(&self, name: &str, active: bool) -> Result<(), RepositoryError> {
        let mut agents = self.agents.write().await;
        let record = agents
            .iter_mut()
            .find(|r| r.name() == name)
            .ok_or_else(|| RepositoryError::NotFound(format!("agent '{}'", name)))?;
        record.active = active;
        Ok(())
    }
}

#[async_trait]
impl AgentDirectory for InMemoryAgentDirectory {
    async fn find_by_name(&self, name: &str) -> Result<Option<AgentCapabilityRecord>, RepositoryError> {
        let agents = self.agents.read().await;
        Ok(agents.iter().find(|r| r.name() == name).cloned())
    }

    async fn find_active_supporting(
        &self,
        task: &str,
        exclude_name: &str,
    ) -> Result<Vec<AgentCapabilityRecord>, RepositoryError> {
        let agents = self.agents.read().await;
        Ok(agents
            .iter()
            .filter(|r| r.active && r.name() != exclude_name && r.supports_task(task))
            .cloned()
            .collect())
    }
}

/// In-memory session store. The write lock makes each CAS update atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, A2aSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &A2aSession) -> Result<A2aSession, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(RepositoryError::Conflict(format!("session {} already exists", session.id)));
        }
        sessions.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn get_by_id(&self, id: SessionId) -> Result<Option<A2aSession>, RepositoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&id).cloned())
    }

    async fn update(&self, session: &A2aSession) -> Result<A2aSession, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(&session.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("session {}", session.id)))?;

        if stored.version + 1 != session.version {
            return Err(RepositoryError::Conflict(format!(
                "session {} is at version {}, update expected {}",
                session.id,
                stored.version,
                session.version.saturating_sub(1)
            )));
        }

        *stored = session.clone();
        Ok(session.clone())
    }

    async fn query(
        &self,
        filter: &SessionQuery,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<A2aSession>, RepositoryError> {
        let sessions = self.sessions.read().await;
        let mut matched: Vec<&A2aSession> = sessions.values().filter(|s| filter.matches(s)).collect();
        // HashMap order is arbitrary; break created_at ties by id for a stable page order.
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(matched.into_iter().skip(offset).take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::A2aDescriptor;
    use crate::domain::session::{ContextMap, SessionStatus};
    use chrono::Duration;

    fn record(name: &str, tasks: &[&str]) -> AgentCapabilityRecord {
        AgentCapabilityRecord::new(
            AgentName::from_registered(name),
            A2aDescriptor {
                supported_tasks: tasks.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_directory_filters_and_keeps_order() {
        let directory = InMemoryAgentDirectory::with_records(vec![
            record("alpha", &["translate"]),
            record("beta", &["Translate text"]),
            record("gamma", &["summarize"]),
            record("delta", &["translate"]).with_active(false),
        ]);

        let found = directory.find_active_supporting("translate", "alpha").await.unwrap();
        let names: Vec<_> = found.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["beta"]);

        assert!(directory.find_by_name("delta").await.unwrap().is_some());
        assert!(directory.find_by_name("omega").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_directory_upsert_replaces_in_place() {
        let directory = InMemoryAgentDirectory::new();
        directory.upsert(record("alpha", &["a"])).await;
        directory.upsert(record("beta", &["b"])).await;
        directory.upsert(record("alpha", &["c"])).await;

        let alpha = directory.find_by_name("alpha").await.unwrap().unwrap();
        assert_eq!(alpha.supported_tasks(), &["c".to_string()]);

        directory.set_active("beta", false).await.unwrap();
        assert!(!directory.find_by_name("beta").await.unwrap().unwrap().active);
        assert!(directory.set_active("nobody", true).await.is_err());
    }

    #[tokio::test]
    async fn test_register_validates_name() {
        let directory = InMemoryAgentDirectory::new();
        assert!(directory.register(record("translator.example.com", &["translate"])).await.is_ok());
        assert!(directory.register(record("a", &["translate"])).await.is_err());
        assert!(directory.register(record("bad..name", &["translate"])).await.is_err());
        assert!(directory.find_by_name("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_create_rejects_duplicate_id() {
        let store = InMemorySessionStore::new();
        let session = A2aSession::initiate("alpha", "beta", "translate", ContextMap::new());

        store.create(&session).await.unwrap();
        let err = store.create(&session).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_session_update_is_compare_and_swap() {
        let store = InMemorySessionStore::new();
        let session = A2aSession::initiate("alpha", "beta", "translate", ContextMap::new());
        store.create(&session).await.unwrap();

        let mut first = session.clone();
        first.apply_update(SessionStatus::Completed, None).unwrap();
        let mut second = session.clone();
        second.apply_update(SessionStatus::Failed, None).unwrap();

        store.update(&first).await.unwrap();
        let err = store.update(&second).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let stored = store.get_by_id(session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Completed);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_session_update_missing_is_not_found() {
        let store = InMemorySessionStore::new();
        let mut session = A2aSession::initiate("alpha", "beta", "translate", ContextMap::new());
        session.terminate();
        let err = store.update(&session).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_query_orders_newest_first_and_paginates() {
        let store = InMemorySessionStore::new();
        let base = chrono::Utc::now();
        let mut ids = Vec::new();
        for i in 0..5 {
            let mut s = A2aSession::initiate("alpha", "beta", "translate", ContextMap::new());
            s.created_at = base + Duration::seconds(i);
            s.updated_at = s.created_at;
            ids.push(s.id);
            store.create(&s).await.unwrap();
        }

        let page = store.query(&SessionQuery::default(), 2, 1).await.unwrap();
        let got: Vec<_> = page.iter().map(|s| s.id).collect();
        assert_eq!(got, vec![ids[3], ids[2]]);

        let none = store
            .query(
                &SessionQuery {
                    target_agent: Some("alpha".into()),
                    ..Default::default()
                },
                10,
                0,
            )
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
