// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Collaborator Interfaces
//!
//! Persistence contracts consumed by the negotiation core, following the DDD
//! Repository pattern: the interface lives in the domain layer, adapters live
//! in `crate::infrastructure::repositories`.
//!
//! | Trait | Data | Implementations |
//! |-------|------|----------------|
//! | `AgentDirectory` | `AgentCapabilityRecord` (read-only) | `InMemoryAgentDirectory`, `PostgresAgentDirectory` |
//! | `SessionStore` | `A2aSession` | `InMemorySessionStore`, `PostgresSessionStore` |
//!
//! ## Consistency
//!
//! The core holds no per-session lock. [`SessionStore::update`] is a
//! compare-and-swap on [`A2aSession::version`]: the write succeeds only if the
//! stored version is exactly one behind the incoming one, so two concurrent
//! read-modify-write cycles on the same session can never interleave.

use async_trait::async_trait;

use crate::domain::agent::AgentCapabilityRecord;
use crate::domain::session::{A2aSession, SessionId, SessionStatus};

/// Storage backend selected at startup.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

/// Read-only view of the agent registration store.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// Look up a single agent by its unique name, active or not.
    async fn find_by_name(&self, name: &str) -> Result<Option<AgentCapabilityRecord>, RepositoryError>;

    /// Active agents other than `exclude_name` whose supported tasks contain
    /// `task` as a case-insensitive substring, in directory iteration order.
    async fn find_active_supporting(
        &self,
        task: &str,
        exclude_name: &str,
    ) -> Result<Vec<AgentCapabilityRecord>, RepositoryError>;
}

/// Equality filters for [`SessionStore::query`], applied conjunctively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQuery {
    pub initiating_agent: Option<String>,
    pub target_agent: Option<String>,
    pub status: Option<SessionStatus>,
}

impl SessionQuery {
    pub fn matches(&self, session: &A2aSession) -> bool {
        self.initiating_agent
            .as_deref()
            .map_or(true, |name| session.initiating_agent == name)
            && self
                .target_agent
                .as_deref()
                .map_or(true, |name| session.target_agent == name)
            && self.status.map_or(true, |status| session.status == status)
    }
}

/// Durable store of [`A2aSession`] records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session. Fails with [`RepositoryError::Conflict`] if the id exists.
    async fn create(&self, session: &A2aSession) -> Result<A2aSession, RepositoryError>;

    async fn get_by_id(&self, id: SessionId) -> Result<Option<A2aSession>, RepositoryError>;

    /// Replace a stored session.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::NotFound`] when no session has this id.
    /// - [`RepositoryError::Conflict`] when the stored version is not
    ///   `session.version - 1` (someone else wrote first).
    async fn update(&self, session: &A2aSession) -> Result<A2aSession, RepositoryError>;

    /// Sessions matching `filter`, newest `created_at` first, then paginated.
    async fn query(
        &self,
        filter: &SessionQuery,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<A2aSession>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Conflict(db.message().to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
