// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Session Store
//!
//! `SessionStore` over the `a2a_sessions` table. Updates are conditional on
//! the `version` column, so a lost race surfaces as `RepositoryError::Conflict`
//! instead of silently overwriting another writer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::repository::{RepositoryError, SessionQuery, SessionStore};
use crate::domain::session::{A2aSession, ContextMap, SessionId, SessionStatus, SessionToken};

const COLUMNS: &str = "session_id, initiating_agent, target_agent, task, session_token, \
                       status, context, version, created_at, updated_at";

pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn version_to_db(version: u64) -> Result<i64, RepositoryError> {
    i64::try_from(version)
        .map_err(|_| RepositoryError::Serialization(format!("session version {} out of range", version)))
}

fn session_from_row(row: &PgRow) -> Result<A2aSession, RepositoryError> {
    let id: Uuid = row.try_get("session_id")?;
    let status: String = row.try_get("status")?;
    let context: serde_json::Value = row.try_get("context")?;
    let version: i64 = row.try_get("version")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    let status = status
        .parse::<SessionStatus>()
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    let context = match context {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => ContextMap::new(),
        other => {
            return Err(RepositoryError::Serialization(format!(
                "session {} context is not an object: {}",
                id, other
            )))
        }
    };

    Ok(A2aSession {
        id: SessionId(id),
        token: SessionToken::from_stored(row.try_get("session_token")?),
        initiating_agent: row.try_get("initiating_agent")?,
        target_agent: row.try_get("target_agent")?,
        task: row.try_get("task")?,
        status,
        context,
        created_at,
        updated_at,
        version: u64::try_from(version)
            .map_err(|_| RepositoryError::Serialization(format!("negative version {}", version)))?,
    })
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(&self, session: &A2aSession) -> Result<A2aSession, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO a2a_sessions (
                session_id, initiating_agent, target_agent, task, session_token,
                status, context, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.id.0)
        .bind(&session.initiating_agent)
        .bind(&session.target_agent)
        .bind(&session.task)
        .bind(session.token.expose())
        .bind(session.status.as_str())
        .bind(serde_json::Value::Object(session.context.clone()))
        .bind(version_to_db(session.version)?)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(session.clone())
    }

    async fn get_by_id(&self, id: SessionId) -> Result<Option<A2aSession>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM a2a_sessions WHERE session_id = $1", COLUMNS))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn update(&self, session: &A2aSession) -> Result<A2aSession, RepositoryError> {
        let expected = version_to_db(session.version.saturating_sub(1))?;
        let result = sqlx::query(
            r#"
            UPDATE a2a_sessions
            SET status = $2, context = $3, version = $4, updated_at = $5
            WHERE session_id = $1 AND version = $6
            "#,
        )
        .bind(session.id.0)
        .bind(session.status.as_str())
        .bind(serde_json::Value::Object(session.context.clone()))
        .bind(version_to_db(session.version)?)
        .bind(session.updated_at)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(session.clone());
        }

        let exists: Option<i64> = sqlx::query_scalar("SELECT version FROM a2a_sessions WHERE session_id = $1")
            .bind(session.id.0)
            .fetch_optional(&self.pool)
            .await?;

        match exists {
            None => Err(RepositoryError::NotFound(format!("session {}", session.id))),
            Some(current) => Err(RepositoryError::Conflict(format!(
                "session {} is at version {}, update expected {}",
                session.id, current, expected
            ))),
        }
    }

    async fn query(
        &self,
        filter: &SessionQuery,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<A2aSession>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM a2a_sessions
            WHERE ($1::text IS NULL OR initiating_agent = $1)
              AND ($2::text IS NULL OR target_agent = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC, session_id
            LIMIT $4 OFFSET $5
            "#,
            COLUMNS
        ))
        .bind(filter.initiating_agent.as_deref())
        .bind(filter.target_agent.as_deref())
        .bind(filter.status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(session_from_row).collect()
    }
}
