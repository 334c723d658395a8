// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Agent Directory
//!
//! Read-only `AgentDirectory` over the `agents` table written by the
//! registration service. Capabilities live under `agent_metadata -> 'a2a'`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::warn;

use crate::domain::agent::{A2aDescriptor, AgentCapabilityRecord, AgentName};
use crate::domain::repository::{AgentDirectory, RepositoryError};

pub struct PostgresAgentDirectory {
    pool: PgPool,
}

impl PostgresAgentDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &PgRow) -> Result<AgentCapabilityRecord, RepositoryError> {
    let name: String = row.try_get("agent_name")?;
    let active: bool = row.try_get("active")?;
    let verified: bool = row.try_get("verified")?;
    let metadata: serde_json::Value = row.try_get("agent_metadata")?;

    let a2a = match metadata.get("a2a") {
        Some(section) if is_present(section) => {
            match serde_json::from_value::<A2aDescriptor>(section.clone()) {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    warn!("Agent '{}' has a malformed a2a descriptor, ignoring it: {}", name, e);
                    None
                }
            }
        }
        _ => None,
    };

    Ok(AgentCapabilityRecord {
        agent_name: AgentName::from_registered(name),
        active,
        verified,
        a2a,
    })
}

/// An empty or null `a2a` section counts as no descriptor.
fn is_present(section: &serde_json::Value) -> bool {
    match section {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

#[async_trait]
impl AgentDirectory for PostgresAgentDirectory {
    async fn find_by_name(&self, name: &str) -> Result<Option<AgentCapabilityRecord>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT agent_name, active, verified, agent_metadata
            FROM agents
            WHERE agent_name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn find_active_supporting(
        &self,
        task: &str,
        exclude_name: &str,
    ) -> Result<Vec<AgentCapabilityRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT agent_name, active, verified, agent_metadata
            FROM agents
            WHERE active = TRUE
              AND agent_name <> $1
              AND EXISTS (
                  SELECT 1
                  FROM jsonb_array_elements_text(
                      CASE WHEN jsonb_typeof(agent_metadata -> 'a2a' -> 'supported_tasks') = 'array'
                           THEN agent_metadata -> 'a2a' -> 'supported_tasks'
                           ELSE '[]'::jsonb
                      END
                  ) AS supported(task)
                  WHERE strpos(lower(supported.task), lower($2)) > 0
              )
            ORDER BY created_at, agent_name
            "#,
        )
        .bind(exclude_name)
        .bind(task)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }
}
