// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Connection Pool
//!
//! Wraps `sqlx::postgres::PgPool` in a thin `Database` newtype that can be
//! injected into the PostgreSQL collaborator implementations.
//!
//! The `agents` table is owned by the registration service; it is created
//! here only if absent so a fresh database can serve reads.

use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::domain::repository::PostgresConfig;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS agents (
        agent_id UUID PRIMARY KEY,
        agent_name VARCHAR(255) NOT NULL UNIQUE,
        certificate_pem TEXT NOT NULL DEFAULT '',
        agent_metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
        verified BOOLEAN NOT NULL DEFAULT FALSE,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a2a_sessions (
        session_id UUID PRIMARY KEY,
        initiating_agent VARCHAR(255) NOT NULL,
        target_agent VARCHAR(255) NOT NULL,
        task VARCHAR(255) NOT NULL,
        session_token TEXT NOT NULL,
        status VARCHAR(16) NOT NULL DEFAULT 'active',
        context JSONB NOT NULL DEFAULT '{}'::jsonb,
        version BIGINT NOT NULL DEFAULT 1,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_a2a_sessions_initiating ON a2a_sessions (initiating_agent)",
    "CREATE INDEX IF NOT EXISTS idx_a2a_sessions_target ON a2a_sessions (target_agent)",
    "CREATE INDEX IF NOT EXISTS idx_a2a_sessions_created ON a2a_sessions (created_at DESC)",
];

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables and indexes used by the PostgreSQL adapters.
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ensured");
        Ok(())
    }
}
