// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates concrete collaborator implementations from the configured
//! [`StorageBackend`]. Keeps the domain layer free of adapter types.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Wires `AgentDirectory` / `SessionStore` adapters

use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::domain::repository::{AgentDirectory, SessionStore, StorageBackend};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::postgres_agent::PostgresAgentDirectory;
use crate::infrastructure::repositories::postgres_session::PostgresSessionStore;
use crate::infrastructure::repositories::{InMemoryAgentDirectory, InMemorySessionStore};

/// Creates an AgentDirectory implementation based on the configured backend.
///
/// The PostgreSQL backend requires a connected [`Database`].
pub fn create_agent_directory(
    backend: &StorageBackend,
    database: Option<&Database>,
) -> Result<Arc<dyn AgentDirectory>> {
    match backend {
        StorageBackend::InMemory => Ok(Arc::new(InMemoryAgentDirectory::new())),
        StorageBackend::PostgreSQL(_) => {
            let db = database.ok_or_else(|| anyhow!("PostgreSQL backend selected but no database connection"))?;
            Ok(Arc::new(PostgresAgentDirectory::new(db.get_pool().clone())))
        }
    }
}

/// Creates a SessionStore implementation based on the configured backend.
pub fn create_session_store(
    backend: &StorageBackend,
    database: Option<&Database>,
) -> Result<Arc<dyn SessionStore>> {
    match backend {
        StorageBackend::InMemory => Ok(Arc::new(InMemorySessionStore::new())),
        StorageBackend::PostgreSQL(_) => {
            let db = database.ok_or_else(|| anyhow!("PostgreSQL backend selected but no database connection"))?;
            Ok(Arc::new(PostgresSessionStore::new(db.get_pool().clone())))
        }
    }
}
