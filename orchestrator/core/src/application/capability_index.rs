// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Capability Index
//!
//! Turns a task string into the set of directory records able to execute it.
//! The directory is asked for active, task-supporting agents, and the same
//! predicate is applied again here so the result never depends on how
//! faithfully an adapter implements the query.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::agent::{A2aDescriptor, AgentCapabilityRecord};
use crate::domain::error::A2aError;
use crate::domain::repository::AgentDirectory;

pub struct CapabilityIndex {
    directory: Arc<dyn AgentDirectory>,
}

impl CapabilityIndex {
    pub fn new(directory: Arc<dyn AgentDirectory>) -> Self {
        Self { directory }
    }

    /// Active agents other than `exclude_agent` supporting `task`.
    ///
    /// An empty result is a normal outcome, not an error.
    pub async fn find_candidates(
        &self,
        task: &str,
        exclude_agent: &str,
    ) -> Result<Vec<AgentCapabilityRecord>, A2aError> {
        let records = self
            .directory
            .find_active_supporting(task, exclude_agent)
            .await
            .map_err(|e| {
                warn!("Directory lookup for task '{}' failed: {}", task, e);
                A2aError::from(e)
            })?;

        let fetched = records.len();
        let candidates: Vec<_> = records
            .into_iter()
            .filter(|r| r.active && r.name() != exclude_agent && r.supports_task(task))
            .collect();

        if candidates.len() != fetched {
            debug!(
                "Directory returned {} records for task '{}', {} kept after filtering",
                fetched,
                task,
                candidates.len()
            );
        }

        Ok(candidates)
    }

    /// The `a2a` descriptor of a single agent.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no agent has that name, or it carries no descriptor.
    /// - `Gone` when the agent is registered but inactive.
    pub async fn describe(&self, agent_name: &str) -> Result<A2aDescriptor, A2aError> {
        let record = self
            .directory
            .find_by_name(agent_name)
            .await
            .map_err(|e| {
                warn!("Directory lookup for agent '{}' failed: {}", agent_name, e);
                A2aError::from(e)
            })?
            .ok_or_else(|| A2aError::NotFound(format!("Agent '{}' not found", agent_name)))?;

        if !record.active {
            return Err(A2aError::Gone(format!(
                "Agent '{}' is not active",
                agent_name
            )));
        }

        record.a2a.ok_or_else(|| {
            A2aError::NotFound(format!(
                "Agent '{}' does not have A2A descriptors",
                agent_name
            ))
        })
    }
}
