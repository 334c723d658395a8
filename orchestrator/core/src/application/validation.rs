// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Request Validation
//!
//! Size and shape checks shared by negotiation and session operations. Every
//! violation is an [`A2aError::InvalidRequest`].

use crate::domain::config::LimitsConfig;
use crate::domain::error::A2aError;
use crate::domain::session::ContextMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_context_bytes: usize,
    pub max_task_length: usize,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self::from(&LimitsConfig::default())
    }
}

impl From<&LimitsConfig> for RequestLimits {
    fn from(config: &LimitsConfig) -> Self {
        Self {
            max_context_bytes: config.max_context_bytes,
            max_task_length: config.max_task_length,
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }
}

impl RequestLimits {
    pub fn validate_task(&self, task: &str) -> Result<(), A2aError> {
        if task.trim().is_empty() {
            return Err(A2aError::InvalidRequest("Task name is required".to_string()));
        }
        let length = task.chars().count();
        if length > self.max_task_length {
            return Err(A2aError::InvalidRequest(format!(
                "Task name cannot exceed {} characters (got {})",
                self.max_task_length, length
            )));
        }
        Ok(())
    }

    /// Context size is measured on its compact JSON encoding.
    pub fn validate_context(&self, context: &ContextMap) -> Result<(), A2aError> {
        let encoded = serde_json::to_vec(context)
            .map_err(|e| A2aError::InvalidRequest(format!("Context is not serializable: {}", e)))?;
        if encoded.len() > self.max_context_bytes {
            return Err(A2aError::InvalidRequest(format!(
                "Context size cannot exceed {} bytes (got {})",
                self.max_context_bytes,
                encoded.len()
            )));
        }
        Ok(())
    }

    /// Resolve a requested page size: default when absent, clamped to the maximum.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}
