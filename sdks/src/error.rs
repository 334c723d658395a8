// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

use std::time::Duration;

use agora_core::domain::agent::AgentNameError;

#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The directory answered with a non-success status.
    #[error("HTTP {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("session {session_id} did not finish within {timeout:?}")]
    Timeout { session_id: String, timeout: Duration },

    #[error("invalid agent name: {0}")]
    InvalidAgentName(#[from] AgentNameError),
}

impl SdkError {
    /// HTTP status for [`SdkError::Api`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Api { status, .. } => Some(*status),
            SdkError::Transport(e) => e.status().map(|s| s.as_u16()),
            SdkError::Timeout { .. } | SdkError::InvalidAgentName(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The agent exists but has been deactivated.
    pub fn is_gone(&self) -> bool {
        self.status() == Some(410)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;
