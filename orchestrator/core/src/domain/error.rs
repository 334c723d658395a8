// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Negotiation Errors
//!
//! Typed failures returned by every public negotiation and session operation.
//! Callers surface `NotFound`, `Gone` and `InvalidRequest` to clients as-is
//! and report `Internal` as a generic server error (see [`A2aError::client_message`]).

use crate::domain::repository::RepositoryError;
use crate::domain::session::SessionError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum A2aError {
    /// Referenced agent or session is absent (or the agent is inactive).
    #[error("{0}")]
    NotFound(String),

    /// Agent is registered but no longer active.
    #[error("{0}")]
    Gone(String),

    /// Malformed identifier, unsupported task, disallowed status or bad context.
    #[error("{0}")]
    InvalidRequest(String),

    /// Write collided with an existing id or a concurrent update.
    #[error("{0}")]
    Conflict(String),

    /// Directory or session store failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl A2aError {
    /// Message safe to return to a remote caller. Internal detail stays in logs.
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<RepositoryError> for A2aError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => A2aError::NotFound(what),
            RepositoryError::Conflict(what) => A2aError::Conflict(what),
            RepositoryError::Database(detail) | RepositoryError::Serialization(detail) => {
                A2aError::Internal(detail)
            }
        }
    }
}

impl From<SessionError> for A2aError {
    fn from(err: SessionError) -> Self {
        A2aError::InvalidRequest(err.to_string())
    }
}
