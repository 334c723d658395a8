// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # A2A Session Aggregate
//!
//! Domain model for a negotiated task handoff between two agents. A session is
//! the only durable entity owned by the negotiation core.
//!
//! ## Session Lifecycle
//!
//! ```text
//! initiate_session(initiator, target, task, context)
//!   └─ A2aSession::initiate(..)            status = Active
//!         └─ A2aSession::apply_update(..)  Active → Completed | Failed | Active
//!         └─ A2aSession::terminate()       any → Failed (forced)
//! ```
//!
//! ## Invariants
//!
//! - `id`, `token`, `initiating_agent`, `target_agent`, `task` and
//!   `created_at` never change after [`A2aSession::initiate`].
//! - Every mutation sets `updated_at` and bumps `version`; stores use
//!   `version` for compare-and-swap writes.
//! - [`SessionStatus::Terminated`] is reserved. Termination produces
//!   [`SessionStatus::Failed`].
//!
//! ## Known leniency
//!
//! `apply_update` accepts a transition out of a terminal status (for example
//! `Failed → Completed`). Existing callers rely on it, so the transition is
//! applied and reported through [`StatusTransition::reopened_terminal`] rather
//! than rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Free-form key-value context attached to negotiations and sessions.
pub type ContextMap = serde_json::Map<String, serde_json::Value>;

const TOKEN_PREFIX: &str = "a2a_session_";

/// Globally unique session identifier. Never reused, even after termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse_str(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque bearer string handed to the initiator exactly once.
///
/// Derived from the session id (`a2a_session_<32 hex digits>`), so it is
/// unique per session. `Debug` is redacted to keep it out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn derive(id: &SessionId) -> Self {
        Self(format!("{}{}", TOKEN_PREFIX, id.0.simple()))
    }

    pub fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Lifecycle state of an [`A2aSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
    /// Reserved for a distinct termination outcome; never produced today.
    Terminated,
}

impl SessionStatus {
    /// Statuses a caller may request through an update or use as a list filter.
    pub const ASSIGNABLE: [SessionStatus; 3] = [
        SessionStatus::Active,
        SessionStatus::Completed,
        SessionStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Terminated => "terminated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Parse a caller-supplied target status.
    ///
    /// Only `active`, `completed` and `failed` are accepted; `terminated` is a
    /// valid stored value but not something a caller can ask for.
    pub fn parse_assignable(raw: &str) -> Result<Self, SessionError> {
        match raw.parse::<SessionStatus>() {
            Ok(status) if Self::ASSIGNABLE.contains(&status) => Ok(status),
            _ => Err(SessionError::StatusNotAssignable(raw.to_string())),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "terminated" => Ok(Self::Terminated),
            other => Err(SessionError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown session status '{0}'")]
    UnknownStatus(String),

    #[error("invalid status '{0}'. Must be one of: active, completed, failed")]
    StatusNotAssignable(String),
}

/// Outcome of a status change, returned for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub from: SessionStatus,
    pub to: SessionStatus,
    /// The session left a terminal status. Allowed, but worth flagging.
    pub reopened_terminal: bool,
}

/// Aggregate root for a negotiated agent-to-agent session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct A2aSession {
    pub id: SessionId,
    pub token: SessionToken,
    pub initiating_agent: String,
    pub target_agent: String,
    pub task: String,
    pub status: SessionStatus,
    pub context: ContextMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, starts at 1.
    pub version: u64,
}

impl A2aSession {
    /// Open a new session in `Active` state with a fresh id and derived token.
    pub fn initiate(
        initiating_agent: impl Into<String>,
        target_agent: impl Into<String>,
        task: impl Into<String>,
        context: ContextMap,
    ) -> Self {
        let id = SessionId::new();
        let now = Utc::now();
        Self {
            token: SessionToken::derive(&id),
            id,
            initiating_agent: initiating_agent.into(),
            target_agent: target_agent.into(),
            task: task.into(),
            status: SessionStatus::Active,
            context,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Apply a caller-requested status change.
    ///
    /// `context`, when present, replaces the stored context wholesale; there
    /// is no merge. `None` leaves it unchanged.
    ///
    /// # Errors
    ///
    /// [`SessionError::StatusNotAssignable`] when `status` is
    /// [`SessionStatus::Terminated`].
    pub fn apply_update(
        &mut self,
        status: SessionStatus,
        context: Option<ContextMap>,
    ) -> Result<StatusTransition, SessionError> {
        if !SessionStatus::ASSIGNABLE.contains(&status) {
            return Err(SessionError::StatusNotAssignable(status.to_string()));
        }

        let from = self.status;
        self.status = status;
        if let Some(context) = context {
            self.context = context;
        }
        self.touch();

        Ok(StatusTransition {
            from,
            to: status,
            reopened_terminal: from.is_terminal() && from != status,
        })
    }

    /// Force the session to `Failed`, whatever its current status.
    ///
    /// Idempotent: terminating a failed session leaves it failed.
    pub fn terminate(&mut self) -> StatusTransition {
        let from = self.status;
        self.status = SessionStatus::Failed;
        self.touch();
        StatusTransition {
            from,
            to: SessionStatus::Failed,
            reopened_terminal: false,
        }
    }

    fn touch(&mut self) {
        // Keep updated_at monotonic even if the wall clock steps backwards.
        self.updated_at = Utc::now().max(self.updated_at);
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> A2aSession {
        A2aSession::initiate("alpha", "beta", "translate", ContextMap::new())
    }

    fn context(key: &str, value: &str) -> ContextMap {
        let mut map = ContextMap::new();
        map.insert(key.to_string(), serde_json::Value::from(value));
        map
    }

    #[test]
    fn test_initiate_sets_active_and_timestamps() {
        let s = session();
        assert_eq!(s.status, SessionStatus::Active);
        assert_eq!(s.created_at, s.updated_at);
        assert_eq!(s.version, 1);
    }

    #[test]
    fn test_token_is_prefixed_hex_of_id() {
        let s = session();
        let token = s.token.expose();
        assert!(token.starts_with("a2a_session_"));
        assert_eq!(&token["a2a_session_".len()..], s.id.0.simple().to_string());
        assert_eq!(format!("{:?}", s.token), "SessionToken(***)");
    }

    #[test]
    fn test_update_replaces_context_wholesale() {
        let mut s = session();
        s.context = context("a", "1");
        s.apply_update(SessionStatus::Active, Some(context("b", "2"))).unwrap();

        assert!(s.context.get("a").is_none());
        assert_eq!(s.context.get("b"), Some(&serde_json::Value::from("2")));
    }

    #[test]
    fn test_update_without_context_keeps_it() {
        let mut s = session();
        s.context = context("a", "1");
        let transition = s.apply_update(SessionStatus::Completed, None).unwrap();

        assert_eq!(s.context, context("a", "1"));
        assert_eq!(transition.from, SessionStatus::Active);
        assert_eq!(transition.to, SessionStatus::Completed);
        assert!(!transition.reopened_terminal);
        assert_eq!(s.version, 2);
        assert!(s.updated_at >= s.created_at);
    }

    #[test]
    fn test_update_rejects_terminated_target() {
        let mut s = session();
        let err = s.apply_update(SessionStatus::Terminated, None).unwrap_err();
        assert!(matches!(err, SessionError::StatusNotAssignable(_)));
        assert_eq!(s.status, SessionStatus::Active);
        assert_eq!(s.version, 1);
    }

    #[test]
    fn test_update_out_of_terminal_is_applied_and_flagged() {
        let mut s = session();
        s.terminate();
        let transition = s.apply_update(SessionStatus::Completed, None).unwrap();

        assert_eq!(s.status, SessionStatus::Completed);
        assert!(transition.reopened_terminal);
    }

    #[test]
    fn test_terminate_is_forced_and_idempotent() {
        let mut s = session();
        s.apply_update(SessionStatus::Completed, None).unwrap();

        let first = s.terminate();
        assert_eq!(first.from, SessionStatus::Completed);
        assert_eq!(s.status, SessionStatus::Failed);

        let second = s.terminate();
        assert_eq!(second.from, SessionStatus::Failed);
        assert_eq!(s.status, SessionStatus::Failed);
    }

    #[test]
    fn test_parse_assignable() {
        assert_eq!(SessionStatus::parse_assignable("active"), Ok(SessionStatus::Active));
        assert_eq!(SessionStatus::parse_assignable("completed"), Ok(SessionStatus::Completed));
        assert_eq!(SessionStatus::parse_assignable("failed"), Ok(SessionStatus::Failed));
        assert!(SessionStatus::parse_assignable("terminated").is_err());
        assert!(SessionStatus::parse_assignable("ACTIVE").is_err());
        assert!(SessionStatus::parse_assignable("").is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(SessionStatus::Completed).unwrap(), "completed");
        assert!(SessionStatus::Failed.is_terminal());
        assert!(SessionStatus::Terminated.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
    }
}
