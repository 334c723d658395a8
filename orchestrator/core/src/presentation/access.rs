// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Caller Identity and Authorization
//!
//! Every HTTP handler resolves a [`Principal`] from the request and calls
//! [`authorize`] for the permission the operation needs before touching any
//! application service. How credentials are verified is up to the
//! [`PrincipalResolver`] plugged into the router.

use std::collections::HashSet;
use std::fmt;

use axum::http::HeaderMap;

/// Header carrying the caller's agent name for [`OpenAccess`].
pub const AGENT_NAME_HEADER: &str = "x-agent-name";

const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// `negotiate` and `initiate_session`.
    Negotiate,
    /// Session status and listing.
    ReadSessions,
    /// Session update and termination.
    WriteSessions,
}

impl Permission {
    pub const ALL: [Permission; 3] = [
        Permission::Negotiate,
        Permission::ReadSessions,
        Permission::WriteSessions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negotiate => "a2a:negotiate",
            Self::ReadSessions => "a2a:sessions:read",
            Self::WriteSessions => "a2a:sessions:write",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated (or anonymous) caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    permissions: HashSet<Permission>,
}

impl Principal {
    pub fn new(name: impl Into<String>, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("authentication required: {0}")]
    Unauthenticated(String),

    #[error("'{principal}' lacks permission {permission}")]
    Forbidden {
        principal: String,
        permission: Permission,
    },
}

/// Turns request headers into a [`Principal`].
pub trait PrincipalResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Result<Principal, AccessError>;

    /// Whether resolved names are backed by a verified credential. When
    /// false, the rate limiter keys callers by peer address instead.
    fn verifies_identity(&self) -> bool {
        true
    }
}

/// Trusts the `x-agent-name` header and grants every permission.
///
/// The header is not authenticated. Use this for development or behind a
/// proxy that authenticates callers and sets the header itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl PrincipalResolver for OpenAccess {
    fn resolve(&self, headers: &HeaderMap) -> Result<Principal, AccessError> {
        let name = headers
            .get(AGENT_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(ANONYMOUS);
        Ok(Principal::new(name, Permission::ALL))
    }

    fn verifies_identity(&self) -> bool {
        false
    }
}

pub fn authorize(principal: &Principal, permission: Permission) -> Result<(), AccessError> {
    if principal.has(permission) {
        Ok(())
    } else {
        Err(AccessError::Forbidden {
            principal: principal.name.clone(),
            permission,
        })
    }
}
