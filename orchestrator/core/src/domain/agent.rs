// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Capability Records
//!
//! Read-only view of a registered agent as seen by the negotiation core. The
//! directory collaborator owns these records; the core never mutates them.
//!
//! The registration metadata blob is free-form JSON. Only the fields the core
//! actually reads are schema'd in [`A2aDescriptor`]; every other key rides
//! along in an opaque `extensions` map so nothing is lost on a round trip.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;

/// DNS-style agent name (e.g. `translator.agents.example.com`).
///
/// The name is the unique key of an [`AgentCapabilityRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentName(String);

impl AgentName {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 253;

    /// Parse and validate an agent name.
    ///
    /// # Errors
    ///
    /// Returns [`AgentNameError`] when the name is too short or too long, uses
    /// characters outside `[a-zA-Z0-9.-]`, starts or ends with a separator, or
    /// contains consecutive dots.
    pub fn new(name: impl Into<String>) -> Result<Self, AgentNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Wrap a name that already passed registration. Storage adapters use this
    /// when loading records so that a directory row is never dropped over a
    /// naming rule tightened after it was written.
    pub fn from_registered(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn validate(name: &str) -> Result<(), AgentNameError> {
        if name.len() < Self::MIN_LEN {
            return Err(AgentNameError::TooShort(name.len()));
        }
        if name.len() > Self::MAX_LEN {
            return Err(AgentNameError::TooLong(name.len()));
        }
        if !agent_name_pattern().is_match(name) {
            return Err(AgentNameError::InvalidCharacters(name.to_string()));
        }
        if name.contains("..") {
            return Err(AgentNameError::ConsecutiveDots(name.to_string()));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AgentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for AgentName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AgentName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentNameError {
    #[error("agent name must be at least 3 characters (got {0})")]
    TooShort(usize),
    #[error("agent name must not exceed 253 characters (got {0})")]
    TooLong(usize),
    #[error("agent name '{0}' must contain only alphanumeric characters, dots, and hyphens")]
    InvalidCharacters(String),
    #[error("agent name '{0}' must not contain consecutive dots")]
    ConsecutiveDots(String),
}

fn default_active() -> bool {
    true
}

fn agent_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9.-]*[a-zA-Z0-9])?$")
            .expect("agent name pattern is a valid regex")
    })
}

/// Agent-to-agent capability descriptor (the `a2a` section of an agent's metadata).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct A2aDescriptor {
    /// Task labels the agent accepts. Matching is case-insensitive substring.
    #[serde(default)]
    pub supported_tasks: Vec<String>,

    /// Whether the agent takes part in multi-round negotiation.
    #[serde(default)]
    pub negotiation: bool,

    /// Token budget the agent advertises per task.
    #[serde(default)]
    pub token_budget: u64,

    /// Context keys the agent expects callers to supply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_required: Vec<String>,

    /// Anything else the registrant put in the descriptor.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// Directory view of a registered agent.
///
/// # Invariants
///
/// - `agent_name` uniquely identifies the record within a directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCapabilityRecord {
    pub agent_name: AgentName,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub verified: bool,
    /// `None` when the registration carries no usable `a2a` section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a2a: Option<A2aDescriptor>,
}

impl AgentCapabilityRecord {
    pub fn new(agent_name: AgentName, a2a: A2aDescriptor) -> Self {
        Self {
            agent_name,
            active: true,
            verified: false,
            a2a: Some(a2a),
        }
    }

    /// A registration without an `a2a` section. It never matches a task.
    pub fn without_descriptor(agent_name: AgentName) -> Self {
        Self {
            agent_name,
            active: true,
            verified: false,
            a2a: None,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn name(&self) -> &str {
        self.agent_name.as_str()
    }

    pub fn descriptor(&self) -> Option<&A2aDescriptor> {
        self.a2a.as_ref()
    }

    pub fn supported_tasks(&self) -> &[String] {
        self.a2a.as_ref().map_or(&[], |d| d.supported_tasks.as_slice())
    }

    pub fn negotiation_capable(&self) -> bool {
        self.a2a.as_ref().is_some_and(|d| d.negotiation)
    }

    pub fn token_budget(&self) -> u64 {
        self.a2a.as_ref().map_or(0, |d| d.token_budget)
    }

    /// True when any supported task contains `task` as a case-insensitive substring.
    pub fn supports_task(&self, task: &str) -> bool {
        task_matches(self.supported_tasks(), task)
    }
}

/// Task-matching rule shared by the capability index and session initiation.
///
/// `requested` matches when it is a case-insensitive substring of at least one
/// entry. This is not exact or prefix matching; `"translate"` matches
/// `"Translate-Text"` and `"late"` matches it too.
pub fn task_matches(supported: &[String], requested: &str) -> bool {
    let needle = requested.to_lowercase();
    supported
        .iter()
        .any(|task| task.to_lowercase().contains(&needle))
}
