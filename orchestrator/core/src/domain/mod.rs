// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer (`agora-core`)
//!
//! Pure types for agent negotiation and A2A sessions. No I/O.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`agent`] | `AgentName`, `A2aDescriptor`, `AgentCapabilityRecord`, `task_matches` |
//! | [`scoring`] | `PreferredCapabilities`, `score` |
//! | [`negotiation`] | `NegotiationRequest`, `CandidateAgent`, `rank_candidates` |
//! | [`session`] | `A2aSession`, `SessionId`, `SessionToken`, `SessionStatus` |
//! | [`repository`] | `AgentDirectory`, `SessionStore`, `SessionQuery`, `RepositoryError` |
//! | [`error`] | `A2aError` |
//! | [`config`] | `DirectoryConfigManifest` |

pub mod agent;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod repository;
pub mod scoring;
pub mod session;
