// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Agora Core
//!
//! Negotiation and A2A session management for the Agora agent directory.
//!
//! # Architecture
//!
//! - **domain**: agent capability records, scoring, session aggregate, collaborator traits
//! - **application**: capability index, negotiation orchestrator, session registry
//! - **infrastructure**: in-memory and PostgreSQL collaborators, rate limiting
//! - **presentation**: axum HTTP surface and access control

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
