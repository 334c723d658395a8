// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`agora-core`)
//!
//! HTTP surface that translates external requests into application service
//! calls. No business logic lives here; all real work is delegated to
//! `crate::application`.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | axum router, wire types, error-to-status mapping, rate-limit middleware |
//! | [`access`] | `Principal`, `Permission`, `PrincipalResolver`, `authorize` |

pub mod access;
pub mod api;
