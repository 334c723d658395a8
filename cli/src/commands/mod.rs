// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Agora CLI

pub mod config;

pub use self::config::ConfigCommand;
