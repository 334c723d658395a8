// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

/// Agora Rust SDK
///
/// Negotiate task handoffs and manage A2A sessions through an Agora directory.

pub mod client;
pub mod error;
pub mod types;

pub use client::AgoraClient;
pub use error::SdkError;
pub use types::*;
