// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod capability_index;
pub mod negotiation;
pub mod repository_factory;
pub mod session_registry;
pub mod validation;

// Re-export use cases for convenience
pub use negotiation::{InitiateSessionRequest, NegotiationService, StandardNegotiationService};
pub use session_registry::{ListSessionsQuery, SessionPage, SessionRegistry, UpdateSessionRequest};
pub use validation::RequestLimits;
