// Copyright (c) 2026 Agora Directory Contributors
// SPDX-License-Identifier: AGPL-3.0
//! HTTP surface for negotiation and session management.
//!
//! | Method | Path | Permission |
//! |--------|------|------------|
//! | `POST` | `/api/v1/a2a/negotiate` | `Negotiate` |
//! | `POST` | `/api/v1/a2a/session/initiate` | `Negotiate` |
//! | `GET` | `/api/v1/a2a/session/{id}/status` | `ReadSessions` |
//! | `PUT` | `/api/v1/a2a/session/{id}` | `WriteSessions` |
//! | `DELETE` | `/api/v1/a2a/session/{id}` | `WriteSessions` |
//! | `GET` | `/api/v1/a2a/sessions` | `ReadSessions` |
//! | `GET` | `/api/v1/agents/{agent_name}/a2a` | `Negotiate` |
//! | `GET` | `/health` | none |
//!
//! Error bodies are `{"detail": "..."}`.
//!
//! Rate limiting keys on the principal name. When the resolver does not
//! verify identities and the server was started with connect info, the
//! peer IP is used instead so a caller cannot rotate names to reset its
//! bucket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        ConnectInfo, Path, Query, Request, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::application::negotiation::{InitiateSessionRequest, NegotiationService};
use crate::application::session_registry::{ListSessionsQuery, SessionRegistry, UpdateSessionRequest};
use crate::domain::agent::A2aDescriptor;
use crate::domain::error::A2aError;
use crate::domain::negotiation::{CandidateAgent, NegotiationRequest};
use crate::domain::session::{A2aSession, ContextMap, SessionStatus};
use crate::infrastructure::rate_limiter::{RateLimitDecision, RateLimitStore};
use crate::presentation::access::{authorize, AccessError, Permission, Principal, PrincipalResolver};

pub const API_PREFIX: &str = "/api/v1";

pub struct AppState {
    pub negotiation: Arc<dyn NegotiationService>,
    pub sessions: Arc<SessionRegistry>,
    pub resolver: Arc<dyn PrincipalResolver>,
    pub rate_limiter: Option<Arc<dyn RateLimitStore>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        negotiation: Arc<dyn NegotiationService>,
        sessions: Arc<SessionRegistry>,
        resolver: Arc<dyn PrincipalResolver>,
    ) -> Self {
        Self {
            negotiation,
            sessions,
            resolver,
            rate_limiter: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimitStore>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }
}

pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);

    let api = Router::new()
        .route("/a2a/negotiate", post(negotiate_handler))
        .route("/a2a/session/initiate", post(initiate_session_handler))
        .route("/a2a/session/{id}/status", get(session_status_handler))
        .route(
            "/a2a/session/{id}",
            put(update_session_handler).delete(terminate_session_handler),
        )
        .route("/a2a/sessions", get(list_sessions_handler))
        .route("/agents/{agent_name}/a2a", get(agent_descriptor_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(health_handler))
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Domain(A2aError),
    Access(AccessError),
    BadRequest(String),
    RateLimited { retry_after: Duration },
}

impl From<A2aError> for ApiError {
    fn from(err: A2aError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        ApiError::Access(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Domain(err) => {
                let status = match err {
                    A2aError::NotFound(_) => StatusCode::NOT_FOUND,
                    A2aError::Gone(_) => StatusCode::GONE,
                    A2aError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                    A2aError::Conflict(_) => StatusCode::CONFLICT,
                    A2aError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.client_message())
            }
            ApiError::Access(err) => {
                let status = match err {
                    AccessError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                    AccessError::Forbidden { .. } => StatusCode::FORBIDDEN,
                };
                (status, err.to_string())
            }
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            ApiError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded".to_string(),
            ),
        };

        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        } else if status == StatusCode::NOT_FOUND {
            debug!("Request rejected ({}): {}", status, detail);
        } else {
            warn!("Request rejected ({}): {}", status, detail);
        }

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if let ApiError::RateLimited { retry_after } = self {
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&seconds.max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiateResponse {
    pub candidate_agents: Vec<CandidateAgent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateSessionResponse {
    #[serde(rename = "sessionID")]
    pub session_id: String,
    pub session_token: String,
    pub status: SessionStatus,
    pub target_agent: String,
}

/// Session as shown to clients. Never carries the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(rename = "sessionID")]
    pub session_id: String,
    pub initiating_agent: String,
    pub target_agent: String,
    pub task: String,
    pub status: SessionStatus,
    pub context: ContextMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&A2aSession> for SessionView {
    fn from(session: &A2aSession) -> Self {
        Self {
            session_id: session.id.to_string(),
            initiating_agent: session.initiating_agent.clone(),
            target_agent: session.target_agent.clone(),
            task: session.task.clone(),
            status: session.status,
            context: session.context.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionResponse {
    #[serde(rename = "sessionID")]
    pub session_id: String,
    pub status: SessionStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminateSessionResponse {
    pub message: String,
    pub status: SessionStatus,
}

/// Published descriptor of one agent. Field names are snake_case, like the
/// registration metadata they come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptorResponse {
    pub agent_name: String,
    pub supported_tasks: Vec<String>,
    pub negotiation: bool,
    pub context_required: Vec<String>,
    pub token_budget: u64,
}

impl AgentDescriptorResponse {
    fn new(agent_name: String, descriptor: A2aDescriptor) -> Self {
        Self {
            agent_name,
            supported_tasks: descriptor.supported_tasks,
            negotiation: descriptor.negotiation,
            context_required: descriptor.context_required,
            token_budget: descriptor.token_budget,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionView>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

// ============================================================================
// Handlers
// ============================================================================

fn principal(state: &AppState, headers: &HeaderMap, permission: Permission) -> Result<Principal, ApiError> {
    let principal = state.resolver.resolve(headers)?;
    authorize(&principal, permission)?;
    Ok(principal)
}

async fn rate_limit(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return next.run(request).await;
    };

    let principal = match state.resolver.resolve(request.headers()) {
        Ok(principal) => principal,
        Err(e) => return ApiError::from(e).into_response(),
    };
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let key = match peer {
        Some(ip) if !state.resolver.verifies_identity() => format!("peer:{}", ip),
        _ => principal.name,
    };

    match limiter.check(&key) {
        RateLimitDecision::Allowed => next.run(request).await,
        RateLimitDecision::Limited { retry_after } => ApiError::RateLimited { retry_after }.into_response(),
    }
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

async fn negotiate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<NegotiationRequest>, JsonRejection>,
) -> Result<Json<NegotiateResponse>, ApiError> {
    principal(&state, &headers, Permission::Negotiate)?;
    let Json(request) = payload?;

    let candidate_agents = state.negotiation.negotiate(request).await?;
    Ok(Json(NegotiateResponse { candidate_agents }))
}

async fn initiate_session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<InitiateSessionRequest>, JsonRejection>,
) -> Result<Json<InitiateSessionResponse>, ApiError> {
    principal(&state, &headers, Permission::Negotiate)?;
    let Json(request) = payload?;

    let session = state.negotiation.initiate_session(request).await?;
    Ok(Json(InitiateSessionResponse {
        session_id: session.id.to_string(),
        session_token: session.token.expose().to_string(),
        status: session.status,
        target_agent: session.target_agent,
    }))
}

async fn session_status_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    principal(&state, &headers, Permission::ReadSessions)?;

    let session = state.sessions.get(&id).await?;
    Ok(Json(SessionView::from(&session)))
}

async fn update_session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSessionRequest>, JsonRejection>,
) -> Result<Json<UpdateSessionResponse>, ApiError> {
    principal(&state, &headers, Permission::WriteSessions)?;
    let Json(request) = payload?;

    let session = state.sessions.update_session(&id, request).await?;
    Ok(Json(UpdateSessionResponse {
        session_id: session.id.to_string(),
        status: session.status,
        updated_at: session.updated_at,
    }))
}

async fn terminate_session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<TerminateSessionResponse>, ApiError> {
    principal(&state, &headers, Permission::WriteSessions)?;

    let session = state.sessions.terminate_session(&id).await?;
    Ok(Json(TerminateSessionResponse {
        message: format!("Session '{}' terminated", session.id),
        status: session.status,
    }))
}

async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<ListSessionsQuery>, QueryRejection>,
) -> Result<Json<SessionListResponse>, ApiError> {
    principal(&state, &headers, Permission::ReadSessions)?;
    let Query(query) = query?;

    let page = state.sessions.list(query).await?;
    Ok(Json(SessionListResponse {
        sessions: page.sessions.iter().map(SessionView::from).collect(),
        total: page.total,
        offset: page.offset,
        limit: page.limit,
    }))
}

async fn agent_descriptor_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(agent_name): Path<String>,
) -> Result<Json<AgentDescriptorResponse>, ApiError> {
    principal(&state, &headers, Permission::Negotiate)?;

    let descriptor = state.negotiation.describe_agent(&agent_name).await?;
    Ok(Json(AgentDescriptorResponse::new(agent_name, descriptor)))
}
