use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ApiError;

pub const OPERATOR_TOKEN_HEADER: &str = "x-operator-token";

/// Gate for the `/api/root/*` operator routes.
///
/// A request passes when it carries the configured operator token, or when loopback
/// access is enabled and the peer address is a loopback address.
#[derive(Clone)]
pub struct OperatorGuard {
    token: Option<Arc<str>>,
    allow_loopback: bool,
}

impl std::fmt::Debug for OperatorGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorGuard")
            .field("token_configured", &self.token.is_some())
            .field("allow_loopback", &self.allow_loopback)
            .finish()
    }
}

impl OperatorGuard {
    pub fn new(token: impl AsRef<str>, allow_loopback: bool) -> Self {
        let token = token.as_ref();
        Self {
            token: (!token.is_empty()).then(|| Arc::from(token)),
            allow_loopback,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.security.operator_token, config.security.operator_localhost)
    }

    pub fn admit(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> Result<(), ApiError> {
        if self.allow_loopback && peer.is_some_and(|addr| addr.ip().is_loopback()) {
            return Ok(());
        }

        let presented = headers.get(OPERATOR_TOKEN_HEADER).map(|v| v.as_bytes());
        match (&self.token, presented) {
            (Some(expected), Some(presented)) if expected.as_bytes() == presented => Ok(()),
            (_, Some(_)) => Err(ApiError::forbidden("Invalid operator token")),
            (_, None) => Err(ApiError::forbidden("Operator access required")),
        }
    }
}

pub async fn require_operator_middleware(
    State(guard): State<OperatorGuard>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    if let Err(e) = guard.admit(request.headers(), peer) {
        tracing::warn!("Rejected operator request to {} from {:?}: {}", request.uri().path(), peer, e);
        return e.into_response();
    }

    next.run(request).await
}
