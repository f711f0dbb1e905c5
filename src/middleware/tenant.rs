use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderName},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::{self, AuthError};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::tenant::{TenantContext, TenantId};

/// Tenant signal found on the request, `None` when the request carried none
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundTenant(pub Option<TenantId>);

/// Extracts the tenant identifier from inbound requests.
///
/// The tenant comes from the configured header or from the `tenant` claim of a bearer
/// token (only when a JWT secret is configured). A verified claim is authoritative: a
/// header naming a different tenant is refused. No signal at all means "default tenant".
#[derive(Clone)]
pub struct TenantBinder {
    header: HeaderName,
    jwt_secret: Option<Arc<str>>,
}

impl std::fmt::Debug for TenantBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantBinder")
            .field("header", &self.header)
            .field("reads_token_claims", &self.jwt_secret.is_some())
            .finish()
    }
}

impl TenantBinder {
    pub fn new(header: HeaderName) -> Self {
        Self {
            header,
            jwt_secret: None,
        }
    }

    pub fn with_jwt_secret(mut self, secret: impl AsRef<str>) -> Self {
        let secret = secret.as_ref();
        self.jwt_secret = (!secret.is_empty()).then(|| Arc::from(secret));
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, axum::http::header::InvalidHeaderName> {
        let header = HeaderName::try_from(config.tenancy.tenant_header.as_str())?;
        Ok(Self::new(header).with_jwt_secret(&config.security.jwt_secret))
    }

    pub fn extract(&self, headers: &HeaderMap) -> Result<Option<TenantId>, ApiError> {
        let requested = self.header_tenant(headers)?;
        let claimed = self.claimed_tenant(headers)?;

        match (requested, claimed) {
            (Some(requested), Some(claimed)) if requested != claimed => {
                tracing::warn!(
                    "Tenant header '{}' does not match token tenant '{}'",
                    requested,
                    claimed
                );
                Err(ApiError::forbidden(format!(
                    "{} does not match the tenant of the bearer token",
                    self.header
                )))
            }
            (requested, claimed) => Ok(claimed.or(requested)),
        }
    }

    fn header_tenant(&self, headers: &HeaderMap) -> Result<Option<TenantId>, ApiError> {
        let Some(value) = headers.get(&self.header) else {
            return Ok(None);
        };
        let value = value
            .to_str()
            .map_err(|_| ApiError::bad_request(format!("Invalid {} header", self.header)))?;
        TenantId::new(value.trim())
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("Empty {} header", self.header)))
    }

    fn claimed_tenant(&self, headers: &HeaderMap) -> Result<Option<TenantId>, ApiError> {
        let (Some(secret), Some(authorization)) = (&self.jwt_secret, headers.get(AUTHORIZATION)) else {
            return Ok(None);
        };

        let authorization = authorization
            .to_str()
            .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;
        let claims = auth::bearer_token(authorization)
            .and_then(|token| auth::decode_claims(token, secret))
            .map_err(|e: AuthError| ApiError::unauthorized(e.to_string()))?;

        match claims.tenant {
            Some(tenant) => TenantId::new(tenant)
                .map(Some)
                .map_err(|_| ApiError::unauthorized("Token carries an empty tenant claim")),
            None => Ok(None),
        }
    }
}

/// Binds the request's tenant for the rest of the handler chain.
///
/// Everything downstream runs inside `TenantContext::scope`, so the binding ends with
/// the request on every path: response, error, panic or client disconnect.
pub async fn bind_tenant_middleware(
    State(binder): State<TenantBinder>,
    mut request: Request,
    next: Next,
) -> Response {
    let tenant = match binder.extract(request.headers()) {
        Ok(tenant) => tenant,
        Err(e) => {
            tracing::warn!("Rejected tenant signal: {}", e);
            return e.into_response();
        }
    };

    match &tenant {
        Some(t) => tracing::debug!("Request bound to tenant: {}", t),
        None => tracing::debug!("Request carries no tenant signal"),
    }

    request.extensions_mut().insert(BoundTenant(tenant.clone()));
    TenantContext::scope(tenant, next.run(request)).await
}
