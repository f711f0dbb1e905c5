use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims read from bearer tokens. Only `tenant` matters for routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header must use Bearer token format")]
    NotBearer,
    #[error("Empty JWT token")]
    EmptyToken,
    #[error("Invalid JWT token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Token part of an `Authorization: Bearer <token>` value
pub fn bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let token = header_value.strip_prefix("Bearer ").ok_or(AuthError::NotBearer)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }
    Ok(token)
}

/// Verify signature and expiry, then return the claims
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())?;
    Ok(token_data.claims)
}
