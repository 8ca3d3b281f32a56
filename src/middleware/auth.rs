use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::{AuthError, Claims, TokenCodec, TokenType};
use crate::state::AppState;

/// Authenticated user context extracted from an access token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Turns request headers into an [`AuthUser`]. Only access tokens are accepted.
pub struct Authenticator {
    codec: Arc<TokenCodec>,
}

impl Authenticator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let token = bearer_token(headers)?;
        let claims = self.codec.verify_typed(token, TokenType::Access)?;
        Ok(AuthUser::from(claims))
    }
}

/// Rejects the request unless it carries a valid access token, then makes
/// the caller available to handlers through request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = state.authenticator.authenticate(request.headers()).inspect_err(|e| {
        warn!(
            "Rejected {} {}: {}",
            request.method(),
            request.uri().path(),
            e.error_code()
        )
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingOrMalformedHeader)?
        .to_str()
        .map_err(|_| AuthError::MissingOrMalformedHeader)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() && !token.contains(char::is_whitespace) => Ok(token),
        _ => Err(AuthError::MissingOrMalformedHeader),
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}
