use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Authentication and session failures.
///
/// Every variant is terminal for the request. `Display` is the client-facing
/// message; internal detail carried by `Internal` is logged but never rendered.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{}", disabled_message(.status, .reason.as_deref()))]
    AccountDisabled {
        status: String,
        reason: Option<String>,
    },

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{expected} token required")]
    WrongTokenType { expected: &'static str },

    #[error("Authorization header must use the form 'Bearer <token>'")]
    MissingOrMalformedHeader,

    #[error("User not found")]
    UserNotFound,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Internal authentication error")]
    Internal(String),
}

fn disabled_message(status: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("Account status: {}, reason: {}", status, reason),
        None => format!("Account status: {}", status),
    }
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AccountDisabled { .. } => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::WrongTokenType { .. }
            | AuthError::MissingOrMalformedHeader
            | AuthError::UserNotFound
            | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable machine-readable code for clients
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountDisabled { .. } => "ACCOUNT_DISABLED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::WrongTokenType { .. } => "WRONG_TOKEN_TYPE",
            AuthError::MissingOrMalformedHeader => "MISSING_OR_MALFORMED_HEADER",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AuthError::Internal(message.into())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(detail) = &self {
            tracing::error!("Authentication infrastructure failure: {}", detail);
        }

        let body = json!({
            "error": true,
            "message": self.to_string(),
            "code": self.error_code(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AuthError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn wrong_token_type_is_unauthorized() {
        let (status, body) = body_of(AuthError::WrongTokenType { expected: "Access" }).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "WRONG_TOKEN_TYPE");
        assert_eq!(body["message"], "Access token required");
    }

    #[tokio::test]
    async fn disabled_account_is_forbidden_with_reason() {
        let (status, body) = body_of(AuthError::AccountDisabled {
            status: "suspended".into(),
            reason: Some("chargeback".into()),
        })
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Account status: suspended, reason: chargeback");
    }

    #[tokio::test]
    async fn internal_detail_is_not_rendered() {
        let (status, body) = body_of(AuthError::internal("pool timed out on 10.0.0.3")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("10.0.0.3"));
    }
}
