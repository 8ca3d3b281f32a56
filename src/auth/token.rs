use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Signing algorithm for newly minted tokens.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms a presented token may advertise. Anything outside the HMAC
/// family is refused before the signature is looked at.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// Identity fields embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: i32,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    pub role: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: &TokenSubject, token_type: TokenType, ttl: Duration, now: DateTime<Utc>) -> Self {
        let issued_at = now.timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        Self {
            user_id: subject.user_id,
            username: subject.username.clone(),
            role: subject.role.clone(),
            token_type,
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        }
    }
}

/// Signs and verifies HMAC tokens with a server-held secret.
///
/// Holds no mutable state; one instance is shared by every request.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::internal("JWT secret not configured"));
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Mints a token valid from now until `now + ttl`.
    pub fn sign(&self, subject: &TokenSubject, token_type: TokenType, ttl: Duration) -> Result<String, AuthError> {
        self.encode(&Claims::new(subject, token_type, ttl, Utc::now()))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("failed to sign {} token: {}", claims.token_type, e)))
    }

    /// Checks algorithm, signature and validity window, then returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {:?}", e.kind());
                AuthError::InvalidToken
            })
    }

    /// Verifies and additionally requires the given token type.
    pub fn verify_typed(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType {
                expected: match expected {
                    TokenType::Access => "Access",
                    TokenType::Refresh => "Refresh",
                },
            });
        }
        Ok(claims)
    }
}
