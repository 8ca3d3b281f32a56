use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::password::{verify_password, UNKNOWN_ACCOUNT_HASH};
use super::token::{TokenCodec, TokenSubject, TokenType};
use super::AuthError;
use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::database::{DatabaseError, UserDirectory};

/// Access/refresh pair handed to the client
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Issues token pairs on login and rotates them on refresh.
pub struct SessionManager {
    users: Arc<dyn UserDirectory>,
    codec: Arc<TokenCodec>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionManager {
    pub fn new(users: Arc<dyn UserDirectory>, codec: Arc<TokenCodec>, security: &SecurityConfig) -> Self {
        Self {
            users,
            codec,
            access_ttl: Duration::from_secs(security.access_token_ttl_secs),
            refresh_ttl: Duration::from_secs(security.refresh_token_ttl_secs),
        }
    }

    /// Authenticates by username, falling back to email.
    ///
    /// Unknown accounts and wrong passwords produce the same error.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<TokenPair, AuthError> {
        let user = match self.users.find_by_username(identifier).await.map_err(lookup_failed)? {
            Some(user) => Some(user),
            None => self.users.find_by_email(identifier).await.map_err(lookup_failed)?,
        };

        let Some(user) = user else {
            let _ = check_password(UNKNOWN_ACCOUNT_HASH.to_owned(), secret).await;
            warn!("Login failed: unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        ensure_active(&user)?;

        check_password(user.password_hash.clone(), secret)
            .await
            .inspect_err(|_| warn!("Login failed: wrong password for user_id={}", user.id))?;

        let pair = self.issue_pair(&user)?;
        info!("User logged in: user_id={}, username={}", user.id, user.username);
        Ok(pair)
    }

    /// Exchanges a refresh token for a fresh pair.
    ///
    /// Identity is re-read from the directory so the new tokens carry the
    /// current username and role. The presented refresh token is not revoked.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .codec
            .verify_typed(refresh_token, TokenType::Refresh)
            .inspect_err(|e| warn!("Refresh rejected: {}", e))?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await
            .map_err(lookup_failed)?
            .ok_or_else(|| {
                warn!("Refresh rejected: user_id={} no longer exists", claims.user_id);
                AuthError::UserNotFound
            })?;

        ensure_active(&user)?;

        let pair = self.issue_pair(&user)?;
        info!("Tokens refreshed: user_id={}, username={}", user.id, user.username);
        Ok(pair)
    }

    fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let subject = TokenSubject {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
        };

        Ok(TokenPair {
            access_token: self.codec.sign(&subject, TokenType::Access, self.access_ttl)?,
            refresh_token: self.codec.sign(&subject, TokenType::Refresh, self.refresh_ttl)?,
            token_type: "Bearer",
            expires_in: self.access_ttl.as_secs(),
        })
    }
}

/// bcrypt is CPU-bound, so it runs off the async workers.
async fn check_password(stored_hash: String, secret: &str) -> Result<(), AuthError> {
    let candidate = secret.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&stored_hash, &candidate))
        .await
        .map_err(|e| AuthError::internal(format!("password check aborted: {}", e)))?
}

fn ensure_active(user: &User) -> Result<(), AuthError> {
    if user.is_active() {
        return Ok(());
    }
    warn!("Rejected inactive account: user_id={}, status={}", user.id, user.status);
    Err(AuthError::AccountDisabled {
        status: user.status.clone(),
        reason: user.disabled_reason.clone(),
    })
}

fn lookup_failed(err: DatabaseError) -> AuthError {
    AuthError::internal(format!("user directory lookup failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::testing::MemoryUsers;

    fn security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "session-test".into(),
            access_token_ttl_secs: 60,
            refresh_token_ttl_secs: 600,
            cors_origins: vec![],
        }
    }

    fn manager(users: Arc<MemoryUsers>) -> (SessionManager, Arc<TokenCodec>) {
        let codec = Arc::new(TokenCodec::new("session-test").unwrap());
        (SessionManager::new(users, codec.clone(), &security()), codec)
    }

    fn seeded() -> Arc<MemoryUsers> {
        let users = MemoryUsers::default();
        let hash = hash_password("correct-pw", 4).unwrap();
        users.insert(1, "alice", "alice@example.com", &hash, "active");
        users.insert(2, "bob", "bob@example.com", &hash, "suspended");
        Arc::new(users)
    }

    #[tokio::test]
    async fn login_by_username_issues_typed_pair() {
        let (sessions, codec) = manager(seeded());
        let pair = sessions.login("alice", "correct-pw").await.unwrap();

        assert_ne!(pair.access_token, pair.refresh_token);
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 60);

        let access = codec.verify(&pair.access_token).unwrap();
        let refresh = codec.verify(&pair.refresh_token).unwrap();
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_eq!(access.user_id, 1);
        assert_eq!(refresh.exp - refresh.iat, 600);
    }

    #[tokio::test]
    async fn login_falls_back_to_email() {
        let (sessions, codec) = manager(seeded());
        let pair = sessions.login("alice@example.com", "correct-pw").await.unwrap();
        assert_eq!(codec.verify(&pair.access_token).unwrap().username, "alice");
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_identical() {
        let (sessions, _) = manager(seeded());
        let unknown = sessions.login("mallory", "correct-pw").await.unwrap_err();
        let wrong = sessions.login("alice", "wrong-pw").await.unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.status_code(), wrong.status_code());
    }

    #[tokio::test]
    async fn unknown_account_still_pays_for_a_hash_check() {
        let (sessions, _) = manager(seeded());
        let started = std::time::Instant::now();
        let err = sessions.login("mallory", "anything").await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
        // one bcrypt run at the default cost takes far longer than a map lookup
        assert!(started.elapsed() >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn disabled_account_rejected_regardless_of_password() {
        let (sessions, _) = manager(seeded());
        for password in ["correct-pw", "wrong-pw"] {
            let err = sessions.login("bob", password).await.unwrap_err();
            assert!(matches!(err, AuthError::AccountDisabled { ref status, .. } if status == "suspended"));
        }
    }

    #[tokio::test]
    async fn refresh_rotates_pair() {
        let (sessions, codec) = manager(seeded());
        let pair = sessions.login("alice", "correct-pw").await.unwrap();
        let rotated = sessions.refresh(&pair.refresh_token).await.unwrap();

        let claims = codec.verify(&rotated.access_token).unwrap();
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(codec.verify(&rotated.refresh_token).unwrap().token_type, TokenType::Refresh);
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() {
        let (sessions, _) = manager(seeded());
        let pair = sessions.login("alice", "correct-pw").await.unwrap();
        let err = sessions.refresh(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::WrongTokenType { .. }));
    }

    #[tokio::test]
    async fn refresh_rejects_garbage() {
        let (sessions, _) = manager(seeded());
        assert!(matches!(sessions.refresh("garbage").await, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn refresh_uses_current_directory_record() {
        let users = seeded();
        let (sessions, codec) = manager(users.clone());
        let pair = sessions.login("alice", "correct-pw").await.unwrap();

        users.set_role(1, "admin");
        let rotated = sessions.refresh(&pair.refresh_token).await.unwrap();
        assert_eq!(codec.verify(&rotated.access_token).unwrap().role, "admin");
        // The old access token keeps its snapshot until it expires.
        assert_eq!(codec.verify(&pair.access_token).unwrap().role, "user");
    }

    #[tokio::test]
    async fn refresh_rechecks_status_and_existence() {
        let users = seeded();
        let (sessions, _) = manager(users.clone());
        let pair = sessions.login("alice", "correct-pw").await.unwrap();

        users.set_status(1, "disabled");
        assert!(matches!(
            sessions.refresh(&pair.refresh_token).await,
            Err(AuthError::AccountDisabled { .. })
        ));

        users.remove(1);
        assert!(matches!(sessions.refresh(&pair.refresh_token).await, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn directory_failure_is_internal() {
        let users = seeded();
        users.fail_lookups(true);
        let (sessions, _) = manager(users);
        assert!(matches!(
            sessions.login("alice", "correct-pw").await,
            Err(AuthError::Internal(_))
        ));
    }
}
