use std::sync::Arc;

use crate::auth::{AuthError, SessionManager, TokenCodec};
use crate::config::AppConfig;
use crate::database::Stores;
use crate::middleware::Authenticator;

/// Shared state handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionManager>,
    pub authenticator: Arc<Authenticator>,
    pub stores: Stores,
}

impl AppState {
    /// Wires the token codec into both the session manager and the
    /// request authenticator so they agree on the secret.
    pub fn new(config: AppConfig, stores: Stores) -> Result<Self, AuthError> {
        let codec = Arc::new(TokenCodec::new(&config.security.jwt_secret)?);
        let sessions = SessionManager::new(stores.users.clone(), codec.clone(), &config.security);

        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            authenticator: Arc::new(Authenticator::new(codec)),
            stores,
        })
    }
}
