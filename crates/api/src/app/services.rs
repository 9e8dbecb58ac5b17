//! Component wiring.

use std::sync::Arc;

use authgate_access::AccessChecker;
use authgate_directory::{InMemoryUserDirectory, UserDirectory};
use authgate_session::{InMemorySessionStore, SessionManager};
use authgate_tokens::TokenCodec;

use crate::config::ApiConfig;

/// Everything the handlers need, built once and shared.
pub struct AppServices {
    pub codec: Arc<TokenCodec>,
    pub directory: Arc<dyn UserDirectory>,
    pub sessions: SessionManager,
    pub checker: AccessChecker,
}

impl AppServices {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            Arc::new(TokenCodec::new(config.jwt_secret.as_bytes())),
            Arc::new(InMemoryUserDirectory::new()),
            config,
        )
    }

    /// Wire services around an existing directory (tests seed users and
    /// permissions through it).
    pub fn new(
        codec: Arc<TokenCodec>,
        directory: Arc<dyn UserDirectory>,
        config: &ApiConfig,
    ) -> Self {
        let store = Arc::new(InMemorySessionStore::new());
        let sessions = SessionManager::new(
            store,
            Arc::clone(&codec),
            config.access_ttl,
            config.refresh_ttl,
        );
        let checker = AccessChecker::new(Arc::clone(&directory));

        Self {
            codec,
            directory,
            sessions,
            checker,
        }
    }
}
