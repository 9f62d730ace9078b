//! Shared application state.

use std::sync::Arc;

use crate::application::services::{AuthService, BlockService, GateService};
use crate::domain::rate_limit::WindowCounter;
use crate::domain::repositories::{BlockRepository, TokenRepository};

/// State injected into every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub block_service: Arc<BlockService>,
    pub auth_service: Arc<AuthService>,
    pub gate: Arc<GateService>,
    pub counter: Arc<WindowCounter>,
    /// Whether `X-Forwarded-For` / `X-Real-IP` are trusted for client identity.
    pub trust_proxy: bool,
}

impl AppState {
    /// Wires services over the given repositories and counter.
    pub fn new(
        block_repository: Arc<dyn BlockRepository>,
        token_repository: Arc<dyn TokenRepository>,
        counter: Arc<WindowCounter>,
        settings: StateSettings,
    ) -> Self {
        let block_service = Arc::new(BlockService::new(
            block_repository,
            settings.store_timeout,
        ));
        let auth_service = Arc::new(AuthService::new(
            token_repository,
            settings.token_signing_secret,
        ));
        let gate = Arc::new(GateService::new(
            Arc::clone(&block_service),
            Arc::clone(&counter),
        ));

        Self {
            block_service,
            auth_service,
            gate,
            counter,
            trust_proxy: settings.trust_proxy,
        }
    }
}

/// Runtime settings needed to build [`AppState`].
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub store_timeout: std::time::Duration,
    pub token_signing_secret: String,
    pub trust_proxy: bool,
}
