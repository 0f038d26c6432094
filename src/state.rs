use std::sync::Arc;

use crate::config::Config;
use crate::repos::user_store::UserStore;
use crate::services::auth::TokenService;
use crate::services::auth::keys::KeyMaterial;
use crate::services::auth::provider::ProviderClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub keys: Arc<KeyMaterial>,
    pub tokens: Arc<TokenService>,
    pub provider: ProviderClient,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        keys: Arc<KeyMaterial>,
        tokens: Arc<TokenService>,
        provider: ProviderClient,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            config,
            keys,
            tokens,
            provider,
            users,
        }
    }
}
