use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::providers::AuthProviders, config::AppConfig, storage::PhotoStorage};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub auth_providers: AuthProviders,
    pub storage: PhotoStorage,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        auth_providers: AuthProviders,
        storage: PhotoStorage,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            auth_providers,
            storage,
        })
    }
}
