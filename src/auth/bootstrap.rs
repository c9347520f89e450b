use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::warn;

use super::providers::{
    AuthMode, AuthProvider, AuthProviders, DisabledAuthProvider, ForwardedHeaderProvider,
};
use crate::config::AuthConfig;

/// Registers the provider for the configured mode and makes it active.
pub fn build_providers(cfg: &AuthConfig) -> Result<AuthProviders> {
    let provider: Arc<dyn AuthProvider> = match cfg.mode {
        AuthMode::Disabled => {
            if !cfg.allow_insecure_local {
                bail!("auth.mode = disabled requires auth.allow_insecure_local = true");
            }
            warn!("authentication is disabled; every request acts as the local admin");
            Arc::new(DisabledAuthProvider)
        }
        AuthMode::ForwardedHeader => Arc::new(ForwardedHeaderProvider::from_config(cfg)),
    };
    AuthProviders::new(cfg.mode).with_provider(provider)
}
