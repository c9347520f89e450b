use std::{collections::HashMap, fmt, sync::Arc};

use anyhow::{Result, bail};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::{auth::CurrentUser, error::AppError};

/// How requests are authenticated. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Every request is the local admin. Development only.
    #[serde(alias = "none")]
    Disabled,
    /// Identity comes from headers set by a trusted reverse proxy.
    #[serde(alias = "forwardauth")]
    ForwardedHeader,
}

impl AuthMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMode::Disabled => "disabled",
            AuthMode::ForwardedHeader => "forwarded_header",
        }
    }
}

pub trait AuthProvider: Send + Sync {
    fn mode(&self) -> AuthMode;

    fn authenticate(&self, headers: &HeaderMap) -> Result<CurrentUser, AppError>;
}

#[derive(Clone)]
pub struct AuthProviders {
    active_mode: AuthMode,
    providers: HashMap<AuthMode, Arc<dyn AuthProvider>>,
}

impl fmt::Debug for AuthProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<&str> = self.providers.keys().map(|mode| mode.as_str()).collect();
        registered.sort_unstable();
        f.debug_struct("AuthProviders")
            .field("active_mode", &self.active_mode)
            .field("registered", &registered)
            .finish()
    }
}

impl AuthProviders {
    pub fn new(active_mode: AuthMode) -> Self {
        Self {
            active_mode,
            providers: HashMap::new(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn AuthProvider>) -> Result<Self> {
        self.add(provider)?;
        Ok(self)
    }

    pub fn add(&mut self, provider: Arc<dyn AuthProvider>) -> Result<()> {
        let mode = provider.mode();
        if self.providers.contains_key(&mode) {
            bail!("auth provider already registered: {}", mode.as_str());
        }
        self.providers.insert(mode, provider);
        Ok(())
    }

    pub fn active_mode(&self) -> AuthMode {
        self.active_mode
    }

    pub fn active(&self) -> Result<&dyn AuthProvider, AppError> {
        self.providers
            .get(&self.active_mode)
            .map(|provider| provider.as_ref())
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Auth provider not configured: {}",
                    self.active_mode.as_str()
                ))
            })
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<CurrentUser, AppError> {
        self.active()?.authenticate(headers)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{AuthMode, AuthProviders};
    use crate::auth::providers::DisabledAuthProvider;

    #[test]
    fn mode_accepts_legacy_spellings() {
        let none: AuthMode = serde_json::from_str("\"none\"").expect("alias parses");
        let forward: AuthMode = serde_json::from_str("\"forwardauth\"").expect("alias parses");
        let explicit: AuthMode =
            serde_json::from_str("\"forwarded_header\"").expect("name parses");
        assert_eq!(none, AuthMode::Disabled);
        assert_eq!(forward, AuthMode::ForwardedHeader);
        assert_eq!(explicit, AuthMode::ForwardedHeader);
    }

    #[test]
    fn duplicate_provider_registration_is_rejected() {
        let mut providers = AuthProviders::new(AuthMode::Disabled);
        providers
            .add(Arc::new(DisabledAuthProvider))
            .expect("first registration should succeed");

        let err = providers
            .add(Arc::new(DisabledAuthProvider))
            .expect_err("duplicate registration should fail");
        assert!(err.to_string().contains("already registered: disabled"));
    }

    #[test]
    fn active_provider_must_be_configured() {
        let providers = AuthProviders::new(AuthMode::ForwardedHeader);
        let err = match providers.active() {
            Ok(_) => panic!("missing provider should fail"),
            Err(err) => err,
        };
        assert_eq!(err.message(), "Auth provider not configured: forwarded_header");
    }

    #[test]
    fn debug_lists_registered_modes() {
        let providers = AuthProviders::new(AuthMode::Disabled)
            .with_provider(Arc::new(DisabledAuthProvider))
            .expect("registration should succeed");
        let rendered = format!("{providers:?}");
        assert!(rendered.contains("active_mode: Disabled"), "{rendered}");
        assert!(rendered.contains("\"disabled\""), "{rendered}");
    }
}
