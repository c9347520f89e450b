use axum::http::HeaderMap;

use super::registry::{AuthMode, AuthProvider};
use crate::{
    auth::{CurrentUser, PermissionResolver, parse_groups},
    config::AuthConfig,
    error::AppError,
};

/// Trusts identity headers injected by the reverse proxy in front of the API.
pub struct ForwardedHeaderProvider {
    user_header: String,
    email_header: String,
    groups_header: String,
    resolver: PermissionResolver,
}

impl ForwardedHeaderProvider {
    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self {
            user_header: cfg.header_user.trim().to_string(),
            email_header: cfg.header_email.trim().to_string(),
            groups_header: cfg.header_groups.trim().to_string(),
            resolver: PermissionResolver::from_config(cfg),
        }
    }

    fn header<'a>(&self, headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

impl AuthProvider for ForwardedHeaderProvider {
    fn mode(&self) -> AuthMode {
        AuthMode::ForwardedHeader
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<CurrentUser, AppError> {
        let user_id = self.header(headers, &self.user_header);
        let email = self.header(headers, &self.email_header);
        let (Some(user_id), Some(email)) = (user_id, email) else {
            return Err(AppError::unauthorized(format!(
                "Missing required auth headers: {}, {}",
                self.user_header, self.email_header
            )));
        };

        let groups = self
            .header(headers, &self.groups_header)
            .map(parse_groups)
            .unwrap_or_default();
        let permissions = self.resolver.resolve(&groups);

        Ok(CurrentUser {
            id: user_id.to_string(),
            email: email.to_string(),
            display_name: user_id.to_string(),
            groups,
            permissions,
        })
    }
}
