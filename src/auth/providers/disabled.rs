use axum::http::HeaderMap;

use super::registry::{AuthMode, AuthProvider};
use crate::{auth::CurrentUser, error::AppError};

pub struct DisabledAuthProvider;

impl AuthProvider for DisabledAuthProvider {
    fn mode(&self) -> AuthMode {
        AuthMode::Disabled
    }

    fn authenticate(&self, _headers: &HeaderMap) -> Result<CurrentUser, AppError> {
        Ok(CurrentUser::local_admin())
    }
}
