use std::{marker::PhantomData, sync::Arc};

use axum::extract::FromRequestParts;

use crate::{
    auth::{CurrentUser, RequiredPermission},
    error::AppError,
    state::AppState,
};

// Resolves the caller through the active auth provider, once per request.
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>().cloned() {
            return Ok(user);
        }

        let user = state.auth_providers.authenticate(&parts.headers)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

pub struct PermissionGuard<P: RequiredPermission> {
    pub user: CurrentUser,
    _marker: PhantomData<P>,
}

impl<P> FromRequestParts<Arc<AppState>> for PermissionGuard<P>
where
    P: RequiredPermission,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        user.require(P::required())?;

        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}
