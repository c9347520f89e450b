use std::sync::Arc;

use axum::{Router, routing::get};

use crate::{
    auth::{CurrentUser, MeResponse},
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(me))
}

async fn me(user: CurrentUser) -> ApiResult<MeResponse> {
    JsonApiResponse::ok(MeResponse::from(&user))
}
