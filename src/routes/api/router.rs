use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{containers, dolls, events, me, photos, public};

pub fn router(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .merge(public::router())
        .merge(me::router())
        .merge(dolls::router())
        .merge(events::router())
        .merge(containers::router())
        .merge(photos::router(state.config.storage.max_upload_bytes))
}
