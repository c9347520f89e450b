use std::sync::Arc;

use axum::{Router, extract::State, middleware, routing::get};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{catch_panic_layer, json_error_middleware},
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

use super::{api, media};

pub const API_PREFIX: &str = "/api";

/// Routes without the outer layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(service_info))
        .nest(API_PREFIX, api::router(&state))
        .merge(media::router())
        .with_state(state)
}

/// Complete application: routes plus error envelope, panic, tracing and CORS
/// layers.
pub fn app(state: Arc<AppState>) -> Router {
    let permissive_cors = state.config.general.permissive_cors;
    let app = router(state)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http());
    if permissive_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

#[derive(Debug, Serialize)]
struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    auth_mode: &'static str,
}

async fn service_info(State(state): State<Arc<AppState>>) -> ApiResult<ServiceInfo> {
    JsonApiResponse::ok(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        auth_mode: state.auth_providers.active_mode().as_str(),
    })
}
