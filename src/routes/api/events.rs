use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::{
    auth::CurrentUser,
    db::{
        dao::PaginatedResponse,
        entities::event::{self, EventType},
    },
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: i64,
    pub doll_id: i64,
    pub event_type: EventType,
    pub payload: serde_json::Value,
    pub created_at: DateTimeWithTimeZone,
    pub created_by: String,
}

impl From<event::Model> for EventResponse {
    fn from(model: event::Model) -> Self {
        // Rows written by older tooling may hold non-JSON text.
        let payload = match model.payload {
            Some(raw) => serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw)),
            None => serde_json::Value::Null,
        };
        Self {
            id: model.id,
            doll_id: model.doll_id,
            event_type: model.event_type,
            payload,
            created_at: model.created_at,
            created_by: model.created_by,
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events))
        .route("/dolls/{doll_id}/events", get(list_doll_events))
}

async fn list_doll_events(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(doll_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> ApiResult<PaginatedResponse<EventResponse>> {
    let service = ServiceContext::from_state(state.as_ref()).events();
    let page = service
        .list_for_doll(&user, doll_id, params.limit, params.offset)
        .await?;
    JsonApiResponse::ok(page.map(EventResponse::from))
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(params): Query<PageParams>,
) -> ApiResult<PaginatedResponse<EventResponse>> {
    let service = ServiceContext::from_state(state.as_ref()).events();
    let page = service.list_all(&user, params.limit, params.offset).await?;
    JsonApiResponse::ok(page.map(EventResponse::from))
}
