use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{CurrentUser, ReadDolls},
    db::entities::container,
    middleware::PermissionGuard,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, container_service::ContainerChanges},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateContainerRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateContainerRequest {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ContainerResponse {
    pub id: i64,
    pub name: String,
    pub sort_order: i32,
    pub is_active: bool,
    pub is_system: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<container::Model> for ContainerResponse {
    fn from(model: container::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sort_order: model.sort_order,
            is_active: model.is_active,
            is_system: model.is_system,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContainerListResponse {
    pub items: Vec<ContainerResponse>,
    pub total: usize,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/containers", get(list_containers).post(create_container))
        .route(
            "/containers/{container_id}",
            patch(update_container).delete(delete_container),
        )
}

async fn list_containers(
    State(state): State<Arc<AppState>>,
    _guard: PermissionGuard<ReadDolls>,
) -> ApiResult<ContainerListResponse> {
    let service = ServiceContext::from_state(state.as_ref()).containers();
    let items: Vec<ContainerResponse> = service
        .list_active()
        .await?
        .into_iter()
        .map(ContainerResponse::from)
        .collect();
    JsonApiResponse::ok(ContainerListResponse {
        total: items.len(),
        items,
    })
}

async fn create_container(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(body): Json<CreateContainerRequest>,
) -> ApiResult<ContainerResponse> {
    let service = ServiceContext::from_state(state.as_ref()).containers();
    let created = service.create(&user, &body.name).await?;
    JsonApiResponse::created(created.into())
}

async fn update_container(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(container_id): Path<i64>,
    Json(body): Json<UpdateContainerRequest>,
) -> ApiResult<ContainerResponse> {
    let service = ServiceContext::from_state(state.as_ref()).containers();
    let changes = ContainerChanges {
        name: body.name,
        sort_order: body.sort_order,
        is_active: body.is_active,
    };
    let updated = service.update(&user, container_id, changes).await?;
    JsonApiResponse::ok(updated.into())
}

async fn delete_container(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(container_id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let service = ServiceContext::from_state(state.as_ref()).containers();
    service.delete(&user, container_id).await?;
    JsonApiResponse::deleted()
}
