use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    auth::CurrentUser,
    db::{dao::PaginatedResponse, entities::doll::LegacyLocation},
    response::{ApiResult, JsonApiResponse},
    routes::media::media_url,
    services::{
        ServiceContext,
        doll_service::{DollChanges, DollDetail, DollQuery, DollView, NewDoll},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateDollRequest {
    pub name: String,
    pub container_id: Option<i64>,
    pub location: Option<LegacyLocation>,
    pub bag_number: Option<i32>,
    pub purchase_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDollRequest {
    pub name: Option<String>,
    pub container_id: Option<i64>,
    pub location: Option<LegacyLocation>,
    pub bag_number: Option<i32>,
    /// Absent leaves the link alone; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub purchase_url: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListDollsParams {
    pub q: Option<String>,
    pub container_id: Option<i64>,
    pub location: Option<LegacyLocation>,
    #[serde(alias = "bag")]
    pub bag_number: Option<i32>,
    #[serde(default)]
    pub include_deleted: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl From<ListDollsParams> for DollQuery {
    fn from(params: ListDollsParams) -> Self {
        Self {
            q: params.q,
            container_id: params.container_id,
            location: params.location,
            bag_number: params.bag_number,
            include_deleted: params.include_deleted,
            limit: params.limit,
            offset: params.offset,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContainerRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DollResponse {
    pub id: i64,
    pub name: String,
    pub container_id: Option<i64>,
    pub container: Option<ContainerRef>,
    pub location: Option<LegacyLocation>,
    pub bag_number: Option<i32>,
    pub purchase_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub deleted_by: Option<String>,
    pub primary_photo_url: Option<String>,
}

impl From<DollView> for DollResponse {
    fn from(view: DollView) -> Self {
        let DollView {
            doll,
            container,
            primary_photo_path,
        } = view;
        Self {
            id: doll.id,
            name: doll.name,
            container_id: doll.container_id,
            container: container.map(|container| ContainerRef {
                id: container.id,
                name: container.name,
            }),
            location: doll.location,
            bag_number: doll.bag_number,
            purchase_url: doll.purchase_url,
            created_at: doll.created_at,
            updated_at: doll.updated_at,
            deleted_at: doll.deleted_at,
            deleted_by: doll.deleted_by,
            primary_photo_url: primary_photo_path.as_deref().map(media_url),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DollDetailResponse {
    #[serde(flatten)]
    pub doll: DollResponse,
    pub photos_count: u64,
}

impl From<DollDetail> for DollDetailResponse {
    fn from(detail: DollDetail) -> Self {
        Self {
            doll: detail.view.into(),
            photos_count: detail.photos_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionItem {
    pub id: i64,
    pub name: String,
    pub container_id: Option<i64>,
    pub container_name: Option<String>,
    pub location: Option<LegacyLocation>,
    pub bag_number: Option<i32>,
    pub primary_photo_url: Option<String>,
}

impl From<DollView> for SuggestionItem {
    fn from(view: DollView) -> Self {
        Self {
            id: view.doll.id,
            name: view.doll.name,
            container_id: view.doll.container_id,
            container_name: view.container.map(|container| container.name),
            location: view.doll.location,
            bag_number: view.doll.bag_number,
            primary_photo_url: view.primary_photo_path.as_deref().map(media_url),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub q: String,
    pub suggestions: Vec<SuggestionItem>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dolls", get(list_dolls).post(create_doll))
        .route("/dolls/suggestions", get(suggestions))
        .route(
            "/dolls/{doll_id}",
            get(get_doll).patch(update_doll).delete(delete_doll),
        )
}

async fn list_dolls(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(params): Query<ListDollsParams>,
) -> ApiResult<PaginatedResponse<DollResponse>> {
    let service = ServiceContext::from_state(state.as_ref()).dolls();
    let page = service.list(&user, params.into()).await?;
    JsonApiResponse::ok(page.map(DollResponse::from))
}

async fn suggestions(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(params): Query<ListDollsParams>,
) -> ApiResult<SuggestionsResponse> {
    let q = params.q.clone().unwrap_or_default();
    let service = ServiceContext::from_state(state.as_ref()).dolls();
    let ranked = service.suggestions(&user, &q, params.into()).await?;
    JsonApiResponse::ok(SuggestionsResponse {
        q,
        suggestions: ranked.into_iter().map(SuggestionItem::from).collect(),
    })
}

async fn create_doll(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(body): Json<CreateDollRequest>,
) -> ApiResult<DollResponse> {
    let service = ServiceContext::from_state(state.as_ref()).dolls();
    let input = NewDoll {
        name: body.name,
        container_id: body.container_id,
        location: body.location,
        bag_number: body.bag_number,
        purchase_url: body.purchase_url,
    };
    let created = service.create(&user, input).await?;
    JsonApiResponse::created(created.into())
}

async fn get_doll(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(doll_id): Path<i64>,
) -> ApiResult<DollDetailResponse> {
    let service = ServiceContext::from_state(state.as_ref()).dolls();
    let detail = service.get(&user, doll_id).await?;
    JsonApiResponse::ok(detail.into())
}

async fn update_doll(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(doll_id): Path<i64>,
    Json(body): Json<UpdateDollRequest>,
) -> ApiResult<DollResponse> {
    let service = ServiceContext::from_state(state.as_ref()).dolls();
    let changes = DollChanges {
        name: body.name,
        container_id: body.container_id,
        location: body.location,
        bag_number: body.bag_number,
        purchase_url: body.purchase_url,
    };
    let updated = service.update(&user, doll_id, changes).await?;
    JsonApiResponse::ok(updated.into())
}

async fn delete_doll(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(doll_id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    let service = ServiceContext::from_state(state.as_ref()).dolls();
    service.delete(&user, doll_id).await?;
    JsonApiResponse::deleted()
}
