use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

use crate::{
    auth::CurrentUser,
    db::entities::photo,
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    routes::media::media_url,
    services::{
        ServiceContext,
        photo_service::{PhotoList, PrimarySwap, UploadedFile},
    },
    state::AppState,
};

/// Room for multipart framing and the `make_primary` field on top of the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub id: i64,
    pub doll_id: i64,
    pub url: String,
    pub is_primary: bool,
    pub created_at: DateTimeWithTimeZone,
    pub created_by: String,
}

impl From<photo::Model> for PhotoResponse {
    fn from(model: photo::Model) -> Self {
        Self {
            id: model.id,
            doll_id: model.doll_id,
            url: media_url(&model.path),
            is_primary: model.is_primary,
            created_at: model.created_at,
            created_by: model.created_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoListResponse {
    pub doll_id: i64,
    pub primary_photo_id: Option<i64>,
    pub photos: Vec<PhotoResponse>,
}

impl From<PhotoList> for PhotoListResponse {
    fn from(list: PhotoList) -> Self {
        Self {
            doll_id: list.doll_id,
            primary_photo_id: list.primary_photo_id,
            photos: list.photos.into_iter().map(PhotoResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SetPrimaryResponse {
    pub doll_id: i64,
    pub primary_photo_id: i64,
    pub photo_id: i64,
}

impl From<PrimarySwap> for SetPrimaryResponse {
    fn from(swap: PrimarySwap) -> Self {
        Self {
            doll_id: swap.doll_id,
            primary_photo_id: swap.primary_photo_id,
            photo_id: swap.photo_id,
        }
    }
}

pub fn router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/dolls/{doll_id}/photos",
            get(list_photos).post(upload_photo).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .route("/photos/{photo_id}/set-primary", post(set_primary))
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "" | "false" | "0" | "no" | "off" => Ok(false),
        other => Err(AppError::bad_request(format!(
            "make_primary must be a boolean, got '{other}'"
        ))),
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::bad_request(format!("Invalid upload: {}", err.body_text()))
}

async fn upload_photo(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(doll_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<PhotoResponse> {
    let mut file = None;
    let mut make_primary = false;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("make_primary") => {
                make_primary = parse_flag(&field.text().await.map_err(multipart_error)?)?;
            }
            _ => {}
        }
    }
    let file = file.ok_or_else(|| AppError::bad_request("Missing file field"))?;

    let service = ServiceContext::from_state(state.as_ref()).photos();
    let photo = service.upload(&user, doll_id, file, make_primary).await?;
    JsonApiResponse::created(photo.into())
}

async fn list_photos(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(doll_id): Path<i64>,
) -> ApiResult<PhotoListResponse> {
    let service = ServiceContext::from_state(state.as_ref()).photos();
    let list = service.list(&user, doll_id).await?;
    JsonApiResponse::ok(list.into())
}

async fn set_primary(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(photo_id): Path<i64>,
) -> ApiResult<SetPrimaryResponse> {
    let service = ServiceContext::from_state(state.as_ref()).photos();
    let swap = service.set_primary(&user, photo_id).await?;
    JsonApiResponse::ok(swap.into())
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn make_primary_accepts_common_spellings() {
        for raw in ["true", "1", "YES", " on "] {
            assert!(parse_flag(raw).expect("truthy"), "{raw}");
        }
        for raw in ["false", "0", "no", "off", ""] {
            assert!(!parse_flag(raw).expect("falsy"), "{raw}");
        }
        assert!(parse_flag("maybe").is_err());
    }
}
