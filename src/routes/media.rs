use std::{convert::Infallible, sync::Arc};

use axum::{
    Router,
    body::Body,
    extract::{Path, Request, State},
    response::{IntoResponse, Response},
    routing::get,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::{error::AppError, state::AppState};

pub const MEDIA_PREFIX: &str = "/media";

pub fn media_url(path: &str) -> String {
    format!("{MEDIA_PREFIX}/{path}")
}

/// Stored photos, served without authentication.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/media/{*path}", get(serve_media))
}

/// Resolves `path` inside the photo root before handing the file to
/// `ServeFile`, which supplies the content type and range handling.
async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let full = state
        .storage
        .resolve(&path)
        .ok_or_else(|| AppError::not_found("File not found"))?;
    let response = ServeFile::new(full)
        .oneshot(request)
        .await
        .unwrap_or_else(|never: Infallible| match never {});
    Ok(response.map(Body::new).into_response())
}
