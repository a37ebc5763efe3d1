use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};

use crate::{
    dto::upload::{UploadForm, UploadResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    services::upload_service,
    state::AppState,
};

pub fn router(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(upload_images))
        .layer(DefaultBodyLimit::max(body_limit))
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored image paths", body = UploadResponse),
        (status = 400, description = "No files, too many files or not an image"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Upload"
)]
pub async fn upload_images(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Result<Multipart, axum::extract::multipart::MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let multipart = multipart.map_err(AppError::from)?;
    let body = upload_service::store_images(&state.config, &user, multipart).await?;
    Ok(Json(body))
}
