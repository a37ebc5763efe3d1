use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::response::MessageResponse;

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = HealthData),
    ),
        tag = "Health"
)]
pub async fn health_check() -> Json<HealthData> {
    Json(HealthData {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = MessageResponse),
    ),
    tag = "Health"
)]
pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to RoboTrader API"))
}
