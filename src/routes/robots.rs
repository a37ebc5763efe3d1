use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::robots::{CreateRobotRequest, UpdateRobotRequest},
    error::AppResult,
    extract::{AppPath, AppQuery, Valid},
    middleware::auth::AuthUser,
    models::Robot,
    response::MessageResponse,
    routes::params::RobotQuery,
    services::robot_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_robots).post(create_robot))
        .route("/user", get(my_robots))
        .route("/search/{query}", get(search_robots))
        .route(
            "/{id}",
            get(get_robot).patch(update_robot).delete(delete_robot),
        )
}

#[utoipa::path(
    get,
    path = "/api/robots",
    params(RobotQuery),
    responses(
        (status = 200, description = "List robot listings, newest first", body = Vec<Robot>),
        (status = 400, description = "Malformed filter"),
        (status = 504, description = "Listing query timed out"),
    ),
    tag = "Robots"
)]
pub async fn list_robots(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RobotQuery>,
) -> AppResult<Json<Vec<Robot>>> {
    let body = robot_service::list_robots(&state, query).await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/robots/{id}",
    params(
        ("id" = Uuid, Path, description = "Robot ID")
    ),
    responses(
        (status = 200, description = "Robot with seller contact", body = Robot),
        (status = 404, description = "Robot not found"),
    ),
    tag = "Robots"
)]
pub async fn get_robot(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Robot>> {
    let body = robot_service::get_robot(&state, id).await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/robots/search/{query}",
    params(
        ("query" = String, Path, description = "Words to search for")
    ),
    responses(
        (status = 200, description = "Full-text matches, best first", body = Vec<Robot>),
    ),
    tag = "Robots"
)]
pub async fn search_robots(
    State(state): State<AppState>,
    AppPath(query): AppPath<String>,
) -> AppResult<Json<Vec<Robot>>> {
    let body = robot_service::search_robots(&state, &query).await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/robots/user",
    responses(
        (status = 200, description = "Listings of the current user", body = Vec<Robot>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Robots"
)]
pub async fn my_robots(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Robot>>> {
    let body = robot_service::list_seller_robots(&state, &user).await?;
    Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/api/robots",
    request_body = CreateRobotRequest,
    responses(
        (status = 201, description = "Listing created", body = Robot),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Robots"
)]
pub async fn create_robot(
    State(state): State<AppState>,
    user: AuthUser,
    Valid(payload): Valid<CreateRobotRequest>,
) -> AppResult<(StatusCode, Json<Robot>)> {
    let body = robot_service::create_robot(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    patch,
    path = "/api/robots/{id}",
    params(
        ("id" = Uuid, Path, description = "Robot ID")
    ),
    request_body = UpdateRobotRequest,
    responses(
        (status = 200, description = "Listing updated", body = Robot),
        (status = 400, description = "Validation failed or unknown field"),
        (status = 403, description = "Caller is not the seller"),
        (status = 404, description = "Robot not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Robots"
)]
pub async fn update_robot(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    Valid(payload): Valid<UpdateRobotRequest>,
) -> AppResult<Json<Robot>> {
    let body = robot_service::update_robot(&state, &user, id, payload).await?;
    Ok(Json(body))
}

#[utoipa::path(
    delete,
    path = "/api/robots/{id}",
    params(
        ("id" = Uuid, Path, description = "Robot ID")
    ),
    responses(
        (status = 200, description = "Listing deleted", body = MessageResponse),
        (status = 403, description = "Caller is not the seller"),
        (status = 404, description = "Robot not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Robots"
)]
pub async fn delete_robot(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let body = robot_service::delete_robot(&state, &user, id).await?;
    Ok(Json(body))
}
