use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        users::{ChangePasswordRequest, UpdateProfileRequest},
    },
    error::{AppError, AppResult},
    extract::{AppPath, Valid},
    middleware::auth::AuthUser,
    models::{Robot, User},
    response::MessageResponse,
    services::{auth_service, robot_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/profile",
            get(get_profile).patch(update_profile).put(update_profile),
        )
        .route("/change-password", put(change_password))
        .route("/delete", delete(delete_account))
        .route("/listings", get(list_listings))
        .route("/favorites", get(list_favorites))
        .route("/favorites/{robot_id}", post(toggle_favorite))
}

#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = AuthResponse),
        (status = 400, description = "Validation failed or email already taken"),
    ),
    tag = "Users"
)]
pub async fn register(
    State(state): State<AppState>,
    Valid(payload): Valid<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let body = auth_service::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Users"
)]
pub async fn login(
    State(state): State<AppState>,
    Valid(payload): Valid<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let body = auth_service::login_user(&state, payload).await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_profile(user: AuthUser) -> Json<User> {
    Json(user_service::get_profile(&user))
}

#[utoipa::path(
    patch,
    path = "/api/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid updates"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Valid<UpdateProfileRequest>, AppError>,
) -> AppResult<Json<User>> {
    let Valid(payload) = payload.map_err(|err| match err {
        AppError::Json(_) => AppError::BadRequest("Invalid updates".to_string()),
        other => other,
    })?;
    let body = user_service::update_profile(&state, &user, payload).await?;
    Ok(Json(body))
}

#[utoipa::path(
    put,
    path = "/api/users/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password is incorrect"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Valid(payload): Valid<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let body = user_service::change_password(&state, &user, payload).await?;
    Ok(Json(body))
}

#[utoipa::path(
    delete,
    path = "/api/users/delete",
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    let body = user_service::delete_account(&state, &user).await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/users/listings",
    responses(
        (status = 200, description = "Listings of the current user", body = Vec<Robot>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_listings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Robot>>> {
    let body = robot_service::list_seller_robots(&state, &user).await?;
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/users/favorites",
    responses(
        (status = 200, description = "Favorite robots in the order they were added", body = Vec<Robot>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Robot>>> {
    let body = user_service::list_favorites(&state, &user).await?;
    Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/api/users/favorites/{robot_id}",
    params(
        ("robot_id" = Uuid, Path, description = "Robot ID")
    ),
    responses(
        (status = 200, description = "Favorite toggled, returns the favorite ids", body = Vec<Uuid>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Robot not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(robot_id): AppPath<Uuid>,
) -> AppResult<Json<Vec<Uuid>>> {
    let body = user_service::toggle_favorite(&state, &user, robot_id).await?;
    Ok(Json(body))
}
