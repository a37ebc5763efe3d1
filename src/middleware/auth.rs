use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::{Users, users},
    error::AppError,
    state::AppState,
};

const AUTH_FAILED: &str = "Please authenticate";

/// The authenticated caller, loaded from the database on every request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: users::Model,
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

/// Only the listing's seller may mutate it.
pub fn ensure_owner(user: &AuthUser, seller_id: Uuid, message: &'static str) -> Result<(), AppError> {
    if user.id() != seller_id {
        return Err(AppError::Forbidden(message));
    }
    Ok(())
}

/// Verify a token's signature and expiry and return the user id it carries.
pub fn verify_token(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| {
        tracing::debug!(error = %err, "token rejected");
        AppError::Unauthorized(AUTH_FAILED)
    })?;

    Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized(AUTH_FAILED))
}

fn bearer_token(parts: &axum::http::request::Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized(AUTH_FAILED))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized(AUTH_FAILED))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized(AUTH_FAILED))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user_id = verify_token(token, &state.config.jwt_secret)?;

        let user = Users::find_by_id(user_id)
            .one(&state.orm)
            .await?
            .ok_or(AppError::Unauthorized(AUTH_FAILED))?;

        Ok(AuthUser { user })
    }
}
