use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::auth::{AuthResponse, Claims, LoginRequest, RegisterRequest},
    entity::{
        Users,
        users::{self, UserRole},
    },
    error::{AppError, AppResult},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(config: &AppConfig, user_id: Uuid) -> AppResult<String> {
    let now = Utc::now();
    let expiration = TimeDelta::try_hours(config.jwt_expiry_hours)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "JWT_EXPIRY_HOURS={} does not give a valid expiry",
                config.jwt_expiry_hours
            ))
        })?;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<AuthResponse> {
    let RegisterRequest {
        name,
        email,
        password,
        phone,
        role,
    } = payload;

    let role = role.unwrap_or_default();
    if role == UserRole::Admin {
        return Err(AppError::BadRequest("Cannot register as admin".to_string()));
    }

    let exist = Users::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let active = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(hash_password(&password)?),
        phone: Set(phone),
        role: Set(role),
        ratings: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    };
    // A concurrent registration can still win the race; the unique index turns that into a 400.
    let user = active.insert(&state.orm).await?;
    let token = issue_token(&state.config, user.id)?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(AuthResponse {
        user: user.into(),
        token,
    })
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<AuthResponse> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(&password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "password mismatch");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
    }

    let token = issue_token(&state.config, user.id)?;

    Ok(AuthResponse {
        user: user.into(),
        token,
    })
}
