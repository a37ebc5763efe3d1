use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    dto::users::{ChangePasswordRequest, UpdateProfileRequest},
    entity::{Favorites, Robots, Users, favorites, users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Robot, User},
    response::MessageResponse,
    services::auth_service::{hash_password, verify_password},
    state::AppState,
};

pub fn get_profile(user: &AuthUser) -> User {
    User::from(user.user.clone())
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<User> {
    let UpdateProfileRequest {
        name,
        email,
        password,
        phone,
    } = payload;

    if let Some(email) = email.as_deref().filter(|e| *e != user.user.email) {
        let taken = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::BadRequest("Email is already taken".to_string()));
        }
    }

    let mut active: users::ActiveModel = user.user.clone().into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(password) = password {
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(phone) = phone {
        active.phone = Set(Some(phone));
    }

    let updated = active.update(&state.orm).await?;
    Ok(User::from(updated))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<MessageResponse> {
    if !verify_password(&payload.current_password, &user.user.password_hash)? {
        return Err(AppError::BadRequest("Current password is incorrect".to_string()));
    }

    let mut active: users::ActiveModel = user.user.clone().into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.update(&state.orm).await?;

    tracing::info!(user_id = %user.id(), "password changed");

    Ok(MessageResponse::new("Password changed successfully"))
}

/// Removes the account. Listings and favorites go with it through the foreign keys.
pub async fn delete_account(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<MessageResponse> {
    user.user.clone().delete(&state.orm).await?;

    tracing::info!(user_id = %user.id(), "account deleted");

    Ok(MessageResponse::new("Account deleted"))
}

pub async fn list_favorites(state: &AppState, user: &AuthUser) -> AppResult<Vec<Robot>> {
    let items = Robots::find()
        .inner_join(Favorites)
        .filter(favorites::Column::UserId.eq(user.id()))
        .order_by_asc(favorites::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Robot::from)
        .collect();

    Ok(items)
}

async fn favorite_ids<C>(conn: &C, user_id: Uuid) -> AppResult<Vec<Uuid>>
where
    C: sea_orm::ConnectionTrait,
{
    let ids = Favorites::find()
        .select_only()
        .column(favorites::Column::RobotId)
        .filter(favorites::Column::UserId.eq(user_id))
        .order_by_asc(favorites::Column::CreatedAt)
        .into_tuple::<Uuid>()
        .all(conn)
        .await?;
    Ok(ids)
}

/// Add the robot to the caller's favorites, or take it out if it is already there.
pub async fn toggle_favorite(
    state: &AppState,
    user: &AuthUser,
    robot_id: Uuid,
) -> AppResult<Vec<Uuid>> {
    if Robots::find_by_id(robot_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("Robot not found"));
    }

    let txn = state.orm.begin().await?;

    let removed = Favorites::delete_many()
        .filter(favorites::Column::UserId.eq(user.id()))
        .filter(favorites::Column::RobotId.eq(robot_id))
        .exec(&txn)
        .await?
        .rows_affected;

    if removed == 0 {
        let active = favorites::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id()),
            robot_id: Set(robot_id),
            created_at: NotSet,
        };
        // The unique (user_id, robot_id) index absorbs a concurrent duplicate add.
        Favorites::insert(active)
            .on_conflict(
                OnConflict::columns([favorites::Column::UserId, favorites::Column::RobotId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
    }

    let items = favorite_ids(&txn, user.id()).await?;
    txn.commit().await?;

    tracing::debug!(
        user_id = %user.id(),
        %robot_id,
        favorited = removed == 0,
        "favorite toggled"
    );

    Ok(items)
}
