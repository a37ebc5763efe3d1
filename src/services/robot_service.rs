use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
    sea_query::{Expr, Order},
};
use uuid::Uuid;

use crate::{
    dto::robots::{CreateRobotRequest, UpdateRobotRequest},
    entity::{
        Robots, Users,
        robots::{ActiveModel, Column},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::{Robot, Seller},
    response::MessageResponse,
    routes::params::{PriceRange, RobotQuery},
    state::AppState,
};

const ROBOT_NOT_FOUND: &str = "Robot not found";

/// Postgres text query that matches when any of the words in `$1` match.
const ANY_TERM_TSQUERY: &str = "replace(plainto_tsquery('english', $1)::text, '&', '|')::tsquery";

/// Build the filter for `GET /api/robots` from its query string.
pub fn listing_condition(query: &RobotQuery) -> AppResult<Condition> {
    let mut condition = Condition::all();

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(Expr::cust_with_values(r#""robots"."title" ~* $1"#, [search]))
                .add(Expr::cust_with_values(r#""robots"."manufacturer" ~* $1"#, [search]))
                .add(Expr::cust_with_values(r#""robots"."description" ~* $1"#, [search]))
                .add(Expr::cust_with_values(
                    r#"EXISTS (SELECT 1 FROM unnest("robots"."features") AS feature WHERE feature ~* $1)"#,
                    [search],
                )),
        );
    }

    if let Some(manufacturer) = query.manufacturer.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Manufacturer.eq(manufacturer));
    }

    if let Some(robot_condition) = query.condition {
        condition = condition.add(Column::Condition.eq(robot_condition));
    }

    if let Some(status) = query.status {
        condition = condition.add(Column::Status.eq(status));
    }

    if let Some(raw) = query.price_range.as_deref().filter(|s| !s.is_empty()) {
        let range: PriceRange = raw.parse()?;
        condition = condition.add(Column::Price.between(range.min, range.max));
    }

    Ok(condition)
}

pub async fn list_robots(state: &AppState, query: RobotQuery) -> AppResult<Vec<Robot>> {
    let condition = listing_condition(&query)?;
    tracing::debug!(?query, "listing robots");

    let finder = Robots::find()
        .find_also_related(Users)
        .filter(condition)
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm);

    let rows = tokio::time::timeout(state.config.list_query_timeout, finder)
        .await
        .map_err(|_| {
            tracing::warn!(
                timeout_secs = state.config.list_query_timeout.as_secs(),
                "robot listing query timed out"
            );
            AppError::Timeout
        })??;

    let items: Vec<Robot> = rows
        .into_iter()
        .map(|(robot, seller)| Robot::from(robot).with_seller(seller.map(Seller::summary)))
        .collect();

    tracing::debug!(count = items.len(), "robots found");
    Ok(items)
}

pub async fn get_robot(state: &AppState, id: Uuid) -> AppResult<Robot> {
    let (robot, seller) = Robots::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound(ROBOT_NOT_FOUND))?;

    Ok(Robot::from(robot).with_seller(seller.map(Seller::with_contact)))
}

/// Full-text search over title, description, manufacturer and model, best match first.
pub async fn search_robots(state: &AppState, text: &str) -> AppResult<Vec<Robot>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let rows = Robots::find()
        .find_also_related(Users)
        .filter(Expr::cust_with_values(
            format!(r#""robots"."search_vector" @@ {ANY_TERM_TSQUERY}"#),
            [text],
        ))
        .order_by(
            Expr::cust_with_values(
                format!(r#"ts_rank("robots"."search_vector", {ANY_TERM_TSQUERY})"#),
                [text],
            ),
            Order::Desc,
        )
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .map(|(robot, seller)| Robot::from(robot).with_seller(seller.map(Seller::summary)))
        .collect();

    Ok(items)
}

pub async fn list_seller_robots(state: &AppState, user: &AuthUser) -> AppResult<Vec<Robot>> {
    let items = Robots::find()
        .filter(Column::SellerId.eq(user.id()))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Robot::from)
        .collect();

    Ok(items)
}

pub async fn create_robot(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRobotRequest,
) -> AppResult<Robot> {
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        manufacturer: Set(payload.manufacturer),
        model_name: Set(payload.model),
        year: Set(payload.year),
        condition: Set(payload.condition),
        features: Set(payload.features),
        specifications: Set(payload.specifications),
        images: Set(payload.images),
        seller_id: Set(user.id()),
        location: Set(payload.location),
        status: Set(payload.status.unwrap_or_default()),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let robot = active.insert(&state.orm).await?;

    tracing::info!(robot_id = %robot.id, seller_id = %user.id(), "robot listing created");

    Ok(Robot::from(robot))
}

pub async fn update_robot(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRobotRequest,
) -> AppResult<Robot> {
    let existing = Robots::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound(ROBOT_NOT_FOUND))?;
    ensure_owner(user, existing.seller_id, "Not authorized to update this listing")?;

    let mut active: ActiveModel = existing.into();
    apply_update(&mut active, payload);

    // Concurrent updates are last-write-wins.
    let robot = active.update(&state.orm).await?;

    tracing::info!(robot_id = %robot.id, "robot listing updated");

    Ok(Robot::from(robot))
}

fn apply_update(active: &mut ActiveModel, payload: UpdateRobotRequest) {
    let UpdateRobotRequest {
        title,
        description,
        price,
        manufacturer,
        model,
        year,
        condition,
        features,
        specifications,
        images,
        location,
        status,
    } = payload;

    if let Some(title) = title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    if let Some(price) = price {
        active.price = Set(price);
    }
    if let Some(manufacturer) = manufacturer {
        active.manufacturer = Set(manufacturer);
    }
    if let Some(model) = model {
        active.model_name = Set(model);
    }
    if let Some(year) = year {
        active.year = Set(year);
    }
    if let Some(condition) = condition {
        active.condition = Set(condition);
    }
    if let Some(features) = features {
        active.features = Set(features);
    }
    if let Some(specifications) = specifications {
        active.specifications = Set(specifications);
    }
    if let Some(images) = images {
        active.images = Set(images);
    }
    if let Some(location) = location {
        active.location = Set(Some(location));
    }
    if let Some(status) = status {
        active.status = Set(status);
    }
}

pub async fn delete_robot(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<MessageResponse> {
    let existing = Robots::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound(ROBOT_NOT_FOUND))?;
    ensure_owner(user, existing.seller_id, "Not authorized to delete this listing")?;

    existing.delete(&state.orm).await?;

    tracing::info!(robot_id = %id, "robot listing deleted");

    Ok(MessageResponse::new("Robot listing deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::robots::{ListingStatus, RobotCondition};
    use sea_orm::{DbBackend, QueryTrait};

    fn listing_sql(query: &RobotQuery) -> String {
        Robots::find()
            .filter(listing_condition(query).unwrap())
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn empty_query_has_no_filter() {
        let sql = listing_sql(&RobotQuery::default());
        let filter = sql.split_once(" WHERE ").map(|(_, filter)| filter).unwrap_or_default();
        assert!(!filter.contains(r#""robots"."#), "{sql}");
    }

    #[test]
    fn exact_filters_and_price_range_are_combined() {
        let sql = listing_sql(&RobotQuery {
            manufacturer: Some("Tesla".into()),
            condition: Some(RobotCondition::LikeNew),
            status: Some(ListingStatus::Available),
            price_range: Some("1000-5000".into()),
            ..Default::default()
        });
        assert!(sql.contains(r#""robots"."manufacturer" = 'Tesla'"#), "{sql}");
        assert!(sql.contains(r#""robots"."condition" = 'Like New'"#), "{sql}");
        assert!(sql.contains(r#""robots"."status" = 'available'"#), "{sql}");
        assert!(sql.contains(r#""robots"."price" BETWEEN 1000 AND 5000"#), "{sql}");
    }

    #[test]
    fn search_matches_any_text_field() {
        let sql = listing_sql(&RobotQuery {
            search: Some("optimus".into()),
            ..Default::default()
        });
        for column in ["title", "manufacturer", "description"] {
            assert!(sql.contains(&format!(r#""robots"."{column}" ~* 'optimus'"#)), "{sql}");
        }
        assert!(sql.contains("unnest"), "{sql}");
        assert!(!sql.contains('?'), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
    }

    #[test]
    fn malformed_price_range_is_rejected() {
        let query = RobotQuery {
            price_range: Some("cheap-expensive".into()),
            ..Default::default()
        };
        assert!(matches!(listing_condition(&query), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn update_touches_only_given_fields() {
        let mut active = ActiveModel {
            title: Set("Old".into()),
            price: Set(10.0),
            ..Default::default()
        };
        apply_update(
            &mut active,
            UpdateRobotRequest {
                price: Some(20.0),
                ..Default::default()
            },
        );
        assert_eq!(active.title, Set("Old".to_string()));
        assert_eq!(active.price, Set(20.0));
        assert!(active.seller_id.is_not_set());
    }
}
