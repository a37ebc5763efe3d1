use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{FromJsonQueryResult, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "robots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub manufacturer: String,
    #[sea_orm(column_name = "model")]
    pub model_name: String,
    pub year: i32,
    pub condition: RobotCondition,
    pub features: Vec<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub specifications: Specifications,
    pub images: Vec<String>,
    pub seller_id: Uuid,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub location: Option<Location>,
    pub status: ListingStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RobotCondition {
    #[sea_orm(string_value = "New")]
    #[serde(rename = "New")]
    New,
    #[sea_orm(string_value = "Like New")]
    #[serde(rename = "Like New")]
    LikeNew,
    #[sea_orm(string_value = "Excellent")]
    #[serde(rename = "Excellent")]
    Excellent,
    #[sea_orm(string_value = "Good")]
    #[serde(rename = "Good")]
    Good,
    #[sea_orm(string_value = "Fair")]
    #[serde(rename = "Fair")]
    Fair,
    #[sea_orm(string_value = "Poor")]
    #[serde(rename = "Poor")]
    Poor,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "sold")]
    Sold,
}

/// Fixed technical sheet of a listing; every entry is mandatory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[validate(length(min = 1, message = "height is required"))]
    pub height: String,
    #[validate(length(min = 1, message = "weight is required"))]
    pub weight: String,
    #[validate(length(min = 1, message = "batteryLife is required"))]
    pub battery_life: String,
    #[validate(length(min = 1, message = "maxLiftCapacity is required"))]
    pub max_lift_capacity: String,
    #[validate(length(min = 1, message = "processingUnit is required"))]
    pub processing_unit: String,
    #[validate(length(min = 1, message = "connectivity is required"))]
    pub connectivity: String,
    #[validate(length(min = 1, message = "sensors is required"))]
    pub sensors: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult, ToSchema, Validate)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// `[longitude, latitude]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 2, message = "coordinates must be [longitude, latitude]"))]
    pub coordinates: Option<Vec<f64>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SellerId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Seller,
    #[sea_orm(has_many = "super::favorites::Entity")]
    Favorites,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl Related<super::favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        self.updated_at = Set(Utc::now().fixed_offset());
        Ok(self)
    }
}
