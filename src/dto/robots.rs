use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::entity::robots::{ListingStatus, Location, RobotCondition, Specifications};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRobotRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(length(min = 1, message = "manufacturer is required"))]
    pub manufacturer: String,
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100, message = "year is out of range"))]
    pub year: i32,
    pub condition: RobotCondition,
    #[serde(default)]
    pub features: Vec<String>,
    #[validate(nested)]
    pub specifications: Specifications,
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(nested)]
    pub location: Option<Location>,
    pub status: Option<ListingStatus>,
}

/// Fields a seller may change on their own listing. The seller, id and
/// timestamps are not part of it, so unknown keys are refused.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateRobotRequest {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[validate(length(min = 1, message = "manufacturer must not be empty"))]
    pub manufacturer: Option<String>,
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "year is out of range"))]
    pub year: Option<i32>,
    pub condition: Option<RobotCondition>,
    pub features: Option<Vec<String>>,
    #[validate(nested)]
    pub specifications: Option<Specifications>,
    pub images: Option<Vec<String>>,
    #[validate(nested)]
    pub location: Option<Location>,
    pub status: Option<ListingStatus>,
}
