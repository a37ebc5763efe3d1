use std::str::FromStr;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    entity::robots::{ListingStatus, RobotCondition},
    error::AppError,
};

/// Query string accepted by `GET /api/robots`.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RobotQuery {
    /// Case-insensitive regex matched against title, manufacturer, description and features.
    pub search: Option<String>,
    pub manufacturer: Option<String>,
    pub condition: Option<RobotCondition>,
    pub status: Option<ListingStatus>,
    /// Inclusive range written as `min-max`, e.g. `1000-5000`.
    pub price_range: Option<String>,
}

/// Inclusive price bounds parsed from `min-max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl FromStr for PriceRange {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::BadRequest(format!("Invalid priceRange '{raw}', expected min-max"));

        let (min, max) = raw.trim().split_once('-').ok_or_else(invalid)?;
        let min = min.trim().parse::<f64>().map_err(|_| invalid())?;
        let max = max.trim().parse::<f64>().map_err(|_| invalid())?;
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(invalid());
        }
        Ok(Self { min, max })
    }
}
