use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    robots::{self, ListingStatus, Location, RobotCondition, Specifications},
    users::{self, UserRole},
};

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub ratings: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            role: model.role,
            ratings: model.ratings,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Seller fields populated into a listing. Contact details are only filled
/// in on the single-listing view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Seller {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub ratings: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Seller {
    pub fn summary(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            ratings: model.ratings,
            phone: None,
            email: None,
        }
    }

    pub fn with_contact(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            ratings: model.ratings,
            phone: model.phone,
            email: Some(model.email),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Robot {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub manufacturer: String,
    pub model: String,
    pub year: i32,
    pub condition: RobotCondition,
    pub features: Vec<String>,
    pub specifications: Specifications,
    pub images: Vec<String>,
    pub seller_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<Seller>,
    pub location: Option<Location>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Robot {
    pub fn with_seller(mut self, seller: Option<Seller>) -> Self {
        self.seller = seller;
        self
    }
}

impl From<robots::Model> for Robot {
    fn from(model: robots::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            price: model.price,
            manufacturer: model.manufacturer,
            model: model.model_name,
            year: model.year,
            condition: model.condition,
            features: model.features,
            specifications: model.specifications,
            images: model.images,
            seller_id: model.seller_id,
            seller: None,
            location: model.location,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_serialized_as_underscore_id() {
        let seller = Seller {
            id: Uuid::nil(),
            name: "Tesla Sales".to_string(),
            ratings: Some(4.5),
            phone: None,
            email: None,
        };
        let json = serde_json::to_value(&seller).unwrap();
        assert_eq!(json["_id"], Uuid::nil().to_string());
        assert!(json.get("id").is_none());
        assert!(json.get("email").is_none());
    }
}
