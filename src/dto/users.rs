use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Profile fields a user may change about themselves. Anything else in the
/// body is refused.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 128, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 6, max = 128, message = "password must be at least 6 characters"))]
    pub new_password: String,
}
