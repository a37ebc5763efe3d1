use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        robots::{CreateRobotRequest, UpdateRobotRequest},
        upload::{UploadForm, UploadResponse},
        users::{ChangePasswordRequest, UpdateProfileRequest},
    },
    entity::{
        robots::{ListingStatus, Location, RobotCondition, Specifications},
        users::UserRole,
    },
    models::{Robot, Seller, User},
    response::{ErrorResponse, FieldError, MessageResponse},
    routes::{health, params, robots, upload, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::welcome,
        health::health_check,
        robots::list_robots,
        robots::get_robot,
        robots::search_robots,
        robots::my_robots,
        robots::create_robot,
        robots::update_robot,
        robots::delete_robot,
        users::register,
        users::login,
        users::get_profile,
        users::update_profile,
        users::change_password,
        users::delete_account,
        users::list_listings,
        users::list_favorites,
        users::toggle_favorite,
        upload::upload_images
    ),
    components(
        schemas(
            Robot,
            Seller,
            User,
            UserRole,
            RobotCondition,
            ListingStatus,
            Specifications,
            Location,
            CreateRobotRequest,
            UpdateRobotRequest,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UpdateProfileRequest,
            ChangePasswordRequest,
            UploadForm,
            UploadResponse,
            params::RobotQuery,
            MessageResponse,
            ErrorResponse,
            FieldError,
            health::HealthData
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Robots", description = "Robot listing endpoints"),
        (name = "Users", description = "Account, profile and favorite endpoints"),
        (name = "Upload", description = "Image upload endpoint"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
