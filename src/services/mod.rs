pub mod auth_service;
pub mod robot_service;
pub mod upload_service;
pub mod user_service;
