pub mod auth;
pub mod robots;
pub mod users;
pub mod upload;
