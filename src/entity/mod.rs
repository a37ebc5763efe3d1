pub mod favorites;
pub mod robots;
pub mod users;

pub use favorites::Entity as Favorites;
pub use robots::Entity as Robots;
pub use users::Entity as Users;
