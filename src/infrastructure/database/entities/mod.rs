//! Database entities module

pub mod promotion;
pub mod role;
pub mod user;

pub use promotion::Entity as Promotion;
pub use role::Entity as Role;
pub use user::Entity as User;
