//! Roles: named permission tiers referenced by users.

use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "Admin";
pub const ORGANIZER_ROLE: &str = "Organizer";
pub const CUSTOMER_ROLE: &str = "Customer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}
