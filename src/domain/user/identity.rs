use serde::{Deserialize, Serialize};

use super::User;
use crate::domain::role::ADMIN_ROLE;

/// The identity established by a successful login and carried by the auth
/// cookie on every subsequent request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

impl AuthenticatedIdentity {
    pub fn is_in_role(&self, role: &str) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.is_in_role(ADMIN_ROLE)
    }
}

impl From<&User> for AuthenticatedIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            display_name: user.display_name(),
            role: user.role.name.clone(),
        }
    }
}
