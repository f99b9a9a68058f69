use serde::Serialize;

use crate::models::role::RoleSmallDto;

/// User row as stored. Credentials live with the authentication service.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

/// User read model with abbreviated roles, input to authority mapping.
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub roles: Vec<RoleSmallDto>,
}

impl UserDto {
    pub fn from_user(user: User, roles: Vec<RoleSmallDto>) -> Self {
        UserDto { id: user.id, username: user.username, is_admin: user.is_admin, roles }
    }

    pub fn role_ids(&self) -> Vec<i64> {
        self.roles.iter().map(|r| r.id).collect()
    }
}
