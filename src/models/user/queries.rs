use async_trait::async_trait;
use sqlx::PgPool;

use super::types::{User, UserDto};
use crate::errors::AppError;
use crate::models::role::{PgRoleRepository, RoleSmallDto};
use crate::repository::{RoleRepository, UserRepository};

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
    roles: PgRoleRepository,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        let roles = PgRoleRepository::new(pool.clone());
        PgUserRepository { pool, roles }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_dto_by_id(&self, id: i64) -> Result<Option<UserDto>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, is_admin FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(user) = user else {
            return Ok(None);
        };
        let roles = self
            .roles
            .find_by_user_id(user.id)
            .await?
            .into_iter()
            .map(RoleSmallDto::from)
            .collect();
        Ok(Some(UserDto::from_user(user, roles)))
    }
}
