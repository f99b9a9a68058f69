use async_trait::async_trait;
use sqlx::PgPool;

use super::filter;
use super::types::{Role, RoleForm};
use crate::db::map_constraint;
use crate::errors::AppError;
use crate::models::menu::Menu;
use crate::models::page::Pageable;
use crate::models::table_filter::builder::build_where_clause;
use crate::models::table_filter::{FilterTree, SortSpec};
use crate::repository::RoleRepository;

const SELECT_ROLE: &str = "\
    SELECT r.id, r.name, r.level, r.description, r.data_scope, \
           to_char(r.created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD HH24:MI:SS') AS created_at, \
           to_char(r.updated_at AT TIME ZONE 'UTC', 'YYYY-MM-DD HH24:MI:SS') AS updated_at \
    FROM roles r";

/// Roles, their menu bindings and user assignments in PostgreSQL.
#[derive(Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        PgRoleRepository { pool }
    }
}

fn order_by(sort: &SortSpec) -> String {
    format!("{} {}, r.id", filter::sort_col(&sort.column), sort.sql_dir())
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_all(&self, tree: &FilterTree, sort: &SortSpec) -> Result<Vec<Role>, AppError> {
        let clause = build_where_clause(tree, &filter::FIELDS, 0)?;
        let sql = format!("{SELECT_ROLE} WHERE {} ORDER BY {}", clause.sql, order_by(sort));

        let mut query = sqlx::query_as::<_, Role>(&sql);
        for p in &clause.params {
            query = query.bind(p);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn find_page(&self, tree: &FilterTree, pageable: &Pageable) -> Result<(Vec<Role>, i64), AppError> {
        let clause = build_where_clause(tree, &filter::FIELDS, 0)?;

        let count_sql = format!("SELECT COUNT(*) FROM roles r WHERE {}", clause.sql);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        for p in &clause.params {
            count = count.bind(p);
        }
        let total = count.fetch_one(&self.pool).await?;

        let n = clause.params.len();
        let data_sql = format!(
            "{SELECT_ROLE} WHERE {} ORDER BY {} LIMIT ${} OFFSET ${}",
            clause.sql,
            order_by(&pageable.sort),
            n + 1,
            n + 2
        );
        let mut query = sqlx::query_as::<_, Role>(&data_sql);
        for p in &clause.params {
            query = query.bind(p);
        }
        let roles = query
            .bind(pageable.size)
            .bind(pageable.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((roles, total))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        let sql = format!("{SELECT_ROLE} WHERE r.id = $1");
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, AppError> {
        let sql = format!("{SELECT_ROLE} WHERE r.id = ANY($1) ORDER BY r.level, r.id");
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let sql = format!("{SELECT_ROLE} WHERE r.name = $1");
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create(&self, form: &RoleForm) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO roles (name, level, description, data_scope) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&form.name)
        .bind(form.level)
        .bind(&form.description)
        .bind(form.data_scope.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, || format!("A role named '{}' already exists", form.name)))?;

        if !form.menus.is_empty() {
            sqlx::query(
                "INSERT INTO roles_menus (role_id, menu_id) \
                 SELECT $1, m.id FROM menus m WHERE m.id = ANY($2)",
            )
            .bind(id)
            .bind(&form.menus)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    async fn update(&self, id: i64, form: &RoleForm) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE roles SET name = $1, level = $2, description = $3, data_scope = $4, \
             updated_at = now() WHERE id = $5",
        )
        .bind(&form.name)
        .bind(form.level)
        .bind(&form.description)
        .bind(form.data_scope.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint(e, || format!("A role named '{}' already exists", form.name)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self, ids: &[i64]) -> Result<u64, AppError> {
        // roles_menus cascades; users_roles restricts.
        let result = sqlx::query("DELETE FROM roles WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| map_constraint(e, || "Role is still assigned to users".to_string()))?;
        Ok(result.rows_affected())
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Role>, AppError> {
        let sql = format!(
            "{SELECT_ROLE} JOIN users_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 ORDER BY r.level, r.id"
        );
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_held_by_users(&self, ids: &[i64]) -> Result<Vec<Role>, AppError> {
        let sql = format!(
            "{SELECT_ROLE} WHERE r.id = ANY($1) \
             AND EXISTS (SELECT 1 FROM users_roles ur WHERE ur.role_id = r.id) \
             ORDER BY r.level, r.id"
        );
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_menus(&self, role_ids: &[i64]) -> Result<Vec<(i64, Menu)>, AppError> {
        #[derive(sqlx::FromRow)]
        struct Binding {
            role_id: i64,
            id: i64,
            title: String,
            permission: String,
        }

        let rows = sqlx::query_as::<_, Binding>(
            "SELECT rm.role_id, m.id, m.title, m.permission \
             FROM roles_menus rm JOIN menus m ON m.id = rm.menu_id \
             WHERE rm.role_id = ANY($1) \
             ORDER BY rm.role_id, m.id",
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|b| (b.role_id, Menu { id: b.id, title: b.title, permission: b.permission }))
            .collect())
    }

    async fn replace_menus(&self, role_id: i64, menu_ids: &[i64]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Replace bindings: delete all, re-insert selected
        sqlx::query("DELETE FROM roles_menus WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO roles_menus (role_id, menu_id) \
             SELECT $1, m.id FROM menus m WHERE m.id = ANY($2)",
        )
        .bind(role_id)
        .bind(menu_ids)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE roles SET updated_at = now() WHERE id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn untie_menu(&self, menu_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM roles_menus WHERE menu_id = $1")
            .bind(menu_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_in_menu_id(&self, menu_ids: &[i64]) -> Result<Vec<Role>, AppError> {
        let sql = format!(
            "{SELECT_ROLE} WHERE EXISTS ( \
                 SELECT 1 FROM roles_menus rm WHERE rm.role_id = r.id AND rm.menu_id = ANY($1) \
             ) ORDER BY r.level, r.id"
        );
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(menu_ids)
            .fetch_all(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_at_filters_on_the_selected_text() {
        let col = filter::FIELDS.column("created_at").unwrap();
        assert!(SELECT_ROLE.contains(&format!("{col} AS created_at")));
    }
}
