use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::errors::AppError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub async fn init_pool(database_url: &str, config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Turn constraint violations into `Conflict` with the given message;
/// everything else stays a database error.
pub fn map_constraint(e: sqlx::Error, msg: impl FnOnce() -> String) -> AppError {
    let code = e.as_database_error().and_then(|d| d.code()).map(|c| c.into_owned());
    match code.as_deref() {
        Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) => AppError::Conflict(msg()),
        _ => AppError::Db(e),
    }
}

const DEMO_SEED: &str = "\
    INSERT INTO menus (title, permission) VALUES \
        ('System', ''), \
        ('Users', 'user:list'), \
        ('Roles', 'roles:list'), \
        ('Add role', 'roles:add'), \
        ('Edit role', 'roles:edit'), \
        ('Delete role', 'roles:del'), \
        ('Dictionaries', 'dict:list'); \
    INSERT INTO roles (name, level, description, data_scope) VALUES \
        ('admin', 1, 'Full access', 'all'), \
        ('operator', 2, 'Day-to-day administration', 'own_level'); \
    INSERT INTO roles_menus (role_id, menu_id) \
        SELECT r.id, m.id FROM roles r CROSS JOIN menus m WHERE r.name = 'admin'; \
    INSERT INTO roles_menus (role_id, menu_id) \
        SELECT r.id, m.id FROM roles r JOIN menus m \
            ON m.permission IN ('user:list', 'roles:list', 'dict:list') \
        WHERE r.name = 'operator'; \
    INSERT INTO users (username, is_admin) VALUES ('admin', true), ('alice', false); \
    INSERT INTO users_roles (user_id, role_id) \
        SELECT u.id, r.id FROM users u JOIN roles r \
            ON (u.username = 'admin' AND r.name = 'admin') \
            OR (u.username = 'alice' AND r.name = 'operator'); \
    INSERT INTO dicts (name, description) VALUES ('user_status', 'User status'); \
    INSERT INTO dict_details (dict_id, label, value, dict_sort) \
        SELECT d.id, v.label, v.value, v.sort FROM dicts d \
        CROSS JOIN (VALUES ('Active', 'true', 1), ('Disabled', 'false', 2)) AS v(label, value, sort) \
        WHERE d.name = 'user_status';";

/// Seed demo menus, roles, users and one dictionary. Skips if any role exists.
pub async fn seed_demo(pool: &PgPool) -> Result<(), AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        log::info!("Database already seeded ({count} roles), skipping demo seed");
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    sqlx::raw_sql(DEMO_SEED).execute(&mut *tx).await?;
    tx.commit().await?;
    log::info!("Demo seed complete");
    Ok(())
}
