//! Shared test infrastructure.
//!
//! Everything runs against the in-memory store. `pg_pool()` hands out a
//! migrated PostgreSQL pool only when `TEST_DATABASE_URL` is set.

#![allow(dead_code, unused_macros)]

use std::sync::Arc;

use rolekeeper::models::role::RoleForm;
use rolekeeper::repository::memory::MemoryStore;
use rolekeeper::services::RoleService;

// ============================================================================
// STORE SETUP
// ============================================================================

/// Empty store plus a service over it.
pub fn setup() -> (Arc<MemoryStore>, RoleService) {
    let store = Arc::new(MemoryStore::new());
    let svc = RoleService::new(store.clone(), store.clone());
    (store, svc)
}

/// Store with the demo menus, roles, users and dictionary.
pub async fn setup_seeded() -> (Arc<MemoryStore>, RoleService) {
    let store = Arc::new(MemoryStore::with_demo_data().await.expect("demo data"));
    let svc = RoleService::new(store.clone(), store.clone());
    (store, svc)
}

pub async fn create_role(svc: &RoleService, name: &str, level: i32) -> i64 {
    svc.create(&RoleForm::new(name, level)).await.expect("create role")
}

pub async fn create_role_with_menus(svc: &RoleService, name: &str, level: i32, menus: &[i64]) -> i64 {
    let form = RoleForm { menus: menus.to_vec(), ..RoleForm::new(name, level) };
    svc.create(&form).await.expect("create role")
}

// ============================================================================
// HTTP SETUP
// ============================================================================

/// Build the `/api` app over a store and initialise it as a test service.
macro_rules! init_app {
    ($store:expr) => {{
        let store = $store;
        let svc = rolekeeper::services::RoleService::new(store.clone(), store.clone());
        let dict_details: std::sync::Arc<dyn rolekeeper::repository::DictDetailRepository> = store;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(svc))
                .app_data(actix_web::web::Data::from(dict_details))
                .service(actix_web::web::scope("/api").configure(rolekeeper::handlers::configure)),
        )
        .await
    }};
}

// ============================================================================
// POSTGRES (optional)
// ============================================================================

/// Migrated pool for `TEST_DATABASE_URL`, or `None` to skip the test.
pub async fn pg_pool() -> Option<sqlx::PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = sqlx::PgPool::connect(&url).await.expect("connect TEST_DATABASE_URL");
    rolekeeper::db::run_migrations(&pool).await.expect("migrations");
    Some(pool)
}
