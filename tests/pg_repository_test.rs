/// PostgreSQL repository tests. Each returns early unless `TEST_DATABASE_URL`
/// points at a scratch database; names carry a per-run suffix so runs do not
/// collide.

use std::collections::BTreeSet;
use std::sync::Arc;

use rolekeeper::errors::AppError;
use rolekeeper::models::dict_detail::{DictDetailForm, PgDictDetailRepository};
use rolekeeper::models::role::{PgRoleRepository, RoleForm, RoleQueryCriteria};
use rolekeeper::models::user::PgUserRepository;
use rolekeeper::repository::DictDetailRepository;
use rolekeeper::services::RoleService;

mod common;

fn suffix() -> String {
    chrono::Utc::now().format("%H%M%S%f").to_string()
}

async fn insert_menu(pool: &sqlx::PgPool, title: &str, permission: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO menus (title, permission) VALUES ($1, $2) RETURNING id")
        .bind(title)
        .bind(permission)
        .fetch_one(pool)
        .await
        .expect("insert menu")
}

async fn insert_user(pool: &sqlx::PgPool, username: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (username, is_admin) VALUES ($1, false) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .expect("insert user")
}

#[tokio::test]
async fn test_pg_role_lifecycle() {
    let Some(pool) = common::pg_pool().await else {
        return;
    };
    let svc = RoleService::new(
        Arc::new(PgRoleRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool.clone())),
    );
    let tag = suffix();

    let a = insert_menu(&pool, "A", &format!("a{tag}:list")).await;
    let b = insert_menu(&pool, "B", &format!("b{tag}:list")).await;
    let admin = svc
        .create(&RoleForm { menus: vec![a, -1], ..RoleForm::new(&format!("ADMIN{tag}"), 1) })
        .await
        .expect("create admin");
    let user = svc.create(&RoleForm::new(&format!("USER{tag}"), 5)).await.expect("create user");

    let ids: BTreeSet<i64> = [admin, user].into_iter().collect();
    assert_eq!(svc.find_by_roles(&ids).await.expect("level"), 1);

    let dto = svc.find_by_id(admin).await.expect("find");
    assert_eq!(dto.menus.iter().map(|m| m.id).collect::<Vec<_>>(), vec![a]);

    svc.update_menu(admin, &[b].into_iter().collect()).await.expect("update menus");
    let dto = svc.find_by_id(admin).await.expect("find");
    assert_eq!(dto.menus.iter().map(|m| m.id).collect::<Vec<_>>(), vec![b]);

    let criteria = RoleQueryCriteria { blurry: Some(tag.clone()), ..Default::default() };
    assert_eq!(svc.query_all_by(&criteria).await.expect("query").len(), 2);

    let err = svc.create(&RoleForm::new(&format!("USER{tag}"), 2)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let person = insert_user(&pool, &format!("pg{tag}")).await;
    sqlx::query("INSERT INTO users_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(person)
        .bind(user)
        .execute(&pool)
        .await
        .expect("assign");
    let authorities = svc.authorities_for_user(person).await.expect("authorities");
    assert!(authorities.is_empty());

    let err = svc.delete(&ids).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(svc.find_by_id(admin).await.is_ok());

    sqlx::query("DELETE FROM users WHERE id = $1").bind(person).execute(&pool).await.expect("cleanup user");
    assert_eq!(svc.delete(&ids).await.expect("delete"), 2);
    assert_eq!(svc.untied_menu(b).await.expect("untie"), 0);

    sqlx::query("DELETE FROM menus WHERE id = ANY($1)")
        .bind(vec![a, b])
        .execute(&pool)
        .await
        .expect("cleanup menus");
}

#[tokio::test]
async fn test_pg_dict_details_by_name() {
    let Some(pool) = common::pg_pool().await else {
        return;
    };
    let repo = PgDictDetailRepository::new(pool.clone());
    let tag = suffix();
    let dict = format!("status{tag}");
    let other = format!("status{tag}_x");

    repo.create(&DictDetailForm { dict_sort: 2, ..DictDetailForm::new(&dict, "Off", "0") }).await.expect("create");
    repo.create(&DictDetailForm { dict_sort: 1, ..DictDetailForm::new(&dict, "On", "1") }).await.expect("create");
    repo.create(&DictDetailForm::new(&other, "Other", "x")).await.expect("create");

    let details = repo.find_by_dict_name(&dict).await.expect("find");
    assert_eq!(details.iter().map(|d| d.label.as_str()).collect::<Vec<_>>(), vec!["On", "Off"]);

    sqlx::query("DELETE FROM dicts WHERE name = ANY($1)")
        .bind(vec![dict, other])
        .execute(&pool)
        .await
        .expect("cleanup");
}
