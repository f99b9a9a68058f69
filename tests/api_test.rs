/// HTTP-level tests for the `/api` routes over the in-memory store.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use rolekeeper::repository::memory::MemoryStore;

#[macro_use]
mod common;

async fn seeded() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_demo_data().await.expect("demo data"))
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_list_roles_paged() {
    let app = init_app!(seeded().await);
    let req = test::TestRequest::get().uri("/api/roles?page=1&size=1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total_elements"], 2);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["content"][0]["name"], "admin");
    assert_eq!(body["content"][0]["data_scope"], "all");
    assert!(body["content"][0]["menus"].as_array().is_some_and(|m| m.len() == 7));
}

#[actix_web::test]
async fn test_list_roles_blurry_filter() {
    let app = init_app!(seeded().await);
    let req = test::TestRequest::get().uri("/api/roles?blurry=Day-to-day").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total_elements"], 1);
    assert_eq!(body["content"][0]["name"], "operator");
}

#[actix_web::test]
async fn test_list_roles_past_the_last_page() {
    let app = init_app!(seeded().await);
    let req = test::TestRequest::get()
        .uri("/api/roles?page=9223372036854775807&size=100")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_elements"], 2);
    assert!(body["content"].as_array().is_some_and(|c| c.is_empty()));
}

#[actix_web::test]
async fn test_create_read_update_role() {
    let app = init_app!(Arc::new(MemoryStore::new()));

    let req = test::TestRequest::post()
        .uri("/api/roles")
        .set_json(json!({ "name": "auditor", "level": 4, "description": "Read only" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().expect("id");

    let req = test::TestRequest::put()
        .uri(&format!("/api/roles/{id}"))
        .set_json(json!({ "name": "auditor", "level": 2, "data_scope": "custom" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&format!("/api/roles/{id}")).to_request();
    let role: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(role["level"], 2);
    assert_eq!(role["data_scope"], "custom");
}

#[actix_web::test]
async fn test_create_invalid_role_is_unprocessable() {
    let app = init_app!(Arc::new(MemoryStore::new()));
    let req = test::TestRequest::post()
        .uri("/api/roles")
        .set_json(json!({ "name": "", "level": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn test_duplicate_role_is_conflict() {
    let app = init_app!(seeded().await);
    let req = test::TestRequest::post()
        .uri("/api/roles")
        .set_json(json!({ "name": "admin", "level": 1 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_mutation_without_json_content_type_is_rejected() {
    let app = init_app!(Arc::new(MemoryStore::new()));
    let req = test::TestRequest::post()
        .uri("/api/roles")
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload("name=auditor&level=3")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let app = init_app!(Arc::new(MemoryStore::new()));
    let req = test::TestRequest::post()
        .uri("/api/roles")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_delete_held_role_is_conflict() {
    let app = init_app!(seeded().await);

    let req = test::TestRequest::get().uri("/api/roles/all").to_request();
    let roles: Value = test::call_and_read_body_json(&app, req).await;
    let admin_id = roles[0]["id"].as_i64().expect("id");

    let req = test::TestRequest::delete()
        .uri("/api/roles")
        .set_json(json!([admin_id]))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_delete_unheld_role() {
    let app = init_app!(Arc::new(MemoryStore::new()));
    let req = test::TestRequest::post()
        .uri("/api/roles")
        .set_json(json!({ "name": "temp" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_i64().expect("id");

    let req = test::TestRequest::delete().uri("/api/roles").set_json(json!([id])).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["deleted"], 1);

    let req = test::TestRequest::get().uri(&format!("/api/roles/{id}")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_level_endpoint() {
    let app = init_app!(Arc::new(MemoryStore::new()));
    let mut ids = vec![];
    for (name, level) in [("ADMIN", 1), ("USER", 5)] {
        let req = test::TestRequest::post()
            .uri("/api/roles")
            .set_json(json!({ "name": name, "level": level }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(created["id"].as_i64().expect("id"));
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/roles/level?ids={},{}", ids[0], ids[1]))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["level"], 1);

    let req = test::TestRequest::get().uri("/api/roles/level?ids=").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get().uri("/api/roles/level?ids=1,abc").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_export_csv() {
    let app = init_app!(seeded().await);
    let req = test::TestRequest::get().uri("/api/roles/export").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").and_then(|v| v.to_str().ok()).unwrap_or("");
    assert!(content_type.starts_with("text/csv"));
    assert!(resp.headers().contains_key("content-disposition"));

    let body = test::read_body(resp).await;
    let csv = String::from_utf8(body.to_vec()).expect("utf8");
    assert_eq!(csv.lines().count(), 3);
}

// ---------------------------------------------------------------------------
// Menus
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_replace_menus_then_untie() {
    let store = Arc::new(MemoryStore::new());
    let a = store.add_menu("A", "a:list").await;
    let b = store.add_menu("B", "b:list").await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/roles")
        .set_json(json!({ "name": "editor", "menus": [a] }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_i64().expect("id");

    let req = test::TestRequest::put()
        .uri(&format!("/api/roles/{id}/menus"))
        .set_json(json!([b]))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&format!("/api/menus/roles?ids={a},{b}")).to_request();
    let roles: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(roles.as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/menus/{b}/roles"))
        .insert_header(("content-type", "application/json"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["untied"], 1);

    let req = test::TestRequest::get().uri(&format!("/api/roles/{id}")).to_request();
    let role: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(role["menus"].as_array().map(Vec::len), Some(0));
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_user_roles_and_authorities() {
    let store = Arc::new(MemoryStore::new());
    let menu = store.add_menu("Dictionaries", "dict:list").await;
    let user = store.add_user("alice", false).await;
    let app = init_app!(store.clone());

    let req = test::TestRequest::post()
        .uri("/api/roles")
        .set_json(json!({ "name": "dicts", "level": 3, "menus": [menu] }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    store.assign_role(user, created["id"].as_i64().expect("id")).await.expect("assign");

    let req = test::TestRequest::get().uri(&format!("/api/users/{user}/roles")).to_request();
    let roles: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(roles[0]["name"], "dicts");

    let req = test::TestRequest::get().uri(&format!("/api/users/{user}/authorities")).to_request();
    let authorities: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(authorities, json!(["dict:list"]));

    let req = test::TestRequest::get().uri("/api/users/999/authorities").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Dictionary details
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_dict_detail_lifecycle() {
    let app = init_app!(Arc::new(MemoryStore::new()));

    let req = test::TestRequest::post()
        .uri("/api/dict-details")
        .set_json(json!({ "dict_name": "job_status", "label": "Open", "value": "open", "dict_sort": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().expect("id");

    let req = test::TestRequest::put()
        .uri(&format!("/api/dict-details/{id}"))
        .set_json(json!({ "dict_name": "job_status", "label": "Opened", "value": "open" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri("/api/dict-details/by-name/job_status").to_request();
    let details: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(details[0]["label"], "Opened");
    assert_eq!(details[0]["dict_sort"], 999);

    let req = test::TestRequest::get().uri("/api/dict-details?dict_name=job_status&label=Open").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total_elements"], 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/dict-details/{id}"))
        .insert_header(("content-type", "application/json"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/dict-details/{id}"))
        .insert_header(("content-type", "application/json"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_dict_detail_validation() {
    let app = init_app!(Arc::new(MemoryStore::new()));
    let req = test::TestRequest::post()
        .uri("/api/dict-details")
        .set_json(json!({ "dict_name": "job_status", "label": " ", "value": "x" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
