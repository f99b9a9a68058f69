use actix_web::{web, HttpResponse};
use std::collections::BTreeSet;

use crate::errors::AppError;
use crate::models::role::RoleForm;
use crate::services::RoleService;

/// GET /api/roles/{id}
pub async fn read(
    svc: web::Data<RoleService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let role = svc.find_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(role))
}

/// POST /api/roles
pub async fn create(
    svc: web::Data<RoleService>,
    body: web::Json<RoleForm>,
) -> Result<HttpResponse, AppError> {
    let id = svc.create(&body).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "id": id })))
}

/// PUT /api/roles/{id} - name, level, description and data scope only
pub async fn update(
    svc: web::Data<RoleService>,
    path: web::Path<i64>,
    body: web::Json<RoleForm>,
) -> Result<HttpResponse, AppError> {
    svc.update(path.into_inner(), &body).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/roles - body is a JSON array of role ids
pub async fn delete(
    svc: web::Data<RoleService>,
    body: web::Json<BTreeSet<i64>>,
) -> Result<HttpResponse, AppError> {
    let deleted = svc.delete(&body).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "deleted": deleted })))
}
