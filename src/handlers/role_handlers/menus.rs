use actix_web::{web, HttpResponse};
use std::collections::BTreeSet;

use super::helpers::{IdsQuery, parse_ids};
use crate::errors::AppError;
use crate::models::role::RoleSmallDto;
use crate::services::RoleService;

/// PUT /api/roles/{id}/menus - body is the complete JSON array of menu ids
pub async fn update_menus(
    svc: web::Data<RoleService>,
    path: web::Path<i64>,
    body: web::Json<BTreeSet<i64>>,
) -> Result<HttpResponse, AppError> {
    svc.update_menu(path.into_inner(), &body).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/menus/{id}/roles - called before a menu is removed
pub async fn untie(
    svc: web::Data<RoleService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let untied = svc.untied_menu(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "untied": untied })))
}

/// GET /api/menus/roles?ids=1,2
pub async fn roles_for_menus(
    svc: web::Data<RoleService>,
    query: web::Query<IdsQuery>,
) -> Result<HttpResponse, AppError> {
    let ids: Vec<i64> = parse_ids(&query.ids)?.into_iter().collect();
    let roles: Vec<RoleSmallDto> = svc
        .find_in_menu_id(&ids)
        .await?
        .into_iter()
        .map(RoleSmallDto::from)
        .collect();
    Ok(HttpResponse::Ok().json(roles))
}
