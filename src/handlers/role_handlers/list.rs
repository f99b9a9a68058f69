use actix_web::{web, HttpResponse};

use super::helpers::{IdsQuery, parse_ids};
use crate::errors::AppError;
use crate::models::page::{PageParams, Pageable};
use crate::models::role::RoleQueryCriteria;
use crate::services::RoleService;

/// GET /api/roles - criteria and page params share the query string
/// (`?blurry=ops&page=2&size=10&sort=name&dir=desc`)
pub async fn page(
    svc: web::Data<RoleService>,
    criteria: web::Query<RoleQueryCriteria>,
    params: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    let pageable = Pageable::from(&*params);
    let page = svc.query_page(&criteria, &pageable).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/roles/all
pub async fn all(svc: web::Data<RoleService>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(svc.query_all().await?))
}

/// GET /api/roles/export - every role matching the criteria, as CSV
pub async fn export(
    svc: web::Data<RoleService>,
    criteria: web::Query<RoleQueryCriteria>,
) -> Result<HttpResponse, AppError> {
    let roles = svc.query_all_by(&criteria).await?;
    let mut buf = Vec::new();
    svc.download(&roles, &mut buf)?;

    log::info!("Exported {} role(s) as CSV", roles.len());
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(("Content-Disposition", "attachment; filename=\"roles.csv\""))
        .body(buf))
}

/// GET /api/roles/level?ids=1,2
pub async fn level(
    svc: web::Data<RoleService>,
    query: web::Query<IdsQuery>,
) -> Result<HttpResponse, AppError> {
    let ids = parse_ids(&query.ids)?;
    let level = svc.find_by_roles(&ids).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "level": level })))
}
