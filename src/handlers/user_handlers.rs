use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::services::RoleService;

/// GET /api/users/{id}/roles
pub async fn roles(
    svc: web::Data<RoleService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let roles = svc.find_by_users_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(roles))
}

/// GET /api/users/{id}/authorities
pub async fn authorities(
    svc: web::Data<RoleService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let authorities = svc.authorities_for_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(authorities))
}
