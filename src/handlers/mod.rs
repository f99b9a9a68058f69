pub mod dict_detail_handlers;
pub mod role_handlers;
pub mod user_handlers;

use actix_web::{
    web, Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use crate::errors::AppError;

/// Reject POST/PUT/DELETE without `Content-Type: application/json`.
///
/// A cross-origin form post cannot set a JSON content type, so this doubles as
/// the CSRF guard for the API. GET requests pass through.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::DELETE
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "error": "Content-Type must be application/json for mutation requests"
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Configure the API routes. Mount under `/api`.
///
/// Fixed segments (`/roles/all`, `/roles/export`, `/roles/level`) are
/// registered before `/roles/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    );
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    );
    cfg.service(
        web::scope("/roles")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(role_handlers::list::page))
            .route("", web::post().to(role_handlers::crud::create))
            .route("", web::delete().to(role_handlers::crud::delete))
            .route("/all", web::get().to(role_handlers::list::all))
            .route("/export", web::get().to(role_handlers::list::export))
            .route("/level", web::get().to(role_handlers::list::level))
            .route("/{id}", web::get().to(role_handlers::crud::read))
            .route("/{id}", web::put().to(role_handlers::crud::update))
            .route("/{id}/menus", web::put().to(role_handlers::menus::update_menus))
    );
    cfg.service(
        web::scope("/menus")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/roles", web::get().to(role_handlers::menus::roles_for_menus))
            .route("/{id}/roles", web::delete().to(role_handlers::menus::untie))
    );
    cfg.service(
        web::scope("/users")
            .route("/{id}/roles", web::get().to(user_handlers::roles))
            .route("/{id}/authorities", web::get().to(user_handlers::authorities))
    );
    cfg.service(
        web::scope("/dict-details")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(dict_detail_handlers::list))
            .route("", web::post().to(dict_detail_handlers::create))
            .route("/by-name/{name}", web::get().to(dict_detail_handlers::by_dict_name))
            .route("/{id}", web::put().to(dict_detail_handlers::update))
            .route("/{id}", web::delete().to(dict_detail_handlers::delete))
    );
}
