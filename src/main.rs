use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};

use rolekeeper::config::AppConfig;
use rolekeeper::db;
use rolekeeper::errors::AppError;
use rolekeeper::handlers;
use rolekeeper::models::dict_detail::PgDictDetailRepository;
use rolekeeper::models::role::PgRoleRepository;
use rolekeeper::models::user::PgUserRepository;
use rolekeeper::repository::DictDetailRepository;
use rolekeeper::repository::memory::MemoryStore;
use rolekeeper::services::RoleService;

/// Pick the store: PostgreSQL when `DATABASE_URL` is set, otherwise in-memory.
async fn build_backends(config: &AppConfig) -> Result<(RoleService, Arc<dyn DictDetailRepository>), AppError> {
    match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config).await?;
            db::run_migrations(&pool).await?;
            if config.seed_demo_data {
                db::seed_demo(&pool).await?;
            }
            let roles = Arc::new(PgRoleRepository::new(pool.clone()));
            let users = Arc::new(PgUserRepository::new(pool.clone()));
            let dict_details: Arc<dyn DictDetailRepository> = Arc::new(PgDictDetailRepository::new(pool));
            Ok((RoleService::new(roles, users), dict_details))
        }
        None => {
            log::warn!("DATABASE_URL not set, using the in-memory store (data is lost on exit)");
            let store = if config.seed_demo_data {
                Arc::new(MemoryStore::with_demo_data().await?)
            } else {
                Arc::new(MemoryStore::new())
            };
            let dict_details: Arc<dyn DictDetailRepository> = store.clone();
            Ok((RoleService::new(store.clone(), store), dict_details))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let config = AppConfig::from_env();

    let (role_service, dict_details) = build_backends(&config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let role_service = web::Data::new(role_service);
    let dict_details = web::Data::from(dict_details);

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(role_service.clone())
            .app_data(dict_details.clone())
            .service(web::scope("/api").configure(handlers::configure))
            .default_service(web::to(|| async {
                actix_web::HttpResponse::NotFound()
                    .json(serde_json::json!({ "error": "Not found" }))
            }))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
