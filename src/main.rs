mod api;
mod config;
mod database;
mod middleware;
mod models;
mod seeds;
mod services;
mod storage;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, StorageBackendKind};
use crate::storage::{FileBackend, KeyValueBackend, MemoryBackend, MongoBackend, Storage};

async fn build_backend(kind: &StorageBackendKind) -> Result<Arc<dyn KeyValueBackend>, String> {
    match kind {
        StorageBackendKind::Memory => {
            log::warn!("⚠️  Using in-memory storage, data is lost on restart");
            Ok(Arc::new(MemoryBackend::new()))
        }
        StorageBackendKind::File(path) => {
            let backend = FileBackend::new(path.clone()).map_err(|e| e.to_string())?;
            Ok(Arc::new(backend))
        }
        StorageBackendKind::MongoDb(url) => {
            let db = database::MongoDB::new(url)
                .await
                .map_err(|e| format!("Failed to connect to MongoDB: {}", e))?;
            match db.health_check().await {
                Ok(_) => log::info!("✅ MongoDB connected successfully"),
                Err(e) => log::warn!("⚠️  MongoDB ping failed: {}", e),
            }
            Ok(Arc::new(MongoBackend::new(&db)))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Starting Funding Review Service...");

    // Without a backend the service still starts: reads come back empty, writes fail with 503
    let storage = match build_backend(&config.backend).await {
        Ok(backend) => Storage::new(backend, config.policy.clone()),
        Err(e) => {
            log::error!("❌ {}", e);
            Storage::detached()
        }
    };
    log::info!("💾 Storage backend: {}", storage.backend_name());

    // 🌱 Seed default accounts
    if let Err(e) = seeds::accounts_seed::initialize(&storage).await {
        log::error!("❌ Failed to seed default accounts: {}", e);
    }

    if config.reconcile_on_start {
        match services::application_service::reconcile_orphaned_applications(&storage).await {
            Ok(repaired) => log::info!("🔗 Reconciled {} orphaned application(s)", repaired),
            Err(e) => log::error!("❌ Reconciliation failed: {}", e),
        }
    }

    let storage_data = web::Data::new(storage);
    let auth_data = web::Data::new(config.auth.clone());
    let cors_origins = config.cors_origins.clone();

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", config.host, config.port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(storage_data.clone())
            .app_data(auth_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
