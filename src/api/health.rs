use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::storage::Storage;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub storage: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(storage: web::Data<Storage>) -> impl Responder {
    let status = if storage.is_available() { "healthy" } else { "degraded" };
    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        service: "funding-review-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: storage.backend_name().to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
