use actix_web::{web, HttpResponse};

use crate::{
    api::error_response,
    config::AuthSettings,
    models::UserInfo,
    services::{auth_service, user_service},
    storage::Storage,
    utils::AppError,
};
use crate::services::auth_service::{AuthResponse, Claims, LoginRequest, RegisterRequest};

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    storage: web::Data<Storage>,
    settings: web::Data<AuthSettings>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    match auth_service::login(&storage, &settings, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {} ({})", request.email, response.user.role);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    storage: web::Data<Storage>,
    settings: web::Data<AuthSettings>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    let email = request.email.clone();
    log::info!("📝 POST /auth/register - email: {}", email);

    match auth_service::register(&storage, &settings, request.into_inner()).await {
        Ok(response) => {
            log::info!("✅ Registration successful: {}", email);
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", email, e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(claims: web::ReqData<Claims>, storage: web::Data<Storage>) -> HttpResponse {
    match user_service::find_by_id(&storage, &claims.sub).await {
        Ok(Some(user)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": UserInfo::from(user)
        })),
        Ok(None) => error_response(&AppError::NotFound(format!("user {}", claims.sub))),
        Err(e) => {
            log::error!("❌ Error loading user {}: {}", claims.sub, e);
            error_response(&e)
        }
    }
}
