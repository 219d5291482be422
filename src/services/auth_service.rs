use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    config::AuthSettings,
    models::{NewUser, User, UserInfo, UserRole},
    services::user_service,
    storage::Storage,
    utils::AppError,
};

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // user id
    pub email: String,
    pub name: String,          // fullName, used by application reconciliation
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(rename = "collegeIdProof", default)]
    pub college_id_proof_filename: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

pub fn generate_token(user: &User, settings: &AuthSettings) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        name: user.full_name.clone(),
        role: user.role,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(settings.token_ttl_hours)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        aud: settings.jwt_audience.clone(),
        iss: settings.jwt_issuer.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Unauthorized(format!("Failed to generate token: {}", e)))
}

pub fn verify_token(token: &str, settings: &AuthSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[settings.jwt_audience.as_str()]);

    let mut issuers = HashSet::new();
    issuers.insert(settings.jwt_issuer.clone());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

// User login
pub async fn login(
    storage: &Storage,
    settings: &AuthSettings,
    request: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    let user = user_service::login(storage, &request.email, &request.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let token = generate_token(&user, settings)?;
    Ok(AuthResponse {
        success: true,
        token,
        user: user.into(),
    })
}

/// Student self-registration. Checks the email first, then creates the account;
/// the check and the insert are separate reads, so two racing registrations can
/// both succeed unless the store enforces unique emails.
pub async fn register(
    storage: &Storage,
    settings: &AuthSettings,
    request: RegisterRequest,
) -> Result<AuthResponse, AppError> {
    for (field, value) in [
        ("fullName", &request.full_name),
        ("email", &request.email),
        ("password", &request.password),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::InvalidRequest(format!("{} is required", field)));
        }
    }

    if user_service::find_by_email(storage, &request.email).await?.is_some() {
        return Err(AppError::DuplicateEmail(request.email));
    }

    let user = user_service::create_user(
        storage,
        NewUser {
            email: request.email,
            password: Some(request.password),
            role: UserRole::Student,
            full_name: request.full_name,
            college: request.college,
            college_id_proof_filename: request.college_id_proof_filename,
        },
    )
    .await?;

    let token = generate_token(&user, settings)?;
    Ok(AuthResponse {
        success: true,
        token,
        user: user.into(),
    })
}
