use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::{
    api::error_response,
    config::AuthSettings,
    models::UserRole,
    services::auth_service::{self, Claims},
    utils::AppError,
};

/// Bearer-token gate for a scope. Verified `Claims` are inserted into the request
/// extensions for handlers (`web::ReqData<Claims>`).
///
/// 401 when the token is missing or invalid, 403 when the role does not match.
#[derive(Clone, Copy)]
pub struct AuthMiddleware {
    required_role: Option<UserRole>,
}

impl AuthMiddleware {
    /// Any signed-in user
    pub fn authenticated() -> Self {
        Self { required_role: None }
    }

    pub fn require(role: UserRole) -> Self {
        Self {
            required_role: Some(role),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            required_role: self.required_role,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    required_role: Option<UserRole>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authorize(&req, self.required_role) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(e) => {
                log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                let response = error_response(&e);
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

fn authorize(req: &ServiceRequest, required_role: Option<UserRole>) -> Result<Claims, AppError> {
    let settings = req
        .app_data::<web::Data<AuthSettings>>()
        .ok_or_else(|| AppError::Unauthorized("Authentication is not configured".to_string()))?;

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

    let claims = auth_service::verify_token(token, settings)?;

    if let Some(role) = required_role {
        if claims.role != role {
            return Err(AppError::Forbidden(format!("Requires {} role", role)));
        }
    }

    Ok(claims)
}
