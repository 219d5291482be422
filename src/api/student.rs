use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    api::error_response,
    models::{Application, BusinessDetails, MeetingSchedule, NewApplication, StudentNotification},
    services::{
        application_service, auth_service::Claims, meeting_service, notification_service,
    },
    storage::Storage,
    utils::AppError,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub startup_name: String,
    pub description: String,
    pub sector: String,
    pub problem_solved: String,
    pub target_market: String,
    #[serde(rename = "pitchDeck")]
    pub pitch_deck_filename: String,
    #[serde(flatten)]
    pub business: BusinessDetails,
}

impl SubmitApplicationRequest {
    fn validate(&self) -> Result<(), AppError> {
        let required = [
            &self.startup_name,
            &self.description,
            &self.sector,
            &self.problem_solved,
            &self.target_market,
            &self.pitch_deck_filename,
        ];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(AppError::InvalidRequest(
                "Please fill all required fields and upload a pitch deck.".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApplicationResponse {
    pub success: bool,
    pub application: Option<Application>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MeetingsResponse {
    pub success: bool,
    pub meetings: Vec<MeetingSchedule>,
    pub count: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NotificationsResponse {
    pub success: bool,
    pub notifications: Vec<StudentNotification>,
    pub unread: usize,
}

/// GET /api/v1/student/application
///
/// Uses the reconciling lookup, so an application filed under an older id of this
/// student is reassigned to the current one.
#[utoipa::path(
    get,
    path = "/api/v1/student/application",
    tag = "Student",
    responses(
        (status = 200, description = "The student's application, or null", body = ApplicationResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_application(claims: web::ReqData<Claims>, storage: web::Data<Storage>) -> HttpResponse {
    match application_service::reconcile_and_find(&storage, &claims.sub, &claims.name).await {
        Ok(application) => HttpResponse::Ok().json(ApplicationResponse {
            success: true,
            application,
        }),
        Err(e) => {
            log::error!("❌ Error loading application for {}: {}", claims.sub, e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/student/application",
    tag = "Student",
    request_body = SubmitApplicationRequest,
    responses(
        (status = 201, description = "Application submitted", body = ApplicationResponse),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "An application was already submitted")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_application(
    claims: web::ReqData<Claims>,
    storage: web::Data<Storage>,
    request: web::Json<SubmitApplicationRequest>,
) -> HttpResponse {
    log::info!("📝 POST /student/application - {} ({})", claims.name, claims.sub);

    let request = request.into_inner();
    if let Err(e) = request.validate() {
        return error_response(&e);
    }

    match application_service::reconcile_and_find(&storage, &claims.sub, &claims.name).await {
        Ok(Some(existing)) => {
            log::warn!("⚠️ Student {} already has application {}", claims.sub, existing.id);
            return HttpResponse::Conflict().json(serde_json::json!({
                "success": false,
                "error": "An application has already been submitted"
            }));
        }
        Ok(None) => {}
        Err(e) => return error_response(&e),
    }

    let new_application = NewApplication {
        student_id: claims.sub.clone(),
        student_name: claims.name.clone(),
        startup_name: request.startup_name,
        description: request.description,
        sector: request.sector,
        problem_solved: request.problem_solved,
        target_market: request.target_market,
        pitch_deck_filename: request.pitch_deck_filename,
        business: request.business,
    };

    match application_service::create_application(&storage, new_application).await {
        Ok(application) => HttpResponse::Created().json(ApplicationResponse {
            success: true,
            application: Some(application),
        }),
        Err(e) => {
            log::error!("❌ Failed to submit application: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/student/meetings",
    tag = "Student",
    responses((status = 200, description = "Meetings scheduled with the student", body = MeetingsResponse)),
    security(("bearer_auth" = []))
)]
pub async fn list_my_meetings(claims: web::ReqData<Claims>, storage: web::Data<Storage>) -> HttpResponse {
    match meeting_service::list_by_student(&storage, &claims.sub).await {
        Ok(meetings) => HttpResponse::Ok().json(MeetingsResponse {
            success: true,
            count: meetings.len(),
            meetings,
        }),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/student/notifications",
    tag = "Student",
    responses((status = 200, description = "The student's notifications", body = NotificationsResponse)),
    security(("bearer_auth" = []))
)]
pub async fn list_my_notifications(claims: web::ReqData<Claims>, storage: web::Data<Storage>) -> HttpResponse {
    let notifications = match notification_service::list_by_student(&storage, &claims.sub).await {
        Ok(notifications) => notifications,
        Err(e) => return error_response(&e),
    };
    match notification_service::unread_count_for_student(&storage, &claims.sub).await {
        Ok(unread) => HttpResponse::Ok().json(NotificationsResponse {
            success: true,
            notifications,
            unread,
        }),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/student/notifications/{id}/read
#[utoipa::path(
    post,
    path = "/api/v1/student/notifications/{id}/read",
    tag = "Student",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification flagged as read"),
        (status = 404, description = "Unknown notification, or owned by another student")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read(
    claims: web::ReqData<Claims>,
    storage: web::Data<Storage>,
    id: web::Path<String>,
) -> HttpResponse {
    // Students may only touch their own notifications
    let owned = match notification_service::list_by_student(&storage, &claims.sub).await {
        Ok(list) => list.iter().any(|n| n.id == *id),
        Err(e) => return error_response(&e),
    };
    if !owned {
        return error_response(&AppError::NotFound(format!("notification {}", id)));
    }

    match notification_service::mark_read(&storage, &id).await {
        Ok(Some(notification)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "notification": notification
        })),
        Ok(None) => error_response(&AppError::NotFound(format!("notification {}", id))),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/student/notifications/read-all",
    tag = "Student",
    responses((status = 200, description = "Number of notifications that changed, as `updated`")),
    security(("bearer_auth" = []))
)]
pub async fn mark_all_notifications_read(claims: web::ReqData<Claims>, storage: web::Data<Storage>) -> HttpResponse {
    match notification_service::mark_all_read_for_student(&storage, &claims.sub).await {
        Ok(updated) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "updated": updated
        })),
        Err(e) => error_response(&e),
    }
}
