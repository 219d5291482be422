use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    api::error_response,
    models::{
        Application, ApplicationStatus, MeetingSchedule, MeetingStatus, NewEvaluationNote, NewMeeting,
        NewNotification, NotificationType, UserInfo,
    },
    services::{
        application_service::{self, StatusCount},
        auth_service::Claims,
        meeting_service, notification_service, user_service,
    },
    storage::Storage,
    utils::AppError,
};

// ==================== REQUEST/RESPONSE MODELS ====================

#[derive(Debug, Deserialize)]
pub struct ApplicationsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApplicationsResponse {
    pub success: bool,
    pub applications: Vec<Application>,
    pub count: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub total: usize,
    pub by_status: Vec<StatusCount>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddNoteRequest {
    pub note: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMeetingRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    pub time: String,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default)]
    pub agenda: String,
    /// Generated when omitted
    #[serde(default)]
    pub meet_link: Option<String>,
}

fn default_duration() -> String {
    "30".to_string()
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMeetingResponse {
    pub success: bool,
    pub meeting: MeetingSchedule,
    pub calendar_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingsQuery {
    pub application_id: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateMeetingStatusRequest {
    pub status: MeetingStatus,
}

fn application_body(application: Application) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "application": application
    }))
}

// ==================== APPLICATIONS ====================

/// GET /api/v1/admin/applications?status=Shortlisted
#[utoipa::path(
    get,
    path = "/api/v1/admin/applications",
    tag = "Admin",
    params(("status" = Option<String>, Query, description = "Filter by status, e.g. `Under Review`")),
    responses(
        (status = 200, description = "Applications in submission order", body = ApplicationsResponse),
        (status = 400, description = "Unknown status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_applications(
    storage: web::Data<Storage>,
    query: web::Query<ApplicationsQuery>,
) -> HttpResponse {
    let result = match query.status.as_deref() {
        None | Some("All") | Some("") => application_service::list_applications(&storage).await,
        Some(raw) => match raw.parse::<ApplicationStatus>() {
            Ok(status) => application_service::list_by_status(&storage, status).await,
            Err(e) => return error_response(&AppError::InvalidRequest(e)),
        },
    };

    match result {
        Ok(applications) => HttpResponse::Ok().json(ApplicationsResponse {
            success: true,
            count: applications.len(),
            applications,
        }),
        Err(e) => {
            log::error!("❌ Error listing applications: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/applications/stats",
    tag = "Admin",
    responses((status = 200, description = "Counters per status", body = StatsResponse)),
    security(("bearer_auth" = []))
)]
pub async fn application_stats(storage: web::Data<Storage>) -> HttpResponse {
    match application_service::status_counts(&storage).await {
        Ok(by_status) => HttpResponse::Ok().json(StatsResponse {
            success: true,
            total: by_status.iter().map(|c| c.count).sum(),
            by_status,
        }),
        Err(e) => error_response(&e),
    }
}

/// PATCH /api/v1/admin/applications/{id}/status
///
/// Also leaves a `status_update` notification for the student when the status changed.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/applications/{id}/status",
    tag = "Admin",
    params(("id" = String, Path, description = "Application id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Unknown application"),
        (status = 409, description = "Transition refused by the configured policy")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_status(
    claims: web::ReqData<Claims>,
    storage: web::Data<Storage>,
    id: web::Path<String>,
    request: web::Json<UpdateStatusRequest>,
) -> HttpResponse {
    log::info!("🔧 PATCH /admin/applications/{}/status -> {} by {}", id, request.status, claims.sub);

    let previous = match application_service::find_by_id(&storage, &id).await {
        Ok(Some(application)) => application.status,
        Ok(None) => return error_response(&AppError::NotFound(format!("application {}", id))),
        Err(e) => return error_response(&e),
    };

    let application = match application_service::set_status(&storage, &id, request.status).await {
        Ok(Some(application)) => application,
        Ok(None) => return error_response(&AppError::NotFound(format!("application {}", id))),
        Err(e) => return error_response(&e),
    };

    // Re-saving the same status is not news for the student
    if previous == application.status {
        return application_body(application);
    }

    let notice = NewNotification {
        student_id: application.student_id.clone(),
        notification_type: NotificationType::StatusUpdate,
        title: if application.status.is_conventionally_terminal() {
            "Decision on your application".to_string()
        } else {
            "Application status updated".to_string()
        },
        message: format!(
            "Your application for {} is now \"{}\".",
            application.startup_name, application.status
        ),
        application_id: Some(application.id.clone()),
        meeting_id: None,
    };
    if let Err(e) = notification_service::create_notification(&storage, notice).await {
        log::error!("❌ Status updated but notification failed: {}", e);
    }

    application_body(application)
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/applications/{id}/notes",
    tag = "Admin",
    params(("id" = String, Path, description = "Application id")),
    request_body = AddNoteRequest,
    responses(
        (status = 200, description = "Note appended"),
        (status = 400, description = "Empty note"),
        (status = 404, description = "Unknown application")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_note(
    claims: web::ReqData<Claims>,
    storage: web::Data<Storage>,
    id: web::Path<String>,
    request: web::Json<AddNoteRequest>,
) -> HttpResponse {
    let text = request.into_inner().note;
    if text.trim().is_empty() {
        return error_response(&AppError::InvalidRequest("Note cannot be empty".to_string()));
    }

    let note = NewEvaluationNote {
        admin_id: claims.sub.clone(),
        admin_name: claims.name.clone(),
        note: text,
    };

    match application_service::append_note(&storage, &id, note).await {
        Ok(Some(application)) => application_body(application),
        Ok(None) => error_response(&AppError::NotFound(format!("application {}", id))),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/applications/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown application")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_application(storage: web::Data<Storage>, id: web::Path<String>) -> HttpResponse {
    log::info!("🗑️  DELETE /admin/applications/{}", id);

    match application_service::delete_application(&storage, &id).await {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Ok(false) => error_response(&AppError::NotFound(format!("application {}", id))),
        Err(e) => error_response(&e),
    }
}

// ==================== MEETINGS ====================

/// POST /api/v1/admin/applications/{id}/meetings
#[utoipa::path(
    post,
    path = "/api/v1/admin/applications/{id}/meetings",
    tag = "Admin",
    params(("id" = String, Path, description = "Application id")),
    request_body = ScheduleMeetingRequest,
    responses(
        (status = 201, description = "Meeting scheduled", body = ScheduleMeetingResponse),
        (status = 400, description = "Missing title, date or time"),
        (status = 404, description = "Unknown application")
    ),
    security(("bearer_auth" = []))
)]
pub async fn schedule_meeting(
    claims: web::ReqData<Claims>,
    storage: web::Data<Storage>,
    id: web::Path<String>,
    request: web::Json<ScheduleMeetingRequest>,
) -> HttpResponse {
    let request = request.into_inner();

    if request.title.trim().is_empty() || request.date.trim().is_empty() || request.time.trim().is_empty() {
        return error_response(&AppError::InvalidRequest(
            "Please fill in all required fields".to_string(),
        ));
    }
    if let Err(e) = meeting_service::validate_slot(&request.date, &request.time, &request.duration) {
        return error_response(&e);
    }

    let application = match application_service::find_by_id(&storage, &id).await {
        Ok(Some(application)) => application,
        Ok(None) => return error_response(&AppError::NotFound(format!("application {}", id))),
        Err(e) => return error_response(&e),
    };

    let new_meeting = NewMeeting {
        application_id: application.id.clone(),
        student_id: application.student_id.clone(),
        student_name: application.student_name.clone(),
        startup_name: application.startup_name.clone(),
        title: request.title,
        description: request.description,
        date: request.date,
        time: request.time,
        duration: request.duration,
        agenda: request.agenda,
        meet_link: request
            .meet_link
            .filter(|link| !link.trim().is_empty())
            .unwrap_or_else(meeting_service::generate_meet_link),
        admin_id: claims.sub.clone(),
        admin_name: claims.name.clone(),
    };

    let meeting = match meeting_service::create_meeting(&storage, new_meeting).await {
        Ok(meeting) => meeting,
        Err(e) => {
            log::error!("❌ Failed to schedule meeting: {}", e);
            return error_response(&e);
        }
    };

    let notice = NewNotification {
        student_id: meeting.student_id.clone(),
        notification_type: NotificationType::MeetingScheduled,
        title: format!("Meeting scheduled: {}", meeting.title),
        message: format!(
            "{} scheduled a meeting on {} at {} ({} min). Join: {}",
            meeting.admin_name, meeting.date, meeting.time, meeting.duration, meeting.meet_link
        ),
        application_id: Some(meeting.application_id.clone()),
        meeting_id: Some(meeting.id.clone()),
    };
    if let Err(e) = notification_service::create_notification(&storage, notice).await {
        log::error!("❌ Meeting scheduled but notification failed: {}", e);
    }

    match meeting_service::calendar_invite_url(&meeting) {
        Ok(calendar_url) => HttpResponse::Created().json(ScheduleMeetingResponse {
            success: true,
            meeting,
            calendar_url,
        }),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/meetings",
    tag = "Admin",
    params(("applicationId" = Option<String>, Query, description = "Only meetings of this application")),
    responses((status = 200, description = "Meetings in creation order")),
    security(("bearer_auth" = []))
)]
pub async fn list_meetings(storage: web::Data<Storage>, query: web::Query<MeetingsQuery>) -> HttpResponse {
    let result = match query.application_id.as_deref() {
        Some(application_id) => meeting_service::list_by_application(&storage, application_id).await,
        None => meeting_service::list_meetings(&storage).await,
    };

    match result {
        Ok(meetings) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": meetings.len(),
            "meetings": meetings
        })),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/meetings/{id}/status",
    tag = "Admin",
    params(("id" = String, Path, description = "Meeting id")),
    request_body = UpdateMeetingStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Unknown meeting")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_meeting_status(
    storage: web::Data<Storage>,
    id: web::Path<String>,
    request: web::Json<UpdateMeetingStatusRequest>,
) -> HttpResponse {
    match meeting_service::set_status(&storage, &id, request.status).await {
        Ok(Some(meeting)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "meeting": meeting
        })),
        Ok(None) => error_response(&AppError::NotFound(format!("meeting {}", id))),
        Err(e) => error_response(&e),
    }
}

// ==================== USERS & MAINTENANCE ====================

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    responses((status = 200, description = "Registered accounts without passwords")),
    security(("bearer_auth" = []))
)]
pub async fn list_users(storage: web::Data<Storage>) -> HttpResponse {
    match user_service::list_users(&storage).await {
        Ok(users) => {
            let users: Vec<UserInfo> = users.into_iter().map(UserInfo::from).collect();
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "count": users.len(),
                "users": users
            }))
        }
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/admin/reset - wipes users and applications, re-seeds default accounts
#[utoipa::path(
    post,
    path = "/api/v1/admin/reset",
    tag = "Admin",
    responses((status = 200, description = "Data cleared and default accounts re-seeded")),
    security(("bearer_auth" = []))
)]
pub async fn reset_all(claims: web::ReqData<Claims>, storage: web::Data<Storage>) -> HttpResponse {
    log::warn!("🧹 POST /admin/reset by {}", claims.sub);

    match application_service::clear_all(&storage).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => {
            log::error!("❌ Reset failed: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/reconcile",
    tag = "Admin",
    responses((status = 200, description = "Orphaned applications reassigned by student name")),
    security(("bearer_auth" = []))
)]
pub async fn reconcile(storage: web::Data<Storage>) -> HttpResponse {
    match application_service::reconcile_orphaned_applications(&storage).await {
        Ok(repaired) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "repaired": repaired
        })),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;
    use crate::models::{BusinessDetails, NewApplication};
    use crate::seeds::accounts_seed;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    async fn admin_token(storage: &Storage) -> String {
        accounts_seed::initialize(storage).await.unwrap();
        let admin = user_service::find_by_id(storage, accounts_seed::ADMIN_ID).await.unwrap().unwrap();
        let token = crate::services::auth_service::generate_token(&admin, &AuthSettings::default()).unwrap();
        format!("Bearer {}", token)
    }

    macro_rules! admin_app {
        ($storage:expr) => {{
            let auth = admin_token(&$storage).await;
            let app = test::init_service(
                App::new()
                    .app_data(web::Data::new($storage.clone()))
                    .app_data(web::Data::new(AuthSettings::default()))
                    .configure(crate::api::configure),
            )
            .await;
            (app, auth)
        }};
    }

    async fn submitted(storage: &Storage, student_id: &str, name: &str) -> Application {
        application_service::create_application(
            storage,
            NewApplication {
                student_id: student_id.into(),
                student_name: name.into(),
                startup_name: format!("{} Co", name),
                description: "d".into(),
                sector: "s".into(),
                problem_solved: "p".into(),
                target_market: "t".into(),
                pitch_deck_filename: "deck.pdf".into(),
                business: BusinessDetails::default(),
            },
        )
        .await
        .unwrap()
    }

    #[actix_web::test]
    async fn test_filter_by_status_and_reject_unknown() {
        let storage = Storage::in_memory();
        let (app, auth) = admin_app!(storage);
        let a = submitted(&storage, "S1", "Alice").await;
        submitted(&storage, "S2", "Bob").await;
        application_service::set_status(&storage, &a.id, ApplicationStatus::UnderReview)
            .await
            .unwrap();

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/applications?status=Under%20Review")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["applications"][0]["id"], a.id.as_str());

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/applications?status=Pending")
            .insert_header(("Authorization", auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_same_status_resave_does_not_notify() {
        let storage = Storage::in_memory();
        let (app, auth) = admin_app!(storage);
        let a = submitted(&storage, "S1", "Alice").await;

        for status in ["Under Review", "Under Review"] {
            let req = test::TestRequest::patch()
                .uri(&format!("/api/v1/admin/applications/{}/status", a.id))
                .insert_header(("Authorization", auth.clone()))
                .set_json(json!({ "status": status }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["application"]["status"], "Under Review");
        }

        let notices = notification_service::list_by_student(&storage, "S1").await.unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].notification_type, NotificationType::StatusUpdate);
    }

    #[actix_web::test]
    async fn test_note_carries_admin_identity() {
        let storage = Storage::in_memory();
        let (app, auth) = admin_app!(storage);
        let a = submitted(&storage, "S1", "Alice").await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/admin/applications/{}/notes", a.id))
            .insert_header(("Authorization", auth))
            .set_json(json!({ "note": "Strong team" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["application"]["notes"][0]["adminId"], accounts_seed::ADMIN_ID);
        assert_eq!(body["application"]["notes"][0]["note"], "Strong team");
    }

    #[actix_web::test]
    async fn test_delete_then_delete_again() {
        let storage = Storage::in_memory();
        let (app, auth) = admin_app!(storage);
        let a = submitted(&storage, "S1", "Alice").await;

        let uri = format!("/api/v1/admin/applications/{}", a.id);
        let req = test::TestRequest::delete().uri(&uri).insert_header(("Authorization", auth.clone())).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete().uri(&uri).insert_header(("Authorization", auth)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_schedule_meeting_requires_fields() {
        let storage = Storage::in_memory();
        let (app, auth) = admin_app!(storage);
        let a = submitted(&storage, "S1", "Alice").await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/admin/applications/{}/meetings", a.id))
            .insert_header(("Authorization", auth))
            .set_json(json!({ "title": "", "date": "2024-06-03", "time": "10:00" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
        assert!(meeting_service::list_meetings(&storage).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_reset_restores_seed_accounts() {
        let storage = Storage::in_memory();
        let (app, auth) = admin_app!(storage);
        submitted(&storage, "S1", "Alice").await;

        let req = test::TestRequest::post()
            .uri("/api/v1/admin/reset")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/users")
            .insert_header(("Authorization", auth))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 2);
        assert!(body["users"][0].get("password").is_none());
        assert!(application_service::list_applications(&storage).await.unwrap().is_empty());
    }
}
