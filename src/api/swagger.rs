use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Funding Review Service API",
        version = "1.0.0",
        description = "Startup funding applications: student submission, admin review pipeline, evaluation notes, meetings and student notifications.\n\n**Authentication:** everything under `/api/v1/student` and `/api/v1/admin` requires a JWT Bearer token with the matching role."
    ),
    paths(
        // Auth endpoints
        crate::api::auth::login,
        crate::api::auth::register,
        crate::api::auth::get_me,

        // Health
        crate::api::health::health_check,

        // Student dashboard
        crate::api::student::get_my_application,
        crate::api::student::submit_application,
        crate::api::student::list_my_meetings,
        crate::api::student::list_my_notifications,
        crate::api::student::mark_notification_read,
        crate::api::student::mark_all_notifications_read,

        // Admin dashboard
        crate::api::admin::list_applications,
        crate::api::admin::application_stats,
        crate::api::admin::update_status,
        crate::api::admin::add_note,
        crate::api::admin::delete_application,
        crate::api::admin::schedule_meeting,
        crate::api::admin::list_meetings,
        crate::api::admin::update_meeting_status,
        crate::api::admin::list_users,
        crate::api::admin::reset_all,
        crate::api::admin::reconcile,
    ),
    components(
        schemas(
            // Auth
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::AuthResponse,
            crate::models::UserInfo,
            crate::models::UserRole,

            // Health
            crate::api::health::HealthResponse,

            // Records
            crate::models::Application,
            crate::models::ApplicationStatus,
            crate::models::BusinessDetails,
            crate::models::EvaluationNote,
            crate::models::MeetingSchedule,
            crate::models::MeetingStatus,
            crate::models::StudentNotification,
            crate::models::NotificationType,

            // Student
            crate::api::student::SubmitApplicationRequest,
            crate::api::student::ApplicationResponse,
            crate::api::student::MeetingsResponse,
            crate::api::student::NotificationsResponse,

            // Admin
            crate::api::admin::ApplicationsResponse,
            crate::api::admin::StatsResponse,
            crate::services::application_service::StatusCount,
            crate::api::admin::UpdateStatusRequest,
            crate::api::admin::AddNoteRequest,
            crate::api::admin::ScheduleMeetingRequest,
            crate::api::admin::ScheduleMeetingResponse,
            crate::api::admin::UpdateMeetingStatusRequest,
        )
    ),
    tags(
        (name = "Auth", description = "Login, student self-registration and the current user."),
        (name = "Health", description = "Service and storage status."),
        (name = "Student", description = "The signed-in student's application, meetings and notifications."),
        (name = "Admin", description = "Review pipeline: status changes, evaluation notes, meetings and maintenance."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build()
                ),
            );
        }
    }
}
