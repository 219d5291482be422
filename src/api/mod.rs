pub mod admin;
pub mod auth;
pub mod health;
pub mod student;
pub mod swagger;

use actix_web::{web, HttpResponse};

use crate::{middleware::AuthMiddleware, models::UserRole, utils::AppError};

/// `{"success": false, "error": "..."}` with the status matching the error kind.
pub fn error_response(err: &AppError) -> HttpResponse {
    HttpResponse::build(err.status_code()).json(serde_json::json!({
        "success": false,
        "error": err.to_string()
    }))
}

/// Registers every `/api/v1` route. Expects `web::Data<Storage>` and
/// `web::Data<AuthSettings>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Auth endpoints
        .service(
            web::scope("/api/v1/auth")
                .route("/login", web::post().to(auth::login))
                .route("/register", web::post().to(auth::register))
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware::authenticated())
                        .route(web::get().to(auth::get_me)),
                ),
        )
        // Student dashboard
        .service(
            web::scope("/api/v1/student")
                .wrap(AuthMiddleware::require(UserRole::Student))
                .route("/application", web::get().to(student::get_my_application))
                .route("/application", web::post().to(student::submit_application))
                .route("/meetings", web::get().to(student::list_my_meetings))
                .route("/notifications", web::get().to(student::list_my_notifications))
                .route("/notifications/read-all", web::post().to(student::mark_all_notifications_read))
                .route("/notifications/{id}/read", web::post().to(student::mark_notification_read)),
        )
        // Admin dashboard
        .service(
            web::scope("/api/v1/admin")
                .wrap(AuthMiddleware::require(UserRole::Admin))
                .route("/applications", web::get().to(admin::list_applications))
                .route("/applications/stats", web::get().to(admin::application_stats))
                .route("/applications/{id}/status", web::patch().to(admin::update_status))
                .route("/applications/{id}/notes", web::post().to(admin::add_note))
                .route("/applications/{id}", web::delete().to(admin::delete_application))
                .route("/applications/{id}/meetings", web::post().to(admin::schedule_meeting))
                .route("/meetings", web::get().to(admin::list_meetings))
                .route("/meetings/{id}/status", web::patch().to(admin::update_meeting_status))
                .route("/users", web::get().to(admin::list_users))
                .route("/reset", web::post().to(admin::reset_all))
                .route("/reconcile", web::post().to(admin::reconcile)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;
    use crate::seeds::accounts_seed;
    use crate::storage::Storage;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    async fn seeded_storage() -> Storage {
        let storage = Storage::in_memory();
        accounts_seed::initialize(&storage).await.unwrap();
        storage
    }

    macro_rules! service {
        ($storage:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($storage.clone()))
                    .app_data(web::Data::new(AuthSettings::default()))
                    .configure(configure),
            )
            .await
        };
    }

    macro_rules! token_for {
        ($app:expr, $email:expr, $password:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "email": $email, "password": $password }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&$app, req).await;
            body["token"].as_str().unwrap().to_string()
        }};
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let storage = seeded_storage().await;
        let app = service!(storage);

        let req = test::TestRequest::get().uri("/api/v1/admin/applications").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_student_cannot_reach_admin_pages() {
        let storage = seeded_storage().await;
        let app = service!(storage);
        let token = token_for!(app, accounts_seed::STUDENT_EMAIL, accounts_seed::STUDENT_PASSWORD);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/applications")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_submit_review_schedule_flow() {
        let storage = seeded_storage().await;
        let app = service!(storage);
        let student = token_for!(app, accounts_seed::STUDENT_EMAIL, accounts_seed::STUDENT_PASSWORD);
        let admin = token_for!(app, accounts_seed::ADMIN_EMAIL, accounts_seed::ADMIN_PASSWORD);

        // student submits
        let req = test::TestRequest::post()
            .uri("/api/v1/student/application")
            .insert_header(("Authorization", format!("Bearer {}", student)))
            .set_json(json!({
                "startupName": "Campus Eats",
                "description": "Food delivery for dorms",
                "sector": "FoodTech",
                "problemSolved": "Late-night food",
                "targetMarket": "Students",
                "pitchDeck": "campus-eats.pdf",
                "fundingAmount": "10000"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let app_id = body["application"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["application"]["status"], "Submitted");
        assert_eq!(body["application"]["studentId"], accounts_seed::STUDENT_ID);

        // second submission refused
        let req = test::TestRequest::post()
            .uri("/api/v1/student/application")
            .insert_header(("Authorization", format!("Bearer {}", student)))
            .set_json(json!({
                "startupName": "Again", "description": "d", "sector": "s",
                "problemSolved": "p", "targetMarket": "t", "pitchDeck": "x.pdf"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        // admin shortlists
        let req = test::TestRequest::patch()
            .uri(&format!("/api/v1/admin/applications/{}/status", app_id))
            .insert_header(("Authorization", format!("Bearer {}", admin)))
            .set_json(json!({ "status": "Shortlisted" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["application"]["status"], "Shortlisted");

        // admin schedules a meeting
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/admin/applications/{}/meetings", app_id))
            .insert_header(("Authorization", format!("Bearer {}", admin)))
            .set_json(json!({
                "title": "Intro call",
                "date": "2024-06-03",
                "time": "10:00",
                "duration": "30",
                "agenda": "Team"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["meeting"]["status"], "scheduled");
        assert_eq!(body["meeting"]["adminName"], "HP Admin");
        assert!(body["meeting"]["meetLink"].as_str().unwrap().starts_with("https://meet.google.com/"));

        // student sees meeting and both notifications
        let req = test::TestRequest::get()
            .uri("/api/v1/student/meetings")
            .insert_header(("Authorization", format!("Bearer {}", student)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);

        let req = test::TestRequest::get()
            .uri("/api/v1/student/notifications")
            .insert_header(("Authorization", format!("Bearer {}", student)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["unread"], 2);

        let req = test::TestRequest::post()
            .uri("/api/v1/student/notifications/read-all")
            .insert_header(("Authorization", format!("Bearer {}", student)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["updated"], 2);
    }

    #[actix_web::test]
    async fn test_register_twice_conflicts() {
        let storage = seeded_storage().await;
        let app = service!(storage);
        let payload = json!({
            "fullName": "Alice",
            "email": "a@x.com",
            "password": "pw",
            "college": "MIT",
            "collegeIdProof": "id.png"
        });

        let req = test::TestRequest::post().uri("/api/v1/auth/register").set_json(&payload).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post().uri("/api/v1/auth/register").set_json(&payload).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_student_cannot_mark_someone_elses_notification() {
        let storage = seeded_storage().await;
        let foreign = crate::services::notification_service::create_notification(
            &storage,
            crate::models::NewNotification {
                student_id: "student_99".to_string(),
                notification_type: crate::models::NotificationType::General,
                title: "Private".to_string(),
                message: "Not yours".to_string(),
                application_id: None,
                meeting_id: None,
            },
        )
        .await
        .unwrap();
        let app = service!(storage);
        let token = token_for!(app, accounts_seed::STUDENT_EMAIL, accounts_seed::STUDENT_PASSWORD);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/student/notifications/{}/read", foreign.id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let unread = crate::services::notification_service::unread_count_for_student(&storage, "student_99")
            .await
            .unwrap();
        assert_eq!(unread, 1);
    }

    #[actix_web::test]
    async fn test_detached_storage_degrades_health_and_refuses_writes() {
        let storage = Storage::detached();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(AuthSettings::default()))
                .route("/health", web::get().to(health::health_check))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["storage"], "detached");

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({ "fullName": "Alice", "email": "a@x.com", "password": "pw" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }
}
