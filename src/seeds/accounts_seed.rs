use crate::models::{NewUser, User, UserRole};
use crate::services::user_service;
use crate::storage::{Storage, USERS_KEY};
use crate::utils::AppError;

pub const ADMIN_ID: &str = "admin_01";
pub const ADMIN_EMAIL: &str = "admin@test.com";
pub const ADMIN_PASSWORD: &str = "admin123";

pub const STUDENT_ID: &str = "student_01";
pub const STUDENT_EMAIL: &str = "student@test.com";
pub const STUDENT_PASSWORD: &str = "student123";

/// Store start-up: creates an empty users collection on first run, then makes
/// sure both well-known accounts exist.
pub async fn initialize(storage: &Storage) -> Result<(), AppError> {
    if !storage.contains_key(USERS_KEY).await? {
        log::info!("🌱 First run on '{}' storage: creating users collection", storage.backend_name());
        storage.save::<User>(USERS_KEY, &[]).await?;
    }
    seed_default_accounts(storage).await
}

/// Runs both seeds. Idempotent.
pub async fn seed_default_accounts(storage: &Storage) -> Result<(), AppError> {
    ensure_admin_seed(storage).await?;
    ensure_student_seed(storage).await?;
    Ok(())
}

/// Inserts the default admin unless some account already has the admin role.
pub async fn ensure_admin_seed(storage: &Storage) -> Result<bool, AppError> {
    let users = user_service::list_users(storage).await?;
    if users.iter().any(|u| u.role == UserRole::Admin) {
        log::debug!("Admin account present, skipping seed");
        return Ok(false);
    }

    user_service::insert_user(
        storage,
        ADMIN_ID.to_string(),
        NewUser {
            email: ADMIN_EMAIL.to_string(),
            password: Some(ADMIN_PASSWORD.to_string()),
            role: UserRole::Admin,
            full_name: "HP Admin".to_string(),
            college: None,
            college_id_proof_filename: None,
        },
    )
    .await?;
    log::info!("🌱 Seeded default admin ({})", ADMIN_EMAIL);
    Ok(true)
}

/// Inserts the test student unless its email is already registered.
pub async fn ensure_student_seed(storage: &Storage) -> Result<bool, AppError> {
    if user_service::find_by_email(storage, STUDENT_EMAIL).await?.is_some() {
        log::debug!("Test student present, skipping seed");
        return Ok(false);
    }

    user_service::insert_user(
        storage,
        STUDENT_ID.to_string(),
        NewUser {
            email: STUDENT_EMAIL.to_string(),
            password: Some(STUDENT_PASSWORD.to_string()),
            role: UserRole::Student,
            full_name: "Test Student".to_string(),
            college: Some("Test University".to_string()),
            college_id_proof_filename: None,
        },
    )
    .await?;
    log::info!("🌱 Seeded test student ({})", STUDENT_EMAIL);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorePolicy;

    #[tokio::test]
    async fn test_initialize_seeds_both_accounts_once() {
        let storage = Storage::in_memory();
        initialize(&storage).await.unwrap();
        initialize(&storage).await.unwrap();

        let users = user_service::list_users(&storage).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, ADMIN_ID);
        assert_eq!(users[0].role, UserRole::Admin);
        assert_eq!(users[1].id, STUDENT_ID);
        assert_eq!(users[1].college.as_deref(), Some("Test University"));
    }

    #[tokio::test]
    async fn test_existing_admin_suppresses_admin_seed() {
        let storage = Storage::in_memory();
        user_service::create_user(
            &storage,
            NewUser {
                email: "boss@x.com".into(),
                password: Some("pw".into()),
                role: UserRole::Admin,
                full_name: "Boss".into(),
                college: None,
                college_id_proof_filename: None,
            },
        )
        .await
        .unwrap();

        assert!(!ensure_admin_seed(&storage).await.unwrap());
        assert!(ensure_student_seed(&storage).await.unwrap());
        assert!(user_service::find_by_email(&storage, ADMIN_EMAIL).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seeded_accounts_can_log_in_under_strict_policy() {
        let storage = Storage::in_memory_with_policy(StorePolicy {
            enforce_unique_email: true,
            password_storage: crate::config::PasswordStorage::Bcrypt,
            ..StorePolicy::default()
        });
        initialize(&storage).await.unwrap();

        let admin = user_service::login(&storage, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
        assert_eq!(admin.map(|u| u.id), Some(ADMIN_ID.to_string()));
    }

    #[tokio::test]
    async fn test_initialize_fails_when_detached() {
        let storage = Storage::detached();
        assert!(matches!(initialize(&storage).await, Err(AppError::StorageUnavailable(_))));
    }
}
