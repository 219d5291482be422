// ==================== USER DIRECTORY ====================
// Contas (estudantes e admins) na coleção `fff_users`.
// Sem update e sem delete: contas só são criadas.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::{
    config::PasswordStorage,
    models::{NewUser, User},
    storage::{Storage, USERS_KEY},
    utils::{generate_id, AppError},
};

pub async fn list_users(storage: &Storage) -> Result<Vec<User>, AppError> {
    storage.load(USERS_KEY).await
}

/// First user whose email matches exactly (case-sensitive).
pub async fn find_by_email(storage: &Storage, email: &str) -> Result<Option<User>, AppError> {
    let users = list_users(storage).await?;
    Ok(users.into_iter().find(|u| u.email == email))
}

pub async fn find_by_id(storage: &Storage, id: &str) -> Result<Option<User>, AppError> {
    let users = list_users(storage).await?;
    Ok(users.into_iter().find(|u| u.id == id))
}

/// Appends a new account with a freshly generated id.
///
/// Duplicate emails are accepted unless `enforce_unique_email` is set; callers are
/// expected to check `find_by_email` first.
pub async fn create_user(storage: &Storage, new_user: NewUser) -> Result<User, AppError> {
    let id = generate_id("user");
    insert_user(storage, id, new_user).await
}

/// Inserts an account under a caller-chosen id (used for the well-known seed accounts).
pub(crate) async fn insert_user(
    storage: &Storage,
    id: String,
    new_user: NewUser,
) -> Result<User, AppError> {
    let mut users = list_users(storage).await?;

    if storage.policy().enforce_unique_email && users.iter().any(|u| u.email == new_user.email) {
        log::warn!("⚠️  Rejected duplicate registration for {}", new_user.email);
        return Err(AppError::DuplicateEmail(new_user.email));
    }

    let password = match new_user.password {
        Some(plain) => Some(store_password(storage.policy().password_storage, &plain)?),
        None => None,
    };

    let user = User {
        id,
        email: new_user.email,
        password,
        role: new_user.role,
        full_name: new_user.full_name,
        college: new_user.college,
        college_id_proof_filename: new_user.college_id_proof_filename,
    };

    users.push(user.clone());
    storage.save(USERS_KEY, &users).await?;

    log::info!("👤 User created: {} ({}, {})", user.id, user.email, user.role);
    Ok(user)
}

/// Credential check. `None` for unknown email or wrong password.
pub async fn login(storage: &Storage, email: &str, password: &str) -> Result<Option<User>, AppError> {
    let user = match find_by_email(storage, email).await? {
        Some(user) => user,
        None => return Ok(None),
    };

    let stored = match user.password.as_deref() {
        Some(stored) => stored,
        None => return Ok(None),
    };

    if password_matches(storage.policy().password_storage, password, stored) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

fn store_password(mode: PasswordStorage, plain: &str) -> Result<String, AppError> {
    match mode {
        PasswordStorage::Plaintext => Ok(plain.to_string()),
        PasswordStorage::Bcrypt => hash_password(plain, DEFAULT_COST),
    }
}

fn hash_password(plain: &str, cost: u32) -> Result<String, AppError> {
    hash(plain, cost).map_err(|e| {
        log::error!("❌ Password hashing failed: {}", e);
        AppError::Internal(format!("Failed to hash password: {}", e))
    })
}

fn password_matches(mode: PasswordStorage, candidate: &str, stored: &str) -> bool {
    match mode {
        PasswordStorage::Plaintext => candidate == stored,
        PasswordStorage::Bcrypt => verify(candidate, stored).unwrap_or_else(|e| {
            log::warn!("⚠️  Stored password is not a bcrypt hash: {}", e);
            false
        }),
    }
}
