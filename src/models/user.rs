use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// Account stored under `fff_users`. Never updated or deleted once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Exact, case-sensitive match on lookup
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: UserRole,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    /// Filename only, upload content is not kept
    #[serde(rename = "collegeIdProof", default, skip_serializing_if = "Option::is_none")]
    pub college_id_proof_filename: Option<String>,
}

/// Creation input, everything but the generated id.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: Option<String>,
    pub role: UserRole,
    pub full_name: String,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(rename = "collegeIdProof", default)]
    pub college_id_proof_filename: Option<String>,
}

/// User without credentials, safe to hand to the UI.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(rename = "collegeIdProof", skip_serializing_if = "Option::is_none")]
    pub college_id_proof_filename: Option<String>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            email: user.email,
            role: user.role,
            full_name: user.full_name,
            college: user.college,
            college_id_proof_filename: user.college_id_proof_filename,
        }
    }
}
