use std::collections::{HashMap, HashSet};
use std::env;
use std::path::PathBuf;

use crate::models::ApplicationStatus;

/// Which status changes `set_status` accepts.
///
/// `allowed == None` is the open pipeline: any status may move to any other.
#[derive(Debug, Clone, Default)]
pub struct TransitionPolicy {
    pub allowed: Option<HashMap<ApplicationStatus, HashSet<ApplicationStatus>>>,
}

impl TransitionPolicy {
    pub fn open() -> Self {
        Self { allowed: None }
    }

    /// Forward-only review pipeline with `Final` and `Rejected` terminal.
    pub fn pipeline() -> Self {
        use ApplicationStatus::*;

        let mut allowed = HashMap::new();
        allowed.insert(Submitted, HashSet::from([UnderReview, Rejected]));
        allowed.insert(UnderReview, HashSet::from([Shortlisted, Rejected]));
        allowed.insert(Shortlisted, HashSet::from([Final, Rejected]));
        allowed.insert(Final, HashSet::new());
        allowed.insert(Rejected, HashSet::new());
        Self { allowed: Some(allowed) }
    }

    pub fn permits(&self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        if from == to {
            return true;
        }
        match &self.allowed {
            None => true,
            Some(map) => map.get(&from).map(|next| next.contains(&to)).unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordStorage {
    /// Stored and compared as-is
    #[default]
    Plaintext,
    Bcrypt,
}

/// Invariants the store can optionally enforce. Defaults are permissive.
#[derive(Debug, Clone, Default)]
pub struct StorePolicy {
    pub enforce_unique_email: bool,
    pub transitions: TransitionPolicy,
    pub password_storage: PasswordStorage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendKind {
    Memory,
    File(PathBuf),
    MongoDb(String),
}

/// Session token settings.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "default-secret-change-me".to_string(),
            jwt_issuer: "funding-review-service".to_string(),
            jwt_audience: "funding-review-ui".to_string(),
            token_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StorageBackendKind,
    pub policy: StorePolicy,
    pub auth: AuthSettings,
    pub reconcile_on_start: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup (the process environment in `from_env`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "3002")
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let backend = match var("STORAGE_BACKEND", "memory").to_lowercase().as_str() {
            "memory" => StorageBackendKind::Memory,
            "file" => StorageBackendKind::File(PathBuf::from(var("STORAGE_FILE", "./data/store.json"))),
            "mongodb" | "mongo" => {
                let url = lookup("DATABASE_URL")
                    .ok_or("DATABASE_URL must be set when STORAGE_BACKEND=mongodb")?;
                StorageBackendKind::MongoDb(url)
            }
            other => return Err(format!("Invalid STORAGE_BACKEND: {} (memory, file, mongodb)", other)),
        };

        let transitions = match var("STATUS_TRANSITIONS", "open").to_lowercase().as_str() {
            "open" => TransitionPolicy::open(),
            "pipeline" => TransitionPolicy::pipeline(),
            other => return Err(format!("Invalid STATUS_TRANSITIONS: {} (open, pipeline)", other)),
        };

        let password_storage = match var("PASSWORD_STORAGE", "plaintext").to_lowercase().as_str() {
            "plaintext" => PasswordStorage::Plaintext,
            "bcrypt" => PasswordStorage::Bcrypt,
            other => return Err(format!("Invalid PASSWORD_STORAGE: {} (plaintext, bcrypt)", other)),
        };

        let defaults = AuthSettings::default();
        let auth = AuthSettings {
            jwt_secret: var("JWT_SECRET", &defaults.jwt_secret),
            jwt_issuer: var("JWT_ISSUER", &defaults.jwt_issuer),
            jwt_audience: var("JWT_AUDIENCE", &defaults.jwt_audience),
            token_ttl_hours: var("JWT_TTL_HOURS", "24")
                .parse::<i64>()
                .map_err(|e| format!("Invalid JWT_TTL_HOURS: {}", e))?,
        };

        let cors_origins = var("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            backend,
            policy: StorePolicy {
                enforce_unique_email: parse_flag("ENFORCE_UNIQUE_EMAIL", lookup("ENFORCE_UNIQUE_EMAIL"))?,
                transitions,
                password_storage,
            },
            auth,
            reconcile_on_start: parse_flag("RECONCILE_ON_START", lookup("RECONCILE_ON_START"))?,
            cors_origins,
        })
    }
}

fn parse_flag(name: &str, value: Option<String>) -> Result<bool, String> {
    match value.as_deref().map(|v| v.trim().to_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(format!("Invalid {}: {}", name, v)),
        },
    }
}
