// ==================== APPLICATION RECORD STORE ====================
// Candidaturas em `fff_applications`. Cada operação lê a coleção inteira,
// altera em memória e regrava tudo (last writer wins).

use chrono::Utc;
use serde::Serialize;

use crate::{
    models::{Application, ApplicationStatus, EvaluationNote, NewApplication, NewEvaluationNote, User},
    seeds::accounts_seed,
    storage::{Storage, APPLICATIONS_KEY, USERS_KEY},
    utils::{generate_id, AppError},
};

/// Number of applications per status, every status present.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: usize,
}

pub async fn list_applications(storage: &Storage) -> Result<Vec<Application>, AppError> {
    let applications: Vec<Application> = storage.load(APPLICATIONS_KEY).await?;
    log::debug!("Loaded {} applications", applications.len());
    Ok(applications)
}

pub async fn find_by_id(storage: &Storage, id: &str) -> Result<Option<Application>, AppError> {
    let applications = list_applications(storage).await?;
    Ok(applications.into_iter().find(|a| a.id == id))
}

pub async fn find_by_student_id(
    storage: &Storage,
    student_id: &str,
) -> Result<Option<Application>, AppError> {
    let applications = list_applications(storage).await?;
    Ok(applications.into_iter().find(|a| a.student_id == student_id))
}

/// Looks up a student's application, repairing a stale owner reference on the way.
///
/// Not a pure read: when nothing matches `student_id` but an application carries
/// `student_name`, that record's `studentId` is rewritten to `student_id` and the
/// whole collection is persisted before returning it. Concurrent repairs are not
/// synchronized.
pub async fn reconcile_and_find(
    storage: &Storage,
    student_id: &str,
    student_name: &str,
) -> Result<Option<Application>, AppError> {
    let mut applications = list_applications(storage).await?;

    if let Some(app) = applications.iter().find(|a| a.student_id == student_id) {
        return Ok(Some(app.clone()));
    }

    let index = match applications.iter().position(|a| a.student_name == student_name) {
        Some(index) => index,
        None => return Ok(None),
    };

    log::info!(
        "🔗 Reassigning application {} from student {} to {} (matched by name '{}')",
        applications[index].id,
        applications[index].student_id,
        student_id,
        student_name
    );
    applications[index].student_id = student_id.to_string();
    storage.save(APPLICATIONS_KEY, &applications).await?;

    Ok(Some(applications.swap_remove(index)))
}

/// Submits a new application with status `Submitted` and the current time.
pub async fn create_application(
    storage: &Storage,
    new_application: NewApplication,
) -> Result<Application, AppError> {
    let mut applications = list_applications(storage).await?;

    let application = Application {
        id: generate_id("app"),
        student_id: new_application.student_id,
        student_name: new_application.student_name,
        startup_name: new_application.startup_name,
        description: new_application.description,
        sector: new_application.sector,
        problem_solved: new_application.problem_solved,
        target_market: new_application.target_market,
        pitch_deck_filename: new_application.pitch_deck_filename,
        status: ApplicationStatus::Submitted,
        submission_date: Utc::now(),
        business: new_application.business,
        notes: None,
    };

    applications.push(application.clone());
    storage.save(APPLICATIONS_KEY, &applications).await?;

    log::info!(
        "📝 Application {} submitted by {} ({})",
        application.id,
        application.student_name,
        application.startup_name
    );
    Ok(application)
}

/// Overwrites the status. `Ok(None)` when the id is unknown.
///
/// Transitions are unrestricted unless the store's `TransitionPolicy` says otherwise.
pub async fn set_status(
    storage: &Storage,
    id: &str,
    status: ApplicationStatus,
) -> Result<Option<Application>, AppError> {
    let mut applications = list_applications(storage).await?;

    let app = match applications.iter_mut().find(|a| a.id == id) {
        Some(app) => app,
        None => return Ok(None),
    };

    if !storage.policy().transitions.permits(app.status, status) {
        log::warn!("⚠️  Refused status change {} -> {} for {}", app.status, status, id);
        return Err(AppError::TransitionNotAllowed {
            from: app.status,
            to: status,
        });
    }

    let previous = app.status;
    app.status = status;
    let updated = app.clone();
    storage.save(APPLICATIONS_KEY, &applications).await?;

    log::info!("🔄 Application {} status: {} -> {}", id, previous, status);
    Ok(Some(updated))
}

/// Appends an evaluation note. Existing notes are never touched.
pub async fn append_note(
    storage: &Storage,
    id: &str,
    note: NewEvaluationNote,
) -> Result<Option<Application>, AppError> {
    let mut applications = list_applications(storage).await?;

    let app = match applications.iter_mut().find(|a| a.id == id) {
        Some(app) => app,
        None => return Ok(None),
    };

    app.notes.get_or_insert_with(Vec::new).push(EvaluationNote {
        id: generate_id("note"),
        admin_id: note.admin_id,
        admin_name: note.admin_name,
        note: note.note,
        timestamp: Utc::now(),
    });
    let updated = app.clone();
    storage.save(APPLICATIONS_KEY, &applications).await?;

    log::info!("🗒️  Note added to application {} ({} total)", id, updated.notes().len());
    Ok(Some(updated))
}

/// Removes the application. Meetings and notifications that reference it are kept.
pub async fn delete_application(storage: &Storage, id: &str) -> Result<bool, AppError> {
    let applications = list_applications(storage).await?;
    let before = applications.len();

    let remaining: Vec<Application> = applications.into_iter().filter(|a| a.id != id).collect();
    if remaining.len() == before {
        return Ok(false);
    }

    storage.save(APPLICATIONS_KEY, &remaining).await?;
    log::info!("🗑️  Application {} deleted", id);
    Ok(true)
}

pub async fn list_by_status(
    storage: &Storage,
    status: ApplicationStatus,
) -> Result<Vec<Application>, AppError> {
    let applications = list_applications(storage).await?;
    Ok(applications.into_iter().filter(|a| a.status == status).collect())
}

pub async fn status_counts(storage: &Storage) -> Result<Vec<StatusCount>, AppError> {
    let applications = list_applications(storage).await?;
    Ok(ApplicationStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: applications.iter().filter(|a| a.status == *status).count(),
        })
        .collect())
}

/// Repairs every application whose owner id matches no user, by matching
/// `studentName` against `fullName`. Persists once; returns how many were repaired.
pub async fn reconcile_orphaned_applications(storage: &Storage) -> Result<usize, AppError> {
    let mut applications = list_applications(storage).await?;
    let users: Vec<User> = storage.load(USERS_KEY).await?;

    let mut repaired = 0;
    for app in applications.iter_mut() {
        if users.iter().any(|u| u.id == app.student_id) {
            continue;
        }
        if let Some(owner) = users.iter().find(|u| u.full_name == app.student_name) {
            log::info!("🔗 Application {}: studentId {} -> {}", app.id, app.student_id, owner.id);
            app.student_id = owner.id.clone();
            repaired += 1;
        }
    }

    if repaired > 0 {
        storage.save(APPLICATIONS_KEY, &applications).await?;
    }
    log::info!("✅ Reconciliation finished: {} application(s) repaired", repaired);
    Ok(repaired)
}

/// Wipes users and applications, then re-seeds the well-known accounts.
///
/// Two independent writes, not a transaction. Meetings and notifications are kept.
pub async fn clear_all(storage: &Storage) -> Result<(), AppError> {
    log::warn!("🧹 Clearing all users and applications");
    storage.remove(USERS_KEY).await?;
    storage.remove(APPLICATIONS_KEY).await?;
    accounts_seed::seed_default_accounts(storage).await
}
