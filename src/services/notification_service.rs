// ==================== STUDENT NOTIFICATIONS ====================
// Notificações por estudante (`fff_notifications`). `is_read` só vai de false para true.

use chrono::Utc;

use crate::{
    models::{NewNotification, StudentNotification},
    storage::{Storage, NOTIFICATIONS_KEY},
    utils::{generate_id, AppError},
};

pub async fn list_notifications(storage: &Storage) -> Result<Vec<StudentNotification>, AppError> {
    storage.load(NOTIFICATIONS_KEY).await
}

pub async fn list_by_student(
    storage: &Storage,
    student_id: &str,
) -> Result<Vec<StudentNotification>, AppError> {
    let notifications = list_notifications(storage).await?;
    Ok(notifications.into_iter().filter(|n| n.student_id == student_id).collect())
}

pub async fn unread_count_for_student(storage: &Storage, student_id: &str) -> Result<usize, AppError> {
    let notifications = list_by_student(storage, student_id).await?;
    Ok(notifications.iter().filter(|n| !n.is_read).count())
}

pub async fn create_notification(
    storage: &Storage,
    new_notification: NewNotification,
) -> Result<StudentNotification, AppError> {
    let mut notifications = list_notifications(storage).await?;

    let notification = StudentNotification {
        id: generate_id("notif"),
        student_id: new_notification.student_id,
        notification_type: new_notification.notification_type,
        title: new_notification.title,
        message: new_notification.message,
        application_id: new_notification.application_id,
        meeting_id: new_notification.meeting_id,
        is_read: false,
        created_at: Utc::now(),
    };

    notifications.push(notification.clone());
    storage.save(NOTIFICATIONS_KEY, &notifications).await?;

    log::info!(
        "🔔 Notification {} ({:?}) for student {}",
        notification.id,
        notification.notification_type,
        notification.student_id
    );
    Ok(notification)
}

/// Flags one notification as read. `Ok(None)` when the id is unknown.
pub async fn mark_read(storage: &Storage, id: &str) -> Result<Option<StudentNotification>, AppError> {
    let mut notifications = list_notifications(storage).await?;

    let notification = match notifications.iter_mut().find(|n| n.id == id) {
        Some(notification) => notification,
        None => return Ok(None),
    };
    notification.is_read = true;
    let updated = notification.clone();
    storage.save(NOTIFICATIONS_KEY, &notifications).await?;

    Ok(Some(updated))
}

/// Marks every unread notification of a student in one pass, then writes once.
/// Returns how many changed; nothing is written when that is zero.
pub async fn mark_all_read_for_student(storage: &Storage, student_id: &str) -> Result<usize, AppError> {
    let mut notifications = list_notifications(storage).await?;

    let mut changed = 0;
    for notification in notifications
        .iter_mut()
        .filter(|n| n.student_id == student_id && !n.is_read)
    {
        notification.is_read = true;
        changed += 1;
    }

    if changed > 0 {
        storage.save(NOTIFICATIONS_KEY, &notifications).await?;
        log::info!("🔔 Marked {} notification(s) read for student {}", changed, student_id);
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;

    fn notice(student_id: &str, title: &str) -> NewNotification {
        NewNotification {
            student_id: student_id.to_string(),
            notification_type: NotificationType::General,
            title: title.to_string(),
            message: "Hello".to_string(),
            application_id: None,
            meeting_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_starts_unread() {
        let storage = Storage::in_memory();
        let created = create_notification(&storage, notice("S1", "Welcome")).await.unwrap();

        assert!(created.id.starts_with("notif_"));
        assert!(!created.is_read);
        assert_eq!(list_notifications(&storage).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_mark_read() {
        let storage = Storage::in_memory();
        let n = create_notification(&storage, notice("S1", "One")).await.unwrap();

        let read = mark_read(&storage, &n.id).await.unwrap().unwrap();
        assert!(read.is_read);
        assert_eq!(unread_count_for_student(&storage, "S1").await.unwrap(), 0);
        assert!(mark_read(&storage, "notif_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_all_read_only_touches_one_student() {
        let storage = Storage::in_memory();
        for i in 0..3 {
            create_notification(&storage, notice("S1", &format!("n{}", i))).await.unwrap();
        }
        create_notification(&storage, notice("S2", "other")).await.unwrap();

        assert_eq!(unread_count_for_student(&storage, "S1").await.unwrap(), 3);
        assert_eq!(mark_all_read_for_student(&storage, "S1").await.unwrap(), 3);
        assert_eq!(mark_all_read_for_student(&storage, "S1").await.unwrap(), 0);

        assert_eq!(unread_count_for_student(&storage, "S1").await.unwrap(), 0);
        assert_eq!(unread_count_for_student(&storage, "S2").await.unwrap(), 1);
        assert_eq!(list_by_student(&storage, "S1").await.unwrap().len(), 3);
    }
}
