use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingStatus::Scheduled => write!(f, "scheduled"),
            MeetingStatus::Completed => write!(f, "completed"),
            MeetingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Meeting scheduled by an admin against one application (`fff_meetings`).
///
/// `date` is `YYYY-MM-DD`, `time` is `HH:MM` and `duration` is minutes, all kept as
/// the strings the scheduling form submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSchedule {
    pub id: String,
    pub application_id: String,
    pub student_id: String,
    pub student_name: String,
    pub startup_name: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub agenda: String,
    pub meet_link: String,
    pub admin_id: String,
    pub admin_name: String,
    pub status: MeetingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMeeting {
    pub application_id: String,
    pub student_id: String,
    pub student_name: String,
    pub startup_name: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub agenda: String,
    pub meet_link: String,
    pub admin_id: String,
    pub admin_name: String,
}
