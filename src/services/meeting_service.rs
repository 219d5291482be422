// ==================== MEETING SCHEDULES ====================
// Reuniões agendadas pelo admin para uma candidatura (`fff_meetings`).
// Só o status muda depois da criação; não há delete.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::{
    models::{MeetingSchedule, MeetingStatus, NewMeeting},
    storage::{Storage, MEETINGS_KEY},
    utils::{generate_id, AppError},
};

const MEET_BASE_URL: &str = "https://meet.google.com/";
const CALENDAR_RENDER_URL: &str = "https://calendar.google.com/calendar/render";
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub async fn list_meetings(storage: &Storage) -> Result<Vec<MeetingSchedule>, AppError> {
    storage.load(MEETINGS_KEY).await
}

pub async fn find_by_id(storage: &Storage, id: &str) -> Result<Option<MeetingSchedule>, AppError> {
    let meetings = list_meetings(storage).await?;
    Ok(meetings.into_iter().find(|m| m.id == id))
}

pub async fn list_by_application(
    storage: &Storage,
    application_id: &str,
) -> Result<Vec<MeetingSchedule>, AppError> {
    let meetings = list_meetings(storage).await?;
    Ok(meetings.into_iter().filter(|m| m.application_id == application_id).collect())
}

pub async fn list_by_student(
    storage: &Storage,
    student_id: &str,
) -> Result<Vec<MeetingSchedule>, AppError> {
    let meetings = list_meetings(storage).await?;
    Ok(meetings.into_iter().filter(|m| m.student_id == student_id).collect())
}

/// Records a new meeting in the `scheduled` state.
pub async fn create_meeting(storage: &Storage, new_meeting: NewMeeting) -> Result<MeetingSchedule, AppError> {
    let mut meetings = list_meetings(storage).await?;

    let meeting = MeetingSchedule {
        id: generate_id("meeting"),
        application_id: new_meeting.application_id,
        student_id: new_meeting.student_id,
        student_name: new_meeting.student_name,
        startup_name: new_meeting.startup_name,
        title: new_meeting.title,
        description: new_meeting.description,
        date: new_meeting.date,
        time: new_meeting.time,
        duration: new_meeting.duration,
        agenda: new_meeting.agenda,
        meet_link: new_meeting.meet_link,
        admin_id: new_meeting.admin_id,
        admin_name: new_meeting.admin_name,
        status: MeetingStatus::Scheduled,
        created_at: Utc::now(),
    };

    meetings.push(meeting.clone());
    storage.save(MEETINGS_KEY, &meetings).await?;

    log::info!(
        "📅 Meeting {} scheduled for application {} on {} {}",
        meeting.id,
        meeting.application_id,
        meeting.date,
        meeting.time
    );
    Ok(meeting)
}

pub async fn set_status(
    storage: &Storage,
    id: &str,
    status: MeetingStatus,
) -> Result<Option<MeetingSchedule>, AppError> {
    let mut meetings = list_meetings(storage).await?;

    let meeting = match meetings.iter_mut().find(|m| m.id == id) {
        Some(meeting) => meeting,
        None => return Ok(None),
    };
    meeting.status = status;
    let updated = meeting.clone();
    storage.save(MEETINGS_KEY, &meetings).await?;

    log::info!("📅 Meeting {} is now {}", id, status);
    Ok(Some(updated))
}

/// `https://meet.google.com/` followed by 9 random lowercase base-36 characters.
pub fn generate_meet_link() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    let code: String = bytes
        .iter()
        .take(9)
        .map(|b| BASE36[(*b as usize) % BASE36.len()] as char)
        .collect();
    format!("{}{}", MEET_BASE_URL, code)
}

/// Google Calendar "add event" link prefilled with the meeting.
///
/// Fails when `date` or `time` cannot be parsed, or when `duration` is not a positive
/// number of minutes that keeps the end inside the calendar range.
pub fn calendar_invite_url(meeting: &MeetingSchedule) -> Result<String, AppError> {
    let start = parse_start(&meeting.date, &meeting.time)?;
    let invalid_duration = || AppError::InvalidRequest(format!("Invalid duration: {}", meeting.duration));
    let minutes: i64 = meeting.duration.trim().parse().map_err(|_| invalid_duration())?;
    if minutes <= 0 {
        return Err(invalid_duration());
    }
    let end = Duration::try_minutes(minutes)
        .and_then(|length| start.checked_add_signed(length))
        .ok_or_else(invalid_duration)?;

    let details = format!(
        "Meeting with {} - {}\n\n{}\n\nAgenda:\n{}\n\nGoogle Meet Link: {}",
        meeting.student_name, meeting.startup_name, meeting.description, meeting.agenda, meeting.meet_link
    );

    Ok(format!(
        "{}?action=TEMPLATE&text={}&dates={}/{}&details={}",
        CALENDAR_RENDER_URL,
        urlencoding::encode(&meeting.title),
        start.format("%Y%m%dT%H%M%SZ"),
        end.format("%Y%m%dT%H%M%SZ"),
        urlencoding::encode(&details)
    ))
}

fn parse_start(date: &str, time: &str) -> Result<NaiveDateTime, AppError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidRequest(format!("Invalid date (expected YYYY-MM-DD): {}", date)))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| AppError::InvalidRequest(format!("Invalid time (expected HH:MM): {}", time)))?;
    Ok(date.and_time(time))
}

/// Validates the date/time/duration strings a scheduling form submits.
pub fn validate_slot(date: &str, time: &str, duration: &str) -> Result<(), AppError> {
    parse_start(date, time)?;
    match duration.trim().parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(()),
        _ => Err(AppError::InvalidRequest(format!("Invalid duration: {}", duration))),
    }
}
