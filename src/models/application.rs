use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review pipeline stage of an application.
///
/// `Submitted` is the only initial state. Whether other transitions are allowed is
/// decided by the store's `TransitionPolicy`, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum ApplicationStatus {
    #[serde(rename = "Submitted")]
    Submitted,
    #[serde(rename = "Under Review")]
    UnderReview,
    #[serde(rename = "Shortlisted")]
    Shortlisted,
    #[serde(rename = "Final")]
    Final,
    #[serde(rename = "Rejected")]
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Final,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::UnderReview => "Under Review",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Final => "Final",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Terminal only in how the dashboard renders it; the store does not enforce it.
    pub fn is_conventionally_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Final | ApplicationStatus::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown application status: {}", s))
    }
}

/// Admin evaluation note, owned by its application. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationNote {
    pub id: String,
    pub admin_id: String,
    pub admin_name: String,
    pub note: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewEvaluationNote {
    pub admin_id: String,
    pub admin_name: String,
    pub note: String,
}

/// Startup-funding application stored under `fff_applications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub startup_name: String,
    pub description: String,
    pub sector: String,
    pub problem_solved: String,
    pub target_market: String,
    #[serde(rename = "pitchDeck")]
    pub pitch_deck_filename: String,
    pub status: ApplicationStatus,
    pub submission_date: DateTime<Utc>,

    #[serde(flatten)]
    pub business: BusinessDetails,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<EvaluationNote>>,
}

/// Optional detail fields of the extended application form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitive_advantage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_projection: Option<String>,
}

/// Creation input: system fields (`id`, `status`, `submissionDate`, `notes`) are assigned by the store.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub student_id: String,
    pub student_name: String,
    pub startup_name: String,
    pub description: String,
    pub sector: String,
    pub problem_solved: String,
    pub target_market: String,
    #[serde(rename = "pitchDeck")]
    pub pitch_deck_filename: String,
    #[serde(flatten)]
    pub business: BusinessDetails,
}

impl Application {
    pub fn notes(&self) -> &[EvaluationNote] {
        self.notes.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&ApplicationStatus::UnderReview).unwrap();
        assert_eq!(json, "\"Under Review\"");
        let parsed: ApplicationStatus = serde_json::from_str("\"Shortlisted\"").unwrap();
        assert_eq!(parsed, ApplicationStatus::Shortlisted);
    }

    #[test]
    fn test_status_from_str_ignores_case() {
        assert_eq!("under review".parse::<ApplicationStatus>(), Ok(ApplicationStatus::UnderReview));
        assert!("Pending".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_business_fields_are_flattened() {
        let raw = r#"{
            "id": "app_1", "studentId": "s1", "studentName": "Alice",
            "startupName": "Acme", "description": "d", "sector": "EdTech",
            "problemSolved": "p", "targetMarket": "t", "pitchDeck": "deck.pdf",
            "status": "Submitted", "submissionDate": "2024-05-01T10:00:00.000Z",
            "fundingAmount": "50000"
        }"#;
        let app: Application = serde_json::from_str(raw).unwrap();
        assert_eq!(app.business.funding_amount.as_deref(), Some("50000"));
        assert!(app.notes().is_empty());

        let value = serde_json::to_value(&app).unwrap();
        assert_eq!(value["fundingAmount"], "50000");
        assert!(value.get("teamSize").is_none());
        assert!(value.get("notes").is_none());
    }
}
