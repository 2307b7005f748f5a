use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted user row. Deliberately not `Serialize`: the password hash
/// must never reach a response body, so handlers convert to one of the
/// view types below.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub contact: String,
    pub address: String,
    pub job_role: String,
    pub status: String,
    pub role: String,
    pub gender: String,
    pub skills: Vec<String>,
    pub ats_score: i32,
    pub resume_strength: Vec<String>,
    pub resume_weakness: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view returned by login. The client keeps this object as its
/// session artifact; no token is issued.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub uid: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// One entry of the admin listing. `timestamp` is the registration time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
    pub role: String,
    pub contact: String,
    pub address: String,
    pub job_role: String,
    pub status: String,
    pub ats_score: i32,
}

/// Full profile served to the dashboard views, analysis fields included.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    pub job_role: String,
    pub role: String,
    pub gender: String,
    pub skills: Vec<String>,
    pub ats_score: i32,
    pub resume_strength: Vec<String>,
    pub resume_weakness: Vec<String>,
}

impl From<UserRow> for UserSummary {
    fn from(row: UserRow) -> Self {
        UserSummary {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            timestamp: row.created_at,
            role: row.role,
            contact: row.contact,
            address: row.address,
            job_role: row.job_role,
            status: row.status,
            ats_score: row.ats_score,
        }
    }
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            contact: row.contact,
            address: row.address,
            job_role: row.job_role,
            role: row.role,
            gender: row.gender,
            skills: row.skills,
            ats_score: row.ats_score,
            resume_strength: row.resume_strength,
            resume_weakness: row.resume_weakness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            contact: "555-0100".to_string(),
            address: "12 Analytical Row".to_string(),
            job_role: "Backend Developer".to_string(),
            status: "active".to_string(),
            role: "student".to_string(),
            gender: "female".to_string(),
            skills: vec!["python".to_string()],
            ats_score: 72,
            resume_strength: vec!["clear impact bullets".to_string()],
            resume_weakness: vec!["no certifications".to_string()],
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_summary_serializes_camel_case_without_password() {
        let summary = UserSummary::from(make_row());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["jobRole"], "Backend Developer");
        assert_eq!(json["atsScore"], 72);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_summary_timestamp_is_registration_time() {
        let row = make_row();
        let created_at = row.created_at;
        let summary = UserSummary::from(row);
        assert_eq!(summary.timestamp, created_at);
    }

    #[test]
    fn test_profile_carries_analysis_fields() {
        let profile = UserProfile::from(make_row());
        assert_eq!(profile.ats_score, 72);
        assert_eq!(profile.resume_strength.len(), 1);
        assert_eq!(profile.resume_weakness.len(), 1);
    }

    #[test]
    fn test_public_user_keeps_uid_key() {
        let public = PublicUser {
            uid: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: "student".to_string(),
        };
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("uid").is_some());
        assert_eq!(json["role"], "student");
    }
}
