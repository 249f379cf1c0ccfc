use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for persisted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join key into the course catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub String);

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role a candidate applied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Tutor,
    LabAssistant,
}

impl SessionType {
    pub const fn label(self) -> &'static str {
        match self {
            SessionType::Tutor => "tutor",
            SessionType::LabAssistant => "lab_assistant",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tutor" => Some(Self::Tutor),
            "lab_assistant" | "lab assistant" | "labassistant" => Some(Self::LabAssistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Fulltime,
    Parttime,
}

impl Availability {
    pub const fn label(self) -> &'static str {
        match self {
            Availability::Fulltime => "fulltime",
            Availability::Parttime => "parttime",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fulltime" | "full-time" | "full time" => Some(Self::Fulltime),
            "parttime" | "part-time" | "part time" => Some(Self::Parttime),
            _ => None,
        }
    }
}

/// Review status tracked for every application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Selected,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Selected => "Selected",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "selected" => Some(Self::Selected),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Application record as persisted by the application store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawApplication {
    pub id: ApplicationId,
    pub candidate_email: String,
    pub course_id: CourseId,
    pub session_type: SessionType,
    pub skills: Vec<String>,
    pub availability: Availability,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub ranking: Option<u32>,
    #[serde(default)]
    pub comments: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_roles: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_credentials: Option<String>,
}

/// Catalog entry for a course offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDetails {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Candidate,
    Lecturer,
    Admin,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            UserRole::Candidate => "candidate",
            UserRole::Lecturer => "lecturer",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// Denormalized, UI-ready view of an application joined with course and candidate metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDisplay {
    pub id: ApplicationId,
    pub candidate_name: String,
    pub candidate_email: String,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub session_type: SessionType,
    pub skills: Vec<String>,
    pub availability: Availability,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<u32>,
    pub comments: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_roles: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_credentials: Option<String>,
}

impl ApplicationDisplay {
    /// True when both records compete for ranks in the same course and session type.
    pub fn same_group(&self, other: &ApplicationDisplay) -> bool {
        self.in_group(&other.course_id, other.session_type)
    }

    pub fn in_group(&self, course_id: &CourseId, session_type: SessionType) -> bool {
        self.course_id == *course_id && self.session_type == session_type
    }

    pub fn is_selected(&self) -> bool {
        self.status == ApplicationStatus::Selected
    }
}

/// Admin notice flagging a candidate as unavailable for the current offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailabilityNotice {
    pub candidate_email: String,
    pub unavailable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
