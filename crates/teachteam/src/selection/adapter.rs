use tracing::debug;

use super::domain::{ApplicationDisplay, ApplicationStatus, CourseId, RawApplication, SessionType};
use super::repository::{CourseCatalog, UserDirectory};

pub const COURSE_NOT_IN_CATALOG: &str = "Course not in catalog";
pub const UNKNOWN_TUTOR: &str = "Unknown Tutor";
pub const UNKNOWN_CANDIDATE: &str = "Unknown Candidate";

/// Join a persisted application with course and candidate metadata.
///
/// Missing references degrade to placeholder values so the record still renders.
pub fn adapt(
    raw: RawApplication,
    catalog: &dyn CourseCatalog,
    directory: &dyn UserDirectory,
) -> ApplicationDisplay {
    let (course_code, course_name) = match catalog.course_details(&raw.course_id) {
        Some(details) => (details.code, details.name),
        None => {
            debug!(course_id = %raw.course_id, application_id = %raw.id, "course missing from catalog");
            (
                fallback_course_code(&raw.course_id),
                COURSE_NOT_IN_CATALOG.to_string(),
            )
        }
    };

    let candidate_name = match directory.user_data(&raw.candidate_email) {
        Some(user) => user.name,
        None => {
            debug!(application_id = %raw.id, "candidate missing from user directory");
            unknown_candidate_label(raw.session_type).to_string()
        }
    };

    let ranking = match raw.status {
        ApplicationStatus::Selected => raw.ranking,
        ApplicationStatus::Pending | ApplicationStatus::Rejected => None,
    };

    ApplicationDisplay {
        id: raw.id,
        candidate_name,
        candidate_email: raw.candidate_email,
        course_id: raw.course_id,
        course_code,
        course_name,
        session_type: raw.session_type,
        skills: raw.skills,
        availability: raw.availability,
        status: raw.status,
        ranking,
        comments: raw.comments,
        created_at: raw.created_at,
        previous_roles: raw.previous_roles,
        academic_credentials: raw.academic_credentials,
    }
}

pub fn adapt_all(
    raws: Vec<RawApplication>,
    catalog: &dyn CourseCatalog,
    directory: &dyn UserDirectory,
) -> Vec<ApplicationDisplay> {
    raws.into_iter()
        .map(|raw| adapt(raw, catalog, directory))
        .collect()
}

pub const fn unknown_candidate_label(session_type: SessionType) -> &'static str {
    match session_type {
        SessionType::Tutor => UNKNOWN_TUTOR,
        SessionType::LabAssistant => UNKNOWN_CANDIDATE,
    }
}

/// Course ids shaped like `cosc2758` become `COSC2758`; anything else is shown verbatim.
pub fn fallback_course_code(course_id: &CourseId) -> String {
    let raw = course_id.0.trim();
    if looks_like_course_code(raw) {
        raw.to_ascii_uppercase()
    } else {
        course_id.0.clone()
    }
}

fn looks_like_course_code(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 8
        && bytes[..4].iter().all(u8::is_ascii_alphabetic)
        && bytes[4..].iter().all(u8::is_ascii_digit)
}
