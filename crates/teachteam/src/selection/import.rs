use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{
    ApplicationId, ApplicationStatus, Availability, CourseId, RawApplication, SessionType,
};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read application export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid application CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {detail}")]
    InvalidRow { row: usize, detail: String },
}

/// Loads raw application records from a CSV export.
///
/// Expected headers: `id, candidate_email, course_id, session_type, availability, skills,
/// status, ranking, created_at, comments`, plus optional `previous_roles` and
/// `academic_credentials`. Skills and comments are `;` separated.
pub struct ApplicationImporter;

impl ApplicationImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawApplication>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<RawApplication>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut applications = Vec::new();
        for (index, record) in csv_reader.deserialize::<ApplicationRow>().enumerate() {
            let row = record?;
            // header is line 1
            applications.push(row.into_application(index + 2)?);
        }

        Ok(applications)
    }
}

#[derive(Debug, Deserialize)]
struct ApplicationRow {
    id: String,
    candidate_email: String,
    course_id: String,
    session_type: String,
    availability: String,
    skills: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ranking: Option<String>,
    created_at: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    comments: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    previous_roles: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    academic_credentials: Option<String>,
}

impl ApplicationRow {
    fn into_application(self, row: usize) -> Result<RawApplication, ImportError> {
        let invalid = |detail: String| ImportError::InvalidRow { row, detail };

        let session_type = SessionType::parse(&self.session_type)
            .ok_or_else(|| invalid(format!("unknown session type '{}'", self.session_type)))?;
        let availability = Availability::parse(&self.availability)
            .ok_or_else(|| invalid(format!("unknown availability '{}'", self.availability)))?;
        let status = match self.status.as_deref() {
            Some(raw) => ApplicationStatus::parse(raw)
                .ok_or_else(|| invalid(format!("unknown status '{raw}'")))?,
            None => ApplicationStatus::Pending,
        };
        let ranking = match self.ranking.as_deref() {
            Some(raw) => match raw.parse::<u32>() {
                Ok(rank) if rank > 0 => Some(rank),
                _ => {
                    return Err(invalid(format!(
                        "ranking '{raw}' is not a positive integer"
                    )))
                }
            },
            None => None,
        };
        let created_at = parse_timestamp(&self.created_at)
            .ok_or_else(|| invalid(format!("unparseable created_at '{}'", self.created_at)))?;

        Ok(RawApplication {
            id: ApplicationId(self.id),
            candidate_email: self.candidate_email,
            course_id: CourseId(self.course_id),
            session_type,
            skills: split_list(&self.skills),
            availability,
            status,
            ranking,
            comments: self.comments.as_deref().map(split_list).unwrap_or_default(),
            created_at,
            previous_roles: self.previous_roles,
            academic_credentials: self.academic_credentials,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "id,candidate_email,course_id,session_type,availability,skills,status,ranking,created_at,comments\n";

    #[test]
    fn parses_rows_with_lists_and_blanks() {
        let csv = format!(
            "{HEADER}app-1,alice@student.edu,COSC2758,tutor,fulltime,Python; Rust ;,Selected,1,2025-02-01T09:00:00Z,Strong;Reliable\n\
app-2,bob@student.edu,COSC2758,lab_assistant,parttime,SQL,,,2025-02-02,\n"
        );

        let applications = ApplicationImporter::from_reader(csv.as_bytes()).expect("imports");
        assert_eq!(applications.len(), 2);

        let first = &applications[0];
        assert_eq!(first.skills, vec!["Python".to_string(), "Rust".to_string()]);
        assert_eq!(first.status, ApplicationStatus::Selected);
        assert_eq!(first.ranking, Some(1));
        assert_eq!(first.comments.len(), 2);

        let second = &applications[1];
        assert_eq!(second.session_type, SessionType::LabAssistant);
        assert_eq!(second.status, ApplicationStatus::Pending);
        assert_eq!(second.ranking, None);
        assert!(second.comments.is_empty());
    }

    #[test]
    fn reports_row_number_for_bad_values() {
        let csv = format!(
            "{HEADER}app-1,alice@student.edu,COSC2758,marker,fulltime,Python,,,2025-02-01,\n"
        );

        match ApplicationImporter::from_reader(csv.as_bytes()) {
            Err(ImportError::InvalidRow { row, detail }) => {
                assert_eq!(row, 2);
                assert!(detail.contains("marker"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_ranking() {
        let csv = format!(
            "{HEADER}app-1,alice@student.edu,COSC2758,tutor,fulltime,Python,Selected,0,2025-02-01,\n"
        );

        match ApplicationImporter::from_reader(csv.as_bytes()) {
            Err(ImportError::InvalidRow { row, detail }) => {
                assert_eq!(row, 2);
                assert!(detail.contains("positive integer"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }
}
