use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use teachteam::selection::{
    ApplicationId, ApplicationImporter, ApplicationStatus, ApplicationStore, Availability,
    CourseCatalog, CourseDetails, CourseId, ImportError, NoticeError, NoticePublisher,
    RawApplication, RepositoryError, UnavailabilityNotice, UserData, UserDirectory, UserRole,
};
use tracing::info;

const SAMPLE_APPLICATIONS: &str = include_str!("../../../crates/teachteam/sample_applications.csv");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    records: Arc<Mutex<BTreeMap<ApplicationId, RawApplication>>>,
}

impl InMemoryApplicationStore {
    pub(crate) fn with_records(records: Vec<RawApplication>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.records.lock().expect("store mutex poisoned");
            for record in records {
                guard.insert(record.id.clone(), record);
            }
        }
        store
    }

    fn matching(&self, predicate: impl Fn(&RawApplication) -> bool) -> Vec<RawApplication> {
        let guard = self.records.lock().expect("store mutex poisoned");
        guard
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    fn modify(
        &self,
        id: &ApplicationId,
        apply: impl FnOnce(&mut RawApplication),
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        apply(record);
        Ok(())
    }
}

impl ApplicationStore for InMemoryApplicationStore {
    fn applications_for_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<RawApplication>, RepositoryError> {
        Ok(self.matching(|record| &record.course_id == course_id))
    }

    fn all_applications(&self) -> Result<Vec<RawApplication>, RepositoryError> {
        Ok(self.matching(|_| true))
    }

    fn selected_applications(&self) -> Result<Vec<RawApplication>, RepositoryError> {
        Ok(self.matching(|record| record.status == ApplicationStatus::Selected))
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<RawApplication>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        self.modify(id, |record| record.status = status)
    }

    fn update_application_ranking(
        &self,
        id: &ApplicationId,
        ranking: Option<u32>,
    ) -> Result<bool, RepositoryError> {
        if ranking == Some(0) {
            return Ok(false);
        }
        self.modify(id, |record| record.ranking = ranking)?;
        Ok(true)
    }

    fn add_comment(&self, id: &ApplicationId, text: &str) -> Result<(), RepositoryError> {
        self.modify(id, |record| record.comments.push(text.to_string()))
    }
}

pub(crate) struct InMemoryCourseCatalog {
    courses: HashMap<CourseId, CourseDetails>,
}

impl InMemoryCourseCatalog {
    pub(crate) fn standard() -> Self {
        let courses = [
            ("COSC2758", "Full Stack Development"),
            ("ISYS1101", "Database Concepts"),
            ("COSC2123", "Algorithms and Analysis"),
        ]
        .into_iter()
        .map(|(code, name)| {
            (
                CourseId(code.to_string()),
                CourseDetails {
                    code: code.to_string(),
                    name: name.to_string(),
                },
            )
        })
        .collect();
        Self { courses }
    }
}

impl CourseCatalog for InMemoryCourseCatalog {
    fn course_details(&self, course_id: &CourseId) -> Option<CourseDetails> {
        self.courses.get(course_id).cloned()
    }
}

pub(crate) struct InMemoryUserDirectory {
    users: HashMap<String, UserData>,
}

impl InMemoryUserDirectory {
    pub(crate) fn standard() -> Self {
        let users = [
            ("Alice Nguyen", "alice@student.edu", UserRole::Candidate),
            ("Bob Smith", "bob@student.edu", UserRole::Candidate),
            ("Carol Jones", "carol@student.edu", UserRole::Candidate),
            ("Dan Brown", "dan@student.edu", UserRole::Candidate),
            ("Erin Walsh", "erin@student.edu", UserRole::Candidate),
            ("Dr Maya Rivera", "rivera@uni.edu", UserRole::Lecturer),
            ("Course Admin", "admin@uni.edu", UserRole::Admin),
        ]
        .into_iter()
        .map(|(name, email, role)| {
            (
                email.to_string(),
                UserData {
                    name: name.to_string(),
                    email: email.to_string(),
                    role,
                },
            )
        })
        .collect();
        Self { users }
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn user_data(&self, email: &str) -> Option<UserData> {
        self.users.get(&email.to_ascii_lowercase()).cloned()
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNoticePublisher {
    events: Arc<Mutex<Vec<UnavailabilityNotice>>>,
}

impl NoticePublisher for InMemoryNoticePublisher {
    fn publish(&self, notice: UnavailabilityNotice) -> Result<(), NoticeError> {
        info!(
            candidate = %notice.candidate_email,
            unavailable = notice.unavailable,
            "candidate availability notice"
        );
        let mut guard = self.events.lock().expect("notice mutex poisoned");
        guard.push(notice);
        Ok(())
    }
}

impl InMemoryNoticePublisher {
    pub(crate) fn events(&self) -> Vec<UnavailabilityNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

/// Load applications from a CSV export, or the bundled sample when no path is given.
pub(crate) fn load_applications(path: Option<&Path>) -> Result<Vec<RawApplication>, ImportError> {
    match path {
        Some(path) => ApplicationImporter::from_path(path),
        None => ApplicationImporter::from_reader(SAMPLE_APPLICATIONS.as_bytes()),
    }
}

pub(crate) fn parse_availability(raw: &str) -> Result<Availability, String> {
    Availability::parse(raw).ok_or_else(|| format!("'{raw}' is not fulltime or parttime"))
}
