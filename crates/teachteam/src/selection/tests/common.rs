use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::selection::domain::{
    ApplicationDisplay, ApplicationId, ApplicationStatus, Availability, CourseDetails, CourseId,
    RawApplication, SessionType, UnavailabilityNotice, UserData, UserRole,
};
use crate::selection::repository::{
    ApplicationStore, CourseCatalog, NoticeError, NoticePublisher, RepositoryError, UserDirectory,
};
use crate::selection::router::{selection_router, SESSION_HEADER};
use crate::selection::service::SelectionService;
use crate::session::SessionRegistry;

pub(super) const COURSE: &str = "COSC2758";
pub(super) const OTHER_COURSE: &str = "ISYS1101";

pub(super) fn timestamp(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 1, 9, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn display(
    id: &str,
    name: &str,
    session_type: SessionType,
    status: ApplicationStatus,
    ranking: Option<u32>,
) -> ApplicationDisplay {
    ApplicationDisplay {
        id: ApplicationId(id.to_string()),
        candidate_name: name.to_string(),
        candidate_email: format!("{}@student.edu", name.to_lowercase().replace(' ', ".")),
        course_id: CourseId(COURSE.to_string()),
        course_code: COURSE.to_string(),
        course_name: "Full Stack Development".to_string(),
        session_type,
        skills: vec!["Python".to_string()],
        availability: Availability::Fulltime,
        status,
        ranking,
        comments: Vec::new(),
        created_at: timestamp(0),
        previous_roles: None,
        academic_credentials: None,
    }
}

pub(super) fn selected(id: &str, name: &str, rank: u32) -> ApplicationDisplay {
    display(
        id,
        name,
        SessionType::Tutor,
        ApplicationStatus::Selected,
        Some(rank),
    )
}

pub(super) fn pending(id: &str, name: &str) -> ApplicationDisplay {
    display(id, name, SessionType::Tutor, ApplicationStatus::Pending, None)
}

/// Five Selected tutors for `COSC2758`, `t1` at rank 1 through `t5` at rank 5.
pub(super) fn ranked_group() -> Vec<ApplicationDisplay> {
    (1..=5)
        .map(|rank| selected(&format!("t{rank}"), &format!("Tutor {rank}"), rank))
        .collect()
}

pub(super) fn rank_of(applications: &[ApplicationDisplay], id: &str) -> Option<u32> {
    applications
        .iter()
        .find(|application| application.id.0 == id)
        .and_then(|application| application.ranking)
}

pub(super) fn raw(
    id: &str,
    email: &str,
    course: &str,
    session_type: SessionType,
    status: ApplicationStatus,
    ranking: Option<u32>,
) -> RawApplication {
    RawApplication {
        id: ApplicationId(id.to_string()),
        candidate_email: email.to_string(),
        course_id: CourseId(course.to_string()),
        session_type,
        skills: vec!["Python".to_string(), "SQL".to_string()],
        availability: Availability::Parttime,
        status,
        ranking,
        comments: Vec::new(),
        created_at: timestamp(id.len() as u32),
        previous_roles: Some("Peer mentor".to_string()),
        academic_credentials: None,
    }
}

/// Three tutor applications for `COSC2758` (two Selected) and one for `ISYS1101`.
pub(super) fn seeded_store() -> MemoryStore {
    let store = MemoryStore::default();
    store.put(raw(
        "a1",
        "alice@student.edu",
        COURSE,
        SessionType::Tutor,
        ApplicationStatus::Selected,
        Some(1),
    ));
    store.put(raw(
        "a2",
        "bob@student.edu",
        COURSE,
        SessionType::Tutor,
        ApplicationStatus::Selected,
        Some(2),
    ));
    store.put(raw(
        "a3",
        "carol@student.edu",
        COURSE,
        SessionType::Tutor,
        ApplicationStatus::Pending,
        None,
    ));
    store.put(raw(
        "a4",
        "alice@student.edu",
        OTHER_COURSE,
        SessionType::LabAssistant,
        ApplicationStatus::Rejected,
        None,
    ));
    store
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<BTreeMap<ApplicationId, RawApplication>>>,
}

impl MemoryStore {
    pub(super) fn put(&self, record: RawApplication) {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(record.id.clone(), record);
    }

    pub(super) fn get(&self, id: &str) -> RawApplication {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .get(&ApplicationId(id.to_string()))
            .cloned()
            .expect("record present")
    }

    fn matching(&self, predicate: impl Fn(&RawApplication) -> bool) -> Vec<RawApplication> {
        self.records
            .lock()
            .expect("store mutex poisoned")
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

impl ApplicationStore for MemoryStore {
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
        Ok(self
            .records
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
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
        self.modify(id, |record| record.ranking = ranking)?;
        Ok(true)
    }

    fn add_comment(&self, id: &ApplicationId, text: &str) -> Result<(), RepositoryError> {
        self.modify(id, |record| record.comments.push(text.to_string()))
    }
}

/// Serves reads from a seeded store but refuses every ranking write.
#[derive(Default, Clone)]
pub(super) struct RefusingStore {
    pub(super) inner: MemoryStore,
}

impl ApplicationStore for RefusingStore {
    fn applications_for_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<RawApplication>, RepositoryError> {
        self.inner.applications_for_course(course_id)
    }

    fn all_applications(&self) -> Result<Vec<RawApplication>, RepositoryError> {
        self.inner.all_applications()
    }

    fn selected_applications(&self) -> Result<Vec<RawApplication>, RepositoryError> {
        self.inner.selected_applications()
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<RawApplication>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn update_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.update_application_status(id, status)
    }

    fn update_application_ranking(
        &self,
        _id: &ApplicationId,
        _ranking: Option<u32>,
    ) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn add_comment(&self, id: &ApplicationId, text: &str) -> Result<(), RepositoryError> {
        self.inner.add_comment(id, text)
    }
}

pub(super) struct UnavailableStore;

impl ApplicationStore for UnavailableStore {
    fn applications_for_course(
        &self,
        _course_id: &CourseId,
    ) -> Result<Vec<RawApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all_applications(&self) -> Result<Vec<RawApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn selected_applications(&self) -> Result<Vec<RawApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<RawApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_application_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_application_ranking(
        &self,
        _id: &ApplicationId,
        _ranking: Option<u32>,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn add_comment(&self, _id: &ApplicationId, _text: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryCatalog {
    courses: HashMap<CourseId, CourseDetails>,
}

impl MemoryCatalog {
    pub(super) fn standard() -> Self {
        let mut courses = HashMap::new();
        courses.insert(
            CourseId(COURSE.to_string()),
            CourseDetails {
                code: COURSE.to_string(),
                name: "Full Stack Development".to_string(),
            },
        );
        Self { courses }
    }
}

impl CourseCatalog for MemoryCatalog {
    fn course_details(&self, course_id: &CourseId) -> Option<CourseDetails> {
        self.courses.get(course_id).cloned()
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    users: HashMap<String, UserData>,
}

impl MemoryDirectory {
    pub(super) fn standard() -> Self {
        let mut users = HashMap::new();
        for (name, email, role) in [
            ("Alice Nguyen", "alice@student.edu", UserRole::Candidate),
            ("Bob Smith", "bob@student.edu", UserRole::Candidate),
            ("Dr Rivera", "rivera@uni.edu", UserRole::Lecturer),
            ("Admin", "admin@uni.edu", UserRole::Admin),
        ] {
            users.insert(
                email.to_string(),
                UserData {
                    name: name.to_string(),
                    email: email.to_string(),
                    role,
                },
            );
        }
        Self { users }
    }
}

impl UserDirectory for MemoryDirectory {
    fn user_data(&self, email: &str) -> Option<UserData> {
        self.users.get(email).cloned()
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<UnavailabilityNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<UnavailabilityNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl NoticePublisher for MemoryNotices {
    fn publish(&self, notice: UnavailabilityNotice) -> Result<(), NoticeError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) fn service_with<S: ApplicationStore + 'static>(
    store: Arc<S>,
    notices: Arc<MemoryNotices>,
) -> SelectionService<S, MemoryNotices> {
    SelectionService::new(
        store,
        notices,
        Arc::new(MemoryCatalog::standard()),
        Arc::new(MemoryDirectory::standard()),
    )
}

pub(super) fn build_service() -> (
    SelectionService<MemoryStore, MemoryNotices>,
    Arc<MemoryStore>,
    Arc<MemoryNotices>,
) {
    let store = Arc::new(seeded_store());
    let notices = Arc::new(MemoryNotices::default());
    let service = service_with(store.clone(), notices.clone());
    (service, store, notices)
}

pub(super) fn router_with<S: ApplicationStore + 'static>(
    service: SelectionService<S, MemoryNotices>,
) -> (axum::Router, Arc<SessionRegistry>) {
    let sessions = Arc::new(SessionRegistry::default());
    let router = selection_router(Arc::new(service), sessions.clone());
    (router, sessions)
}

pub(super) fn login(sessions: &SessionRegistry, email: &str) -> String {
    let user = MemoryDirectory::standard()
        .user_data(email)
        .expect("known user");
    sessions.open(user).token.0
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<axum::body::Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(SESSION_HEADER, token);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            axum::body::Body::from(serde_json::to_vec(&value).expect("serialize body"))
        }
        None => axum::body::Body::empty(),
    };
    builder.body(body).expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    assert_ne!(response.status(), StatusCode::NO_CONTENT);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
