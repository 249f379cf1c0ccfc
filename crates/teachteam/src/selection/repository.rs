use super::domain::{
    ApplicationId, ApplicationStatus, CourseDetails, CourseId, RawApplication,
    UnavailabilityNotice, UserData,
};

/// Persistence boundary for application records.
///
/// Implementations are expected to be last-write-wins; callers never retry.
pub trait ApplicationStore: Send + Sync {
    fn applications_for_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<RawApplication>, RepositoryError>;
    fn all_applications(&self) -> Result<Vec<RawApplication>, RepositoryError>;
    fn selected_applications(&self) -> Result<Vec<RawApplication>, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<RawApplication>, RepositoryError>;
    fn update_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), RepositoryError>;
    /// Returns `false` when the store refused the ranking without failing outright.
    fn update_application_ranking(
        &self,
        id: &ApplicationId,
        ranking: Option<u32>,
    ) -> Result<bool, RepositoryError>;
    fn add_comment(&self, id: &ApplicationId, text: &str) -> Result<(), RepositoryError>;
}

/// Course metadata lookup. A miss is reported as `None`, never as an error.
pub trait CourseCatalog: Send + Sync {
    fn course_details(&self, course_id: &CourseId) -> Option<CourseDetails>;
}

/// Candidate and staff lookup keyed by email.
pub trait UserDirectory: Send + Sync {
    fn user_data(&self, email: &str) -> Option<UserData>;
}

/// Outbound hook for the admin "mark unavailable" notification.
pub trait NoticePublisher: Send + Sync {
    fn publish(&self, notice: UnavailabilityNotice) -> Result<(), NoticeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice transport unavailable: {0}")]
    Transport(String),
}
