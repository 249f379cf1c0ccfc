//! Applicant search, filtering, ranking, and statistics.
//!
//! `adapter`, `filter`, `ranking`, and `statistics` are pure transformations over display
//! records. `service` is the only layer that talks to the store, and `router` exposes the
//! service over HTTP.

pub mod adapter;
pub mod domain;
pub mod filter;
pub mod import;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;
pub mod statistics;

#[cfg(test)]
mod tests;

pub use adapter::{adapt, adapt_all};
pub use domain::{
    ApplicationDisplay, ApplicationId, ApplicationStatus, Availability, CourseDetails, CourseId,
    RawApplication, SessionType, UnavailabilityNotice, UserData, UserRole,
};
pub use filter::{filter, filter_applications, SearchCriteria};
pub use import::{ApplicationImporter, ImportError};
pub use ranking::{
    change_status, compact_group, set_ranking, verify_contiguity, RankChange, RankingError,
    RankingOutcome,
};
pub use repository::{
    ApplicationStore, CourseCatalog, NoticeError, NoticePublisher, RepositoryError, UserDirectory,
};
pub use router::selection_router;
pub use service::{SelectionService, SelectionServiceError};
pub use statistics::{aggregate, ApplicantName, CandidateTally, Statistics};
