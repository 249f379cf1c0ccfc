use std::sync::Arc;

use tracing::{debug, info, warn};

use super::adapter::adapt_all;
use super::domain::{
    ApplicationDisplay, ApplicationId, ApplicationStatus, CourseId, RawApplication,
    UnavailabilityNotice, UserData,
};
use super::filter::{filter_applications, SearchCriteria};
use super::ranking::{self, RankChange, RankingError, RankingOutcome};
use super::repository::{
    ApplicationStore, CourseCatalog, NoticeError, NoticePublisher, RepositoryError, UserDirectory,
};
use super::statistics::{aggregate, Statistics};

/// Service composing the application store, lookups, and the selection core.
///
/// Holds no state between calls: every operation reads the current records, transforms
/// them, and writes back only what changed.
pub struct SelectionService<S, N> {
    store: Arc<S>,
    notices: Arc<N>,
    catalog: Arc<dyn CourseCatalog>,
    directory: Arc<dyn UserDirectory>,
}

impl<S, N> SelectionService<S, N>
where
    S: ApplicationStore + 'static,
    N: NoticePublisher + 'static,
{
    pub fn new(
        store: Arc<S>,
        notices: Arc<N>,
        catalog: Arc<dyn CourseCatalog>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            store,
            notices,
            catalog,
            directory,
        }
    }

    pub fn applications_for_course(
        &self,
        course_id: &CourseId,
        criteria: &SearchCriteria,
    ) -> Result<Vec<ApplicationDisplay>, SelectionServiceError> {
        let displays = self.display(self.store.applications_for_course(course_id)?);
        Ok(filter_applications(&displays, criteria))
    }

    pub fn all_applications(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<ApplicationDisplay>, SelectionServiceError> {
        let displays = self.display(self.store.all_applications()?);
        Ok(filter_applications(&displays, criteria))
    }

    pub fn selected_applications(&self) -> Result<Vec<ApplicationDisplay>, SelectionServiceError> {
        Ok(self.display(self.store.selected_applications()?))
    }

    /// Recompute dashboard statistics over the (optionally filtered) collection.
    pub fn statistics(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Statistics, SelectionServiceError> {
        let applications = self.all_applications(criteria)?;
        Ok(aggregate(&applications))
    }

    pub fn set_ranking(
        &self,
        id: &ApplicationId,
        rank: u32,
    ) -> Result<RankingOutcome, SelectionServiceError> {
        let mut group = self.load_course_of(id)?;
        let outcome = ranking::set_ranking(&mut group, id, rank)?;
        info!(application_id = %id, rank, moved = outcome.changes.len(), "ranking updated");
        self.persist(&outcome)?;
        Ok(outcome)
    }

    pub fn change_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        rank: Option<u32>,
    ) -> Result<RankingOutcome, SelectionServiceError> {
        let mut group = self.load_course_of(id)?;
        let outcome = ranking::change_status(&mut group, id, status, rank)?;
        info!(
            application_id = %id,
            status = status.label(),
            moved = outcome.changes.len(),
            "application status changed"
        );
        self.persist(&outcome)?;
        Ok(outcome)
    }

    pub fn add_comment(&self, id: &ApplicationId, text: &str) -> Result<(), SelectionServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SelectionServiceError::EmptyComment);
        }

        self.store.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        self.store.add_comment(id, text)?;
        debug!(application_id = %id, "comment appended");
        Ok(())
    }

    pub fn mark_unavailable(
        &self,
        notice: UnavailabilityNotice,
    ) -> Result<(), SelectionServiceError> {
        if notice.candidate_email.trim().is_empty() {
            return Err(SelectionServiceError::MissingCandidate);
        }

        info!(unavailable = notice.unavailable, "publishing candidate availability notice");
        self.notices.publish(notice)?;
        Ok(())
    }

    pub fn user(&self, email: &str) -> Option<UserData> {
        self.directory.user_data(email)
    }

    fn display(&self, raws: Vec<RawApplication>) -> Vec<ApplicationDisplay> {
        adapt_all(raws, self.catalog.as_ref(), self.directory.as_ref())
    }

    /// Every application in the target's course; the ranking functions pick out the group.
    fn load_course_of(
        &self,
        id: &ApplicationId,
    ) -> Result<Vec<ApplicationDisplay>, SelectionServiceError> {
        let target = self.store.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let course = self.store.applications_for_course(&target.course_id)?;
        Ok(self.display(course))
    }

    /// Entering Selected writes the rank before the status, so a refused rank never leaves
    /// an unranked Selected record behind. Leaving Selected writes the status first.
    fn persist(&self, outcome: &RankingOutcome) -> Result<(), SelectionServiceError> {
        for change in &outcome.changes {
            let entering_selection =
                change.status_changed && change.status == ApplicationStatus::Selected;

            if change.status_changed && !entering_selection {
                self.write_status(change)?;
            }
            self.write_ranking(change)?;
            if entering_selection {
                self.write_status(change)?;
            }
        }
        Ok(())
    }

    fn write_status(&self, change: &RankChange) -> Result<(), SelectionServiceError> {
        self.store
            .update_application_status(&change.id, change.status)
            .inspect_err(|err| {
                warn!(application_id = %change.id, %err, "status write failed");
            })?;
        Ok(())
    }

    fn write_ranking(&self, change: &RankChange) -> Result<(), SelectionServiceError> {
        let accepted = self
            .store
            .update_application_ranking(&change.id, change.ranking)
            .inspect_err(|err| {
                warn!(application_id = %change.id, %err, "ranking write failed");
            })?;
        if !accepted {
            warn!(application_id = %change.id, "store refused ranking update");
            return Err(SelectionServiceError::RankingNotSaved(change.id.clone()));
        }
        Ok(())
    }
}

/// Error raised by the selection service.
#[derive(Debug, thiserror::Error)]
pub enum SelectionServiceError {
    #[error(transparent)]
    Ranking(#[from] RankingError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notice(#[from] NoticeError),
    #[error("failed to save ranking for {0}, please retry")]
    RankingNotSaved(ApplicationId),
    #[error("comment text must not be empty")]
    EmptyComment,
    #[error("notice must name a candidate")]
    MissingCandidate,
}
