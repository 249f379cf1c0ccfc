//! Rank maintenance for Selected applications.
//!
//! Ranks are scoped to a selected group: every Selected application sharing a course and
//! session type. After any mutation the group's ranks are exactly `1..=n`. Each operation
//! renumbers the whole group, so gaps or duplicates read back from the store are repaired
//! the next time the group is touched.

use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{ApplicationDisplay, ApplicationId, ApplicationStatus, CourseId, SessionType};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankingError {
    #[error("rank {requested} is outside 1..={max}")]
    InvalidRank { requested: u32, max: u32 },
    #[error("application {0} is not selected")]
    NotSelected(ApplicationId),
    #[error("application {0} is not part of this group")]
    UnknownApplication(ApplicationId),
}

/// Status and ranking an application ended up with after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankChange {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub ranking: Option<u32>,
    pub status_changed: bool,
}

/// Every application whose status or ranking moved. Callers write exactly these back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankingOutcome {
    pub changes: Vec<RankChange>,
}

impl RankingOutcome {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn change_for(&self, id: &ApplicationId) -> Option<&RankChange> {
        self.changes.iter().find(|change| &change.id == id)
    }
}

/// Move a Selected application to `new_rank`, shifting the applications in between by one.
pub fn set_ranking(
    applications: &mut [ApplicationDisplay],
    id: &ApplicationId,
    new_rank: u32,
) -> Result<RankingOutcome, RankingError> {
    let target = position_of(applications, id)?;
    if !applications[target].is_selected() {
        return Err(RankingError::NotSelected(id.clone()));
    }

    let (course_id, session_type) = group_key(&applications[target]);
    let mut order = ranked_order(applications, &course_id, session_type);
    let max = order.len() as u32;
    check_bounds(new_rank, max)?;

    let snapshot = snapshot(applications, &course_id, session_type);
    order.retain(|&index| index != target);
    order.insert((new_rank - 1) as usize, target);
    renumber(applications, &order);

    Ok(diff(applications, snapshot))
}

/// Transition an application's status, keeping its group's ranks contiguous.
///
/// Selecting appends to the end of the group unless `explicit_rank` is given, in which
/// case the application is inserted at that rank. Leaving Selected clears the ranking and
/// closes the gap.
pub fn change_status(
    applications: &mut [ApplicationDisplay],
    id: &ApplicationId,
    status: ApplicationStatus,
    explicit_rank: Option<u32>,
) -> Result<RankingOutcome, RankingError> {
    let target = position_of(applications, id)?;
    let was_selected = applications[target].is_selected();

    if was_selected && status == ApplicationStatus::Selected {
        return match explicit_rank {
            Some(rank) => set_ranking(applications, id, rank),
            None => {
                let (course_id, session_type) = group_key(&applications[target]);
                Ok(compact_group(applications, &course_id, session_type))
            }
        };
    }

    let (course_id, session_type) = group_key(&applications[target]);
    let mut order = ranked_order(applications, &course_id, session_type);
    order.retain(|&index| index != target);

    if status == ApplicationStatus::Selected {
        let max = order.len() as u32 + 1;
        let rank = explicit_rank.unwrap_or(max);
        check_bounds(rank, max)?;
        order.insert((rank - 1) as usize, target);
    } else if explicit_rank.is_some() {
        return Err(RankingError::NotSelected(id.clone()));
    }

    let snapshot = snapshot(applications, &course_id, session_type);
    applications[target].status = status;
    if status != ApplicationStatus::Selected {
        applications[target].ranking = None;
    }
    renumber(applications, &order);

    Ok(diff(applications, snapshot))
}

/// Renumber a group to `1..=n` in its current rank order, ties broken by submission time.
pub fn compact_group(
    applications: &mut [ApplicationDisplay],
    course_id: &CourseId,
    session_type: SessionType,
) -> RankingOutcome {
    let snapshot = snapshot(applications, course_id, session_type);
    let order = ranked_order(applications, course_id, session_type);
    for application in applications.iter_mut() {
        if application.in_group(course_id, session_type) && !application.is_selected() {
            application.ranking = None;
        }
    }
    renumber(applications, &order);
    diff(applications, snapshot)
}

/// A group whose Selected ranks are not exactly `1..=n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContiguityViolation {
    pub course_id: CourseId,
    pub session_type: SessionType,
    pub ranks: Vec<Option<u32>>,
}

/// Check the ranking invariants for every group present in `applications`.
pub fn verify_contiguity(applications: &[ApplicationDisplay]) -> Vec<ContiguityViolation> {
    let mut groups: BTreeMap<(CourseId, SessionType), Vec<Option<u32>>> = BTreeMap::new();
    let mut stray: BTreeMap<(CourseId, SessionType), Vec<Option<u32>>> = BTreeMap::new();

    for application in applications {
        let key = group_key(application);
        if application.is_selected() {
            groups.entry(key).or_default().push(application.ranking);
        } else if application.ranking.is_some() {
            stray.entry(key).or_default().push(application.ranking);
        }
    }

    let mut violations = Vec::new();
    for ((course_id, session_type), mut ranks) in groups {
        let has_stray = stray.remove(&(course_id.clone(), session_type)).is_some();
        ranks.sort();
        let expected: Vec<Option<u32>> = (1..=ranks.len() as u32).map(Some).collect();
        if ranks != expected || has_stray {
            violations.push(ContiguityViolation {
                course_id,
                session_type,
                ranks,
            });
        }
    }

    for ((course_id, session_type), ranks) in stray {
        violations.push(ContiguityViolation {
            course_id,
            session_type,
            ranks,
        });
    }

    violations
}

fn position_of(
    applications: &[ApplicationDisplay],
    id: &ApplicationId,
) -> Result<usize, RankingError> {
    applications
        .iter()
        .position(|application| &application.id == id)
        .ok_or_else(|| RankingError::UnknownApplication(id.clone()))
}

fn group_key(application: &ApplicationDisplay) -> (CourseId, SessionType) {
    (application.course_id.clone(), application.session_type)
}

fn check_bounds(rank: u32, max: u32) -> Result<(), RankingError> {
    if rank < 1 || rank > max {
        return Err(RankingError::InvalidRank {
            requested: rank,
            max,
        });
    }
    Ok(())
}

/// Indices of the group's Selected applications in rank order. Unranked entries sort last.
fn ranked_order(
    applications: &[ApplicationDisplay],
    course_id: &CourseId,
    session_type: SessionType,
) -> Vec<usize> {
    let mut order: Vec<usize> = applications
        .iter()
        .enumerate()
        .filter(|(_, application)| {
            application.in_group(course_id, session_type) && application.is_selected()
        })
        .map(|(index, _)| index)
        .collect();

    order.sort_by(|&left, &right| {
        let left = &applications[left];
        let right = &applications[right];
        left.ranking
            .unwrap_or(u32::MAX)
            .cmp(&right.ranking.unwrap_or(u32::MAX))
            .then_with(|| left.created_at.cmp(&right.created_at))
            .then_with(|| left.id.cmp(&right.id))
    });
    order
}

fn renumber(applications: &mut [ApplicationDisplay], order: &[usize]) {
    for (position, &index) in order.iter().enumerate() {
        applications[index].ranking = Some(position as u32 + 1);
    }
}

type Snapshot = Vec<(usize, ApplicationStatus, Option<u32>)>;

fn snapshot(
    applications: &[ApplicationDisplay],
    course_id: &CourseId,
    session_type: SessionType,
) -> Snapshot {
    applications
        .iter()
        .enumerate()
        .filter(|(_, application)| application.in_group(course_id, session_type))
        .map(|(index, application)| (index, application.status, application.ranking))
        .collect()
}

fn diff(applications: &[ApplicationDisplay], before: Snapshot) -> RankingOutcome {
    let changes = before
        .into_iter()
        .filter_map(|(index, status, ranking)| {
            let current = &applications[index];
            if current.status == status && current.ranking == ranking {
                return None;
            }
            Some(RankChange {
                id: current.id.clone(),
                status: current.status,
                ranking: current.ranking,
                status_changed: current.status != status,
            })
        })
        .collect();

    RankingOutcome { changes }
}
