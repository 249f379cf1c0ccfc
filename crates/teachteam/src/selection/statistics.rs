use serde::Serialize;

use super::domain::{ApplicationDisplay, ApplicationStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateTally {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSelectionSummary {
    pub course_code: String,
    pub course_name: String,
    pub total: usize,
    pub selected: usize,
}

/// Summary of an application collection for the lecturer and admin dashboards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_applicants: usize,
    pub selected_count: usize,
    pub pending_count: usize,
    pub rejected_count: usize,
    pub most_selected: Option<CandidateTally>,
    pub least_selected: Option<CandidateTally>,
    pub unselected_applicants: Vec<ApplicantName>,
    pub per_course: Vec<CourseSelectionSummary>,
}

pub fn aggregate(applications: &[ApplicationDisplay]) -> Statistics {
    let mut stats = Statistics {
        total_applicants: applications.len(),
        ..Statistics::default()
    };

    // first-seen order doubles as the tie breaker
    let mut tallies: Vec<CandidateTally> = Vec::new();

    for application in applications {
        match application.status {
            ApplicationStatus::Selected => {
                stats.selected_count += 1;
                match tallies
                    .iter_mut()
                    .find(|tally| tally.name == application.candidate_name)
                {
                    Some(tally) => tally.count += 1,
                    None => tallies.push(CandidateTally {
                        name: application.candidate_name.clone(),
                        count: 1,
                    }),
                }
            }
            ApplicationStatus::Pending => stats.pending_count += 1,
            ApplicationStatus::Rejected => stats.rejected_count += 1,
        }

        if !application.is_selected() {
            stats.unselected_applicants.push(ApplicantName {
                name: application.candidate_name.clone(),
            });
        }

        record_course(&mut stats.per_course, application);
    }

    stats.most_selected = first_by(&tallies, |candidate, best| candidate > best);
    stats.least_selected = first_by(&tallies, |candidate, best| candidate < best);
    stats
}

fn first_by(
    tallies: &[CandidateTally],
    better: impl Fn(usize, usize) -> bool,
) -> Option<CandidateTally> {
    let mut chosen: Option<&CandidateTally> = None;
    for tally in tallies {
        match chosen {
            Some(current) if !better(tally.count, current.count) => {}
            _ => chosen = Some(tally),
        }
    }
    chosen.cloned()
}

fn record_course(summaries: &mut Vec<CourseSelectionSummary>, application: &ApplicationDisplay) {
    let selected = usize::from(application.is_selected());
    match summaries
        .iter_mut()
        .find(|summary| summary.course_code == application.course_code)
    {
        Some(summary) => {
            summary.total += 1;
            summary.selected += selected;
        }
        None => summaries.push(CourseSelectionSummary {
            course_code: application.course_code.clone(),
            course_name: application.course_name.clone(),
            total: 1,
            selected,
        }),
    }
}
