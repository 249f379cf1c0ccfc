use super::common::*;
use crate::selection::domain::{ApplicationDisplay, ApplicationStatus, SessionType};
use crate::selection::statistics::{aggregate, ApplicantName, CandidateTally, Statistics};

fn with_status(id: &str, name: &str, status: ApplicationStatus) -> ApplicationDisplay {
    let ranking = (status == ApplicationStatus::Selected).then_some(1);
    display(id, name, SessionType::Tutor, status, ranking)
}

fn names(values: &[&str]) -> Vec<ApplicantName> {
    values
        .iter()
        .map(|name| ApplicantName {
            name: name.to_string(),
        })
        .collect()
}

#[test]
fn aggregates_counts_and_selection_leaders() {
    let applications = vec![
        with_status("1", "A", ApplicationStatus::Pending),
        with_status("2", "B", ApplicationStatus::Selected),
        with_status("3", "B", ApplicationStatus::Selected),
        with_status("4", "C", ApplicationStatus::Rejected),
    ];

    let stats = aggregate(&applications);

    assert_eq!(stats.total_applicants, 4);
    assert_eq!(stats.selected_count, 2);
    assert_eq!(stats.pending_count, 1);
    assert_eq!(stats.rejected_count, 1);
    assert_eq!(
        stats.most_selected,
        Some(CandidateTally {
            name: "B".to_string(),
            count: 2
        })
    );
    assert_eq!(stats.unselected_applicants, names(&["A", "C"]));
}

#[test]
fn empty_input_yields_zeroed_statistics() {
    let stats = aggregate(&[]);
    assert_eq!(stats, Statistics::default());
    assert!(stats.most_selected.is_none());
    assert!(stats.least_selected.is_none());
    assert!(stats.unselected_applicants.is_empty());
}

#[test]
fn no_selected_applications_leaves_leaders_absent() {
    let applications = vec![
        with_status("1", "A", ApplicationStatus::Pending),
        with_status("2", "B", ApplicationStatus::Rejected),
    ];
    let stats = aggregate(&applications);
    assert!(stats.most_selected.is_none());
    assert!(stats.least_selected.is_none());
    assert_eq!(stats.unselected_applicants, names(&["A", "B"]));
}

#[test]
fn ties_go_to_the_first_candidate_encountered() {
    let applications = vec![
        with_status("1", "Zoe", ApplicationStatus::Selected),
        with_status("2", "Yan", ApplicationStatus::Selected),
        with_status("3", "Xia", ApplicationStatus::Selected),
        with_status("4", "Yan", ApplicationStatus::Selected),
        with_status("5", "Xia", ApplicationStatus::Selected),
    ];

    let stats = aggregate(&applications);

    assert_eq!(
        stats.most_selected,
        Some(CandidateTally {
            name: "Yan".to_string(),
            count: 2
        })
    );
    assert_eq!(
        stats.least_selected,
        Some(CandidateTally {
            name: "Zoe".to_string(),
            count: 1
        })
    );
}

#[test]
fn aggregation_is_idempotent() {
    let applications = vec![
        with_status("1", "A", ApplicationStatus::Selected),
        with_status("2", "B", ApplicationStatus::Pending),
    ];
    assert_eq!(aggregate(&applications), aggregate(&applications));
}

#[test]
fn summarises_each_course_in_first_seen_order() {
    let mut database = with_status("3", "C", ApplicationStatus::Selected);
    database.course_code = "ISYS1101".to_string();
    database.course_name = "Database Concepts".to_string();
    let applications = vec![
        with_status("1", "A", ApplicationStatus::Selected),
        database,
        with_status("2", "B", ApplicationStatus::Pending),
    ];

    let stats = aggregate(&applications);

    assert_eq!(stats.per_course.len(), 2);
    assert_eq!(stats.per_course[0].course_code, COURSE);
    assert_eq!(stats.per_course[0].total, 2);
    assert_eq!(stats.per_course[0].selected, 1);
    assert_eq!(stats.per_course[1].course_code, "ISYS1101");
    assert_eq!(stats.per_course[1].selected, 1);
}
