use crate::infra::{
    load_applications, parse_availability, InMemoryApplicationStore, InMemoryCourseCatalog,
    InMemoryNoticePublisher, InMemoryUserDirectory,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use teachteam::error::AppError;
use teachteam::selection::{
    ApplicationDisplay, ApplicationStatus, Availability, SearchCriteria, SelectionService,
    Statistics, UnavailabilityNotice,
};

type DemoService = SelectionService<InMemoryApplicationStore, InMemoryNoticePublisher>;

#[derive(Args, Debug, Default)]
pub(crate) struct SearchArgs {
    /// Match against course code or name
    #[arg(long)]
    pub(crate) course_name: Option<String>,
    /// Match against candidate name
    #[arg(long)]
    pub(crate) tutor_name: Option<String>,
    /// fulltime or parttime
    #[arg(long, value_parser = parse_availability)]
    pub(crate) availability: Option<Availability>,
    /// Match against any listed skill
    #[arg(long)]
    pub(crate) skill_set: Option<String>,
}

impl SearchArgs {
    fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            course_name: self.course_name.clone(),
            tutor_name: self.tutor_name.clone(),
            availability: self.availability,
            skill_set: self.skill_set.clone(),
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// CSV export to load instead of the bundled sample.
    #[arg(long)]
    pub(crate) seed_csv: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) search: SearchArgs,
    /// Skip the ranking portion of the demo.
    #[arg(long)]
    pub(crate) skip_ranking: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StatsArgs {
    /// CSV export to summarise instead of the bundled sample.
    #[arg(long)]
    pub(crate) seed_csv: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) search: SearchArgs,
}

fn build_service(
    seed_csv: Option<PathBuf>,
) -> Result<(Arc<DemoService>, Arc<InMemoryNoticePublisher>), AppError> {
    let applications = load_applications(seed_csv.as_deref())?;
    let notices = Arc::new(InMemoryNoticePublisher::default());
    let service = Arc::new(SelectionService::new(
        Arc::new(InMemoryApplicationStore::with_records(applications)),
        notices.clone(),
        Arc::new(InMemoryCourseCatalog::standard()),
        Arc::new(InMemoryUserDirectory::standard()),
    ));
    Ok((service, notices))
}

pub(crate) fn run_stats(args: StatsArgs) -> Result<(), AppError> {
    let (service, _) = build_service(args.seed_csv)?;
    let stats = service.statistics(&args.search.criteria())?;
    match serde_json::to_string_pretty(&stats) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Statistics unavailable: {err}"),
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seed_csv,
        search,
        skip_ranking,
    } = args;

    let (service, notices) = build_service(seed_csv)?;
    let criteria = search.criteria();

    println!("TeachTeam selection demo");
    let matches = service.all_applications(&criteria)?;
    if criteria.is_empty() {
        println!("\nAll applications ({})", matches.len());
    } else {
        println!("\nApplications matching search ({})", matches.len());
    }
    for application in &matches {
        print_application(application);
    }

    render_statistics(&service.statistics(&criteria)?);

    if skip_ranking {
        return Ok(());
    }

    let Some(target) = matches
        .iter()
        .find(|application| application.status == ApplicationStatus::Pending)
    else {
        println!("\nRanking demo: no pending application in the current search");
        return Ok(());
    };

    println!(
        "\nSelecting {} for {} at rank 1",
        target.candidate_name, target.course_code
    );
    match service.change_status(&target.id, ApplicationStatus::Selected, Some(1)) {
        Ok(outcome) => {
            for change in &outcome.changes {
                let rank = change
                    .ranking
                    .map(|rank| rank.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("  - {} -> {} (rank {})", change.id, change.status.label(), rank);
            }
        }
        Err(err) => {
            println!("  Ranking failed: {err}");
            return Ok(());
        }
    }

    let course = service.applications_for_course(&target.course_id, &SearchCriteria::default())?;
    let mut ranked: Vec<&ApplicationDisplay> = course
        .iter()
        .filter(|application| {
            application.session_type == target.session_type && application.ranking.is_some()
        })
        .collect();
    ranked.sort_by_key(|application| application.ranking);
    println!("\nRanked {} shortlist", target.session_type.label());
    for application in ranked {
        println!(
            "  {}. {}",
            application.ranking.unwrap_or_default(),
            application.candidate_name
        );
    }

    service.mark_unavailable(UnavailabilityNotice {
        candidate_email: target.candidate_email.clone(),
        unavailable: false,
        reason: Some("Selected in demo".to_string()),
    })?;
    println!("\nAvailability notices dispatched: {}", notices.events().len());

    Ok(())
}

fn print_application(application: &ApplicationDisplay) {
    let rank = application
        .ranking
        .map(|rank| format!(" #{rank}"))
        .unwrap_or_default();
    println!(
        "- [{}{}] {} -> {} {} ({}, {}) skills: {}",
        application.status.label(),
        rank,
        application.candidate_name,
        application.course_code,
        application.session_type.label(),
        application.course_name,
        application.availability.label(),
        application.skills.join(", ")
    );
}

fn render_statistics(stats: &Statistics) {
    println!("\nStatistics");
    println!(
        "- {} applicants | {} selected | {} pending | {} rejected",
        stats.total_applicants, stats.selected_count, stats.pending_count, stats.rejected_count
    );
    match (&stats.most_selected, &stats.least_selected) {
        (Some(most), Some(least)) => {
            println!("- Most selected: {} ({})", most.name, most.count);
            println!("- Least selected: {} ({})", least.name, least.count);
        }
        _ => println!("- No selected applicants yet"),
    }
    for course in &stats.per_course {
        println!(
            "- {} {}: {}/{} selected",
            course.course_code, course.course_name, course.selected, course.total
        );
    }
    if !stats.unselected_applicants.is_empty() {
        let names: Vec<&str> = stats
            .unselected_applicants
            .iter()
            .map(|applicant| applicant.name.as_str())
            .collect();
        println!("- Not selected: {}", names.join(", "));
    }
}
