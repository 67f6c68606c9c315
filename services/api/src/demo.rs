use crate::infra::{build_service, MemoryService, RosterSource};
use clap::Args;
use newsroom_workload::config::EngineConfig;
use newsroom_workload::error::AppError;
use newsroom_workload::workload::seed::JUNIOR_EDITOR;
use newsroom_workload::workload::{
    AssignmentRequest, EmployeeDraft, RedistributionReport, RoundingPolicy, Unit, UnitDetails,
    WorkloadServiceError,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Units CSV export (name,monthly_articles,complexity,description)
    #[arg(long, requires = "employees")]
    pub(crate) units: Option<PathBuf>,
    /// Employees CSV export (name,email,role,preferred_units)
    #[arg(long, requires = "units")]
    pub(crate) employees: Option<PathBuf>,
    /// Only print the named unit
    #[arg(long)]
    pub(crate) unit: Option<String>,
    /// Do not assign employees to their preferred units
    #[arg(long)]
    pub(crate) no_preferences: bool,
    /// Rounding policy: largest-remainder (default) or nearest
    #[arg(long, value_parser = parse_rounding)]
    pub(crate) rounding: Option<RoundingPolicy>,
    /// Include per-employee scores
    #[arg(long)]
    pub(crate) scores: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Unit used for the assignment walkthrough
    #[arg(long, default_value = "News")]
    pub(crate) unit: String,
}

pub(crate) fn parse_rounding(raw: &str) -> Result<RoundingPolicy, String> {
    RoundingPolicy::parse(raw)
        .ok_or_else(|| format!("unknown rounding policy '{raw}' (largest-remainder|nearest)"))
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        units,
        employees,
        unit,
        no_preferences,
        rounding,
        scores,
    } = args;

    let engine = EngineConfig {
        rounding: rounding.unwrap_or_default(),
        ..EngineConfig::default()
    };
    let (source, label) = match (units.as_deref(), employees.as_deref()) {
        (Some(units), Some(employees)) => (RosterSource::Csv { units, employees }, "CSV import"),
        _ => (RosterSource::Sample, "sample newsroom"),
    };
    let (service, summary) = build_service(engine, source, !no_preferences)?;

    println!("Newsroom workload report");
    println!(
        "Roster: {} units | {} employees | {} assignments ({label})",
        summary.units, summary.employees, summary.assignments
    );

    let selected = match unit {
        Some(name) => vec![find_unit(&service, &name)?],
        None => service.list_units()?,
    };
    for unit in &selected {
        render_unit(&service.unit_details(unit.id)?);
    }

    render_norms(&service)?;
    if scores {
        render_scores(&service, usize::MAX)?;
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let (service, summary) = build_service(EngineConfig::default(), RosterSource::Sample, true)?;

    println!("Newsroom workload demo");
    println!(
        "Sample newsroom: {} units | {} employees | {} assignments",
        summary.units, summary.employees, summary.assignments
    );

    let unit = find_unit(&service, &args.unit)?;
    render_unit(&service.unit_details(unit.id)?);

    let newcomer = service.create_employee(EmployeeDraft {
        name: "Demo Junior".to_string(),
        email: None,
        role: JUNIOR_EDITOR.to_string(),
        preferred_units: vec![unit.name.clone()],
    })?;

    println!("\nAssigning {} ({}) to {}", newcomer.name, newcomer.role, unit.name);
    let added = service.add_assignment(AssignmentRequest {
        employee_id: newcomer.id,
        unit_id: unit.id,
        action: None,
    })?;
    render_redistribution(&added.redistribution);
    render_unit(&service.unit_details(unit.id)?);

    println!("\nRemoving {} from {}", newcomer.name, unit.name);
    let removed = service.remove_assignment(added.assignment.id)?;
    render_redistribution(&removed.redistribution);

    render_norms(&service)?;
    render_scores(&service, 5)?;
    Ok(())
}

fn find_unit(service: &MemoryService, name: &str) -> Result<Unit, AppError> {
    service
        .list_units()?
        .into_iter()
        .find(|unit| unit.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| {
            AppError::Workload(WorkloadServiceError::InvalidInput(format!(
                "unknown unit '{name}'"
            )))
        })
}

fn render_unit(details: &UnitDetails) {
    let unit = &details.unit;
    println!(
        "\n{} ({} articles/month, {} complexity)",
        unit.name, unit.monthly_articles, unit.complexity
    );

    if details.members.is_empty() {
        println!("  No assignments");
    }
    for member in &details.members {
        println!(
            "  - {} [{}] {}: {:.0}% -> {} articles | score {:.2}",
            member.employee_name,
            member.role_label,
            member.action_label,
            member.percentage,
            member.articles_assigned,
            member.score.total
        );
    }

    for error in &details.validation.errors {
        println!("  ! {error}");
    }
    for warning in &details.validation.warnings {
        println!("  ~ {warning}");
    }
}

fn render_redistribution(report: &RedistributionReport) {
    println!("Redistribution ({} articles/month)", report.monthly_articles);
    for entry in &report.redistributions {
        println!(
            "  - {} ({}): {:.0}% -> {:.0}% ({} articles)",
            entry.employee_name,
            entry.role,
            entry.old_percentage,
            entry.new_percentage,
            entry.articles_assigned
        );
    }
    println!("  Total coverage {:.0}%", report.total_coverage);
}

fn render_norms(service: &MemoryService) -> Result<(), AppError> {
    let norms = service.workload_norms()?;
    println!(
        "\nWorkload norm: {} articles over {:.2} capacity -> {} articles per full-capacity employee",
        norms.total_articles, norms.total_capacity, norms.norm_per_employee
    );

    let overloaded: Vec<_> = service
        .employee_workloads()?
        .into_iter()
        .filter(|workload| workload.assessment.overloaded)
        .collect();
    if overloaded.is_empty() {
        println!("No employee above their norm");
    } else {
        println!("Above norm:");
        for workload in overloaded {
            println!(
                "  - {} ({}): {} of {} articles ({}%)",
                workload.employee_name,
                workload.role,
                workload.assessment.actual_articles,
                workload.assessment.norm,
                workload.assessment.load_percentage
            );
        }
    }

    Ok(())
}

fn render_scores(service: &MemoryService, limit: usize) -> Result<(), AppError> {
    let mut scores = Vec::new();
    for employee in service.list_employees()? {
        scores.push(service.employee_scoring(employee.id)?);
    }
    scores.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

    println!("\nScores");
    for scoring in scores.iter().take(limit) {
        println!(
            "  - {} ({}): {:.2} across {} unit(s)",
            scoring.employee_name,
            scoring.role,
            scoring.total_score,
            scoring.units.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_flag_accepts_both_policies() {
        assert_eq!(
            parse_rounding("largest-remainder"),
            Ok(RoundingPolicy::LargestRemainder)
        );
        assert_eq!(parse_rounding("Nearest"), Ok(RoundingPolicy::Nearest));
        assert!(parse_rounding("banker").is_err());
    }

    #[test]
    fn report_rejects_unknown_unit() {
        let result = run_report(ReportArgs {
            unit: Some("Astrology".to_string()),
            ..ReportArgs::default()
        });

        assert!(matches!(
            result,
            Err(AppError::Workload(WorkloadServiceError::InvalidInput(_)))
        ));
    }

    #[test]
    fn demo_walkthrough_completes() {
        run_demo(DemoArgs {
            unit: "medicine".to_string(),
        })
        .expect("demo runs");
    }
}
