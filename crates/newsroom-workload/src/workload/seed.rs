//! Default catalogs and a sample newsroom used by the API on start and by the demo commands.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{
    ActionKind, AssignmentRequest, ComplexityTier, EmployeeDraft, RoleDisplay, RoleDraft,
    ScoringRuleDraft, UnitDraft, UnitId,
};
use super::repository::WorkloadRepository;
use super::service::{WorkloadService, WorkloadServiceError};

pub const SENIOR_EDITOR: &str = "senior_editor";
pub const EDITOR: &str = "editor";
pub const JUNIOR_EDITOR: &str = "junior_editor";

/// Role catalog of the sample newsroom.
pub fn default_roles() -> Vec<RoleDraft> {
    vec![
        RoleDraft {
            name: SENIOR_EDITOR.to_string(),
            capacity_weight: 0.8,
            permitted_actions: vec![ActionKind::Review, ActionKind::SelfReview],
            display: RoleDisplay {
                description: Some("Senior editor".to_string()),
                badge_color_bg: "bg-blue-100".to_string(),
                badge_color_text: "text-blue-800".to_string(),
            },
        },
        RoleDraft {
            name: EDITOR.to_string(),
            capacity_weight: 1.0,
            permitted_actions: vec![ActionKind::SelfReview],
            display: RoleDisplay {
                description: Some("Editor".to_string()),
                badge_color_bg: "bg-green-100".to_string(),
                badge_color_text: "text-green-800".to_string(),
            },
        },
        RoleDraft {
            name: JUNIOR_EDITOR.to_string(),
            capacity_weight: 1.3,
            permitted_actions: vec![ActionKind::Production],
            display: RoleDisplay {
                description: Some("Junior editor".to_string()),
                badge_color_bg: "bg-yellow-100".to_string(),
                badge_color_text: "text-yellow-800".to_string(),
            },
        },
    ]
}

const fn base_points(action: ActionKind) -> f64 {
    match action {
        ActionKind::Production => 0.8,
        ActionKind::Review => 0.4,
        ActionKind::SelfReview => 0.5,
    }
}

/// Full scoring table: base points per action scaled by the tier coefficient.
pub fn default_scoring_rules() -> Vec<(ActionKind, ComplexityTier, ScoringRuleDraft)> {
    let mut rules = Vec::with_capacity(9);
    for action in ActionKind::ordered() {
        for complexity in ComplexityTier::ordered() {
            rules.push((
                action,
                complexity,
                ScoringRuleDraft {
                    points: base_points(action) * complexity.coefficient(),
                    description: Some(format!("{action} of {complexity} complexity")),
                },
            ));
        }
    }
    rules
}

const SAMPLE_UNITS: &[(&str, u32, ComplexityTier)] = &[
    ("Shorts", 50, ComplexityTier::Low),
    ("UGC", 80, ComplexityTier::Low),
    ("News", 176, ComplexityTier::Low),
    ("Lists", 25, ComplexityTier::Low),
    ("Quizzes", 15, ComplexityTier::Low),
    ("Comparisons", 10, ComplexityTier::Low),
    ("Statistics", 8, ComplexityTier::Low),
    ("Who Helps", 3, ComplexityTier::Low),
    ("Business", 11, ComplexityTier::Medium),
    ("Things", 86, ComplexityTier::Medium),
    ("Guides", 15, ComplexityTier::Medium),
    ("City", 8, ComplexityTier::Medium),
    ("Kids", 12, ComplexityTier::Medium),
    ("Food", 25, ComplexityTier::Medium),
    ("Animals", 18, ComplexityTier::Medium),
    ("Internet", 22, ComplexityTier::Medium),
    ("Interviews", 5, ComplexityTier::Medium),
    ("Real Estate", 15, ComplexityTier::Medium),
    ("Education", 20, ComplexityTier::Medium),
    ("Pop Culture", 30, ComplexityTier::Medium),
    ("Law", 12, ComplexityTier::Medium),
    ("Sport", 18, ComplexityTier::Medium),
    ("Tech", 45, ComplexityTier::Medium),
    ("Travel", 12, ComplexityTier::Medium),
    ("Reader Stories", 20, ComplexityTier::Medium),
    ("Reader Stories Micro", 15, ComplexityTier::Medium),
    ("Tuning", 25, ComplexityTier::Medium),
    ("Podcasts and Video", 40, ComplexityTier::Medium),
    ("Spending Diaries", 15, ComplexityTier::Medium),
    ("Jobs", 20, ComplexityTier::Medium),
    ("Features", 35, ComplexityTier::Medium),
    ("Medicine", 35, ComplexityTier::High),
    ("Brain", 28, ComplexityTier::High),
    ("Investments", 0, ComplexityTier::High),
];

const SAMPLE_EMPLOYEES: &[(&str, &str, &str, &[&str])] = &[
    ("Tsitseronova", "tsitseronova@example.com", SENIOR_EDITOR, &["Business", "Medicine", "Education"]),
    ("Tomas", "tomas@example.com", SENIOR_EDITOR, &["Tech", "Internet", "Features"]),
    ("Popova", "popova@example.com", SENIOR_EDITOR, &["Pop Culture", "Lists", "Quizzes"]),
    ("Afonina", "afonina@example.com", SENIOR_EDITOR, &["Kids", "Animals", "Travel"]),
    ("Geleta", "geleta@example.com", SENIOR_EDITOR, &["Sport", "Brain", "Statistics"]),
    ("Nedashkovskaya", "nedashkovskaya@example.com", SENIOR_EDITOR, &["Real Estate", "Investments", "Law"]),
    ("Panfilova", "panfilova@example.com", SENIOR_EDITOR, &["Guides", "Things", "Comparisons"]),
    ("Shalygin", "shalygin@example.com", SENIOR_EDITOR, &["News", "UGC", "Tuning"]),
    ("Sharakhmatova", "sharakhmatova@example.com", SENIOR_EDITOR, &["Podcasts and Video", "Spending Diaries", "Jobs"]),
    ("Gurtovaya", "gurtovaya@example.com", SENIOR_EDITOR, &["Interviews", "Who Helps", "Reader Stories"]),
    ("Tomberg", "tomberg@example.com", SENIOR_EDITOR, &["City", "Food", "Reader Stories Micro"]),
    ("Gotsmanova", "gotsmanova@example.com", SENIOR_EDITOR, &["Shorts", "Features"]),
    ("Pavlov", "pavlov@example.com", SENIOR_EDITOR, &["Business", "Medicine", "Tech"]),
    ("Timofeeva", "timofeeva@example.com", SENIOR_EDITOR, &["Education", "Law", "Pop Culture"]),
    ("Peresedova", "peresedova@example.com", SENIOR_EDITOR, &["Kids", "Animals", "Sport"]),
    ("Legostaeva", "legostaeva@example.com", SENIOR_EDITOR, &["Real Estate", "Investments", "Statistics"]),
    ("Botkina", "botkina@example.com", EDITOR, &["News", "UGC", "Sport"]),
    ("Cherkasova", "cherkasova@example.com", EDITOR, &["Business", "Medicine", "Tech"]),
    ("Deykina", "deykina@example.com", EDITOR, &["Guides", "Lists", "Quizzes"]),
    ("Zovutin", "zovutin@example.com", EDITOR, &["Internet", "Tech", "Features"]),
    ("Natasha Ivanova", "ivanova_n@example.com", EDITOR, &["Kids", "Animals", "Travel"]),
    ("Rubin", "rubin@example.com", EDITOR, &["Education", "Law", "Pop Culture"]),
    ("Khokhlov", "khokhlov@example.com", EDITOR, &["Real Estate", "Investments", "Statistics"]),
    ("Korepanov", "korepanov@example.com", EDITOR, &["Podcasts and Video", "Tuning", "Jobs"]),
    ("Moiseev", "moiseev@example.com", EDITOR, &["Brain", "Comparisons", "Shorts"]),
    ("Kozlov", "kozlov@example.com", JUNIOR_EDITOR, &["Guides", "Lists", "Quizzes"]),
    ("Smolyanko", "smolyanko@example.com", JUNIOR_EDITOR, &["Kids", "Animals", "Travel"]),
    ("Chernyy", "chernyy@example.com", JUNIOR_EDITOR, &["Sport", "Brain", "Statistics"]),
    ("Alina Ivanova", "ivanova_a@example.com", JUNIOR_EDITOR, &["Real Estate", "Investments", "Law"]),
    ("Nikitin", "nikitin@example.com", JUNIOR_EDITOR, &["Internet", "Tech", "Features"]),
    ("Domashenkov", "domashenkov@example.com", JUNIOR_EDITOR, &["Podcasts and Video", "Spending Diaries", "Jobs"]),
    ("Brezhneva", "brezhneva@example.com", JUNIOR_EDITOR, &["News", "UGC", "Tuning"]),
];

pub fn sample_units() -> Vec<UnitDraft> {
    SAMPLE_UNITS
        .iter()
        .map(|(name, monthly_articles, complexity)| UnitDraft {
            name: (*name).to_string(),
            monthly_articles: *monthly_articles,
            complexity: *complexity,
            description: None,
        })
        .collect()
}

pub fn sample_employees() -> Vec<EmployeeDraft> {
    SAMPLE_EMPLOYEES
        .iter()
        .map(|(name, email, role, preferred)| EmployeeDraft {
            name: (*name).to_string(),
            email: Some((*email).to_string()),
            role: (*role).to_string(),
            preferred_units: preferred.iter().map(|unit| (*unit).to_string()).collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub roles: usize,
    pub scoring_rules: usize,
    pub units: usize,
    pub employees: usize,
    pub assignments: usize,
}

/// Install the default role catalog and scoring table.
pub fn load_default_catalogs<R>(
    service: &WorkloadService<R>,
) -> Result<SeedSummary, WorkloadServiceError>
where
    R: WorkloadRepository + 'static,
{
    let mut summary = SeedSummary::default();
    for role in default_roles() {
        service.create_role(role)?;
        summary.roles += 1;
    }
    for (action, complexity, draft) in default_scoring_rules() {
        service.update_scoring_rule(action, complexity, draft)?;
        summary.scoring_rules += 1;
    }
    Ok(summary)
}

/// Create units and employees. With `assign_preferred`, every employee is also assigned to
/// each of their preferred units that exists in the roster.
pub fn load_roster<R>(
    service: &WorkloadService<R>,
    units: Vec<UnitDraft>,
    employees: Vec<EmployeeDraft>,
    assign_preferred: bool,
) -> Result<SeedSummary, WorkloadServiceError>
where
    R: WorkloadRepository + 'static,
{
    let mut summary = SeedSummary::default();

    let mut units_by_name: HashMap<String, UnitId> = HashMap::new();
    for draft in units {
        let unit = service.create_unit(draft)?;
        units_by_name.insert(unit.name.clone(), unit.id);
        summary.units += 1;
    }

    for draft in employees {
        let employee = service.create_employee(draft)?;
        summary.employees += 1;

        if !assign_preferred {
            continue;
        }
        for preferred in &employee.preferred_units {
            let Some(unit_id) = units_by_name.get(preferred) else {
                debug!(employee = %employee.id, unit = %preferred, "preferred unit not in roster");
                continue;
            };
            service.add_assignment(AssignmentRequest {
                employee_id: employee.id,
                unit_id: *unit_id,
                action: None,
            })?;
            summary.assignments += 1;
        }
    }

    Ok(summary)
}

/// Default catalogs plus the sample roster, loaded into an empty repository.
pub fn load_sample_newsroom<R>(
    service: &WorkloadService<R>,
    assign_preferred: bool,
) -> Result<SeedSummary, WorkloadServiceError>
where
    R: WorkloadRepository + 'static,
{
    let catalogs = load_default_catalogs(service)?;
    let roster = load_roster(service, sample_units(), sample_employees(), assign_preferred)?;
    let summary = SeedSummary {
        roles: catalogs.roles,
        scoring_rules: catalogs.scoring_rules,
        ..roster
    };

    info!(
        roles = summary.roles,
        units = summary.units,
        employees = summary.employees,
        assignments = summary.assignments,
        "sample newsroom loaded"
    );
    Ok(summary)
}
