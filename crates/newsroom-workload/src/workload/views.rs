use serde::Serialize;

use super::domain::{
    ActionKind, Assignment, AssignmentId, ComplexityTier, EmployeeId, Unit, UnitId,
};
use super::engine::{
    LoadAssessment, ScoreCard, UnitAggregates, ValidationReport, WorkBreakdown, WorkloadNorm,
};

/// Assignment joined with the employee, role and unit fields callers display.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub id: AssignmentId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub role: String,
    pub capacity_weight: f64,
    pub unit_id: UnitId,
    pub unit_name: String,
    pub monthly_articles: u32,
    pub complexity: ComplexityTier,
    pub action: ActionKind,
    pub percentage: f64,
    pub articles_assigned: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedistributionEntry {
    pub assignment_id: AssignmentId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub role: String,
    pub old_percentage: f64,
    pub new_percentage: f64,
    pub articles_assigned: u32,
}

/// Outcome of recomputing every share in a unit.
#[derive(Debug, Clone, Serialize)]
pub struct RedistributionReport {
    pub unit_id: UnitId,
    pub monthly_articles: u32,
    pub total_coverage: f64,
    pub redistributions: Vec<RedistributionEntry>,
}

/// Result of a membership change: the touched assignment and the unit's new split.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentChange {
    pub assignment: Assignment,
    pub redistribution: RedistributionReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberDetail {
    pub assignment_id: AssignmentId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub role: String,
    pub role_label: String,
    pub capacity_weight: f64,
    pub action: ActionKind,
    pub action_label: &'static str,
    pub percentage: f64,
    pub articles_assigned: u32,
    pub breakdown: WorkBreakdown,
    pub score: ScoreCard,
}

/// Per-member breakdown and scoring for one unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitDetails {
    pub unit: Unit,
    pub aggregates: UnitAggregates,
    pub members: Vec<MemberDetail>,
    pub validation: ValidationReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitScore {
    pub unit_id: UnitId,
    pub unit_name: String,
    pub complexity: ComplexityTier,
    pub action: ActionKind,
    pub percentage: f64,
    pub articles_assigned: u32,
    pub breakdown: WorkBreakdown,
    pub score: ScoreCard,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeScoring {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub role: String,
    pub units: Vec<UnitScore>,
    pub total_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeWorkload {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub role: String,
    pub capacity_weight: f64,
    pub assigned_units: usize,
    pub total_percentage: f64,
    pub assessment: LoadAssessment,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitCoverage {
    pub unit_id: UnitId,
    pub unit_name: String,
    pub monthly_articles: u32,
    pub complexity: ComplexityTier,
    pub weighted_articles: f64,
    pub assigned_employees: usize,
    pub total_percentage: f64,
    pub coverage_percentage: f64,
    pub articles_allocated: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub units: Vec<UnitCoverage>,
    pub norms: WorkloadNorm,
}
