//! Workload allocation and scoring for editorial units.
//!
//! `engine` and `catalog` are pure; `service` wraps them with persistence, per-unit locking
//! and logging; `router` exposes the service over HTTP.

pub mod catalog;
pub mod domain;
pub mod engine;
pub mod import;
pub mod memory;
pub mod repository;
pub mod router;
pub mod seed;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, MissingRulePolicy, RoleCatalog, ScoringError, ScoringTable};
pub use domain::{
    ActionKind, Assignment, AssignmentId, AssignmentRequest, ComplexityTier, Employee,
    EmployeeDraft, EmployeeId, Role, RoleCategory, RoleDisplay, RoleDraft, RoleId,
    ScoringRule, ScoringRuleDraft, Unit, UnitDraft, UnitId, UnitSnapshot,
};
pub use engine::{
    Allocation, AllocationCalculator, AllocationEntry, AllocationError, LoadAssessment,
    RoundingPolicy, ScoreCard, UnitAggregates, ValidationReport, WorkBreakdown, WorkloadNorm,
};
pub use import::{RosterImportError, RosterImporter};
pub use memory::InMemoryWorkloadRepository;
pub use repository::{RepositoryError, WorkloadRepository};
pub use router::workload_router;
pub use seed::{load_sample_newsroom, SeedSummary};
pub use service::{WorkloadService, WorkloadServiceError};
pub use views::{
    AnalyticsReport, AssignmentChange, AssignmentView, EmployeeScoring, EmployeeWorkload,
    MemberDetail, RedistributionEntry, RedistributionReport, UnitCoverage, UnitDetails,
    UnitScore,
};
