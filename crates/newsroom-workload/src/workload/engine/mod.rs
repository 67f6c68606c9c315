//! Pure, synchronous workload computations. Nothing in here performs I/O or logging; callers
//! supply snapshots and catalogs and persist whatever comes back.

pub mod allocation;
pub mod classifier;
pub mod norms;
pub mod scoring;
pub mod validation;

pub use allocation::{
    articles_for, Allocation, AllocationCalculator, AllocationEntry, AllocationError,
    RoundingPolicy, PLACEHOLDER_PERCENTAGE,
};
pub use classifier::{classify, UnitAggregates, WorkBreakdown};
pub use norms::{LoadAssessment, WorkloadNorm};
pub use scoring::{employee_total, score, ScoreCard};
pub use validation::{validate_unit, ValidationReport};

/// Round to two decimal places, half away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
