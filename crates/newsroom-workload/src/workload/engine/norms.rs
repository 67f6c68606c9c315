use serde::Serialize;

use super::round2;

/// Organisation-wide expected article count per unit of capacity weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WorkloadNorm {
    pub total_articles: u64,
    pub total_capacity: f64,
    pub norm_per_100_capacity: f64,
    pub norm_per_employee: u32,
}

/// Comparison of an employee's assigned articles against their norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadAssessment {
    pub actual_articles: u64,
    pub norm: u32,
    pub overloaded: bool,
    pub load_percentage: u32,
}

impl WorkloadNorm {
    pub fn compute(
        unit_quotas: impl IntoIterator<Item = u32>,
        capacities: impl IntoIterator<Item = f64>,
    ) -> Self {
        let total_articles: u64 = unit_quotas.into_iter().map(u64::from).sum();
        let total_capacity: f64 = capacities.into_iter().sum();

        let norm_per_100_capacity = if total_capacity > 0.0 {
            round2(total_articles as f64 / total_capacity)
        } else {
            0.0
        };

        Self {
            total_articles,
            total_capacity: round2(total_capacity),
            norm_per_100_capacity,
            norm_per_employee: to_count(norm_per_100_capacity),
        }
    }

    pub fn norm_for(&self, capacity_weight: f64) -> u32 {
        to_count(self.norm_per_100_capacity * capacity_weight)
    }

    pub fn assess(&self, actual_articles: u64, capacity_weight: f64) -> LoadAssessment {
        let norm = self.norm_for(capacity_weight);
        let load_percentage = if norm == 0 {
            0
        } else {
            to_count(actual_articles as f64 / f64::from(norm) * 100.0)
        };

        LoadAssessment {
            actual_articles,
            norm,
            overloaded: actual_articles > u64::from(norm),
            load_percentage,
        }
    }
}

fn to_count(value: f64) -> u32 {
    let rounded = value.round();
    if rounded <= 0.0 {
        0
    } else {
        rounded.min(f64::from(u32::MAX)) as u32
    }
}
