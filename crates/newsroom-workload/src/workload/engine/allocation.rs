use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::super::domain::{AssignmentId, ComplexityTier, EmployeeId};

/// Percentage written to a freshly created assignment before redistribution replaces it.
pub const PLACEHOLDER_PERCENTAGE: f64 = 100.0;

const FULL_COVERAGE: f64 = 100.0;
const FLOOR_TOLERANCE: f64 = 1e-9;

/// How whole-point percentages are derived from the raw capacity shares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Floor every share, then hand the missing points to the largest remainders so the unit
    /// always sums to exactly 100.
    #[default]
    LargestRemainder,
    /// Round each share independently; the sum may drift from 100 by up to n-1 points.
    Nearest,
}

impl RoundingPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "largest_remainder" => Some(Self::LargestRemainder),
            "nearest" => Some(Self::Nearest),
            _ => None,
        }
    }
}

/// One assigned employee as seen by the calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationEntry {
    pub assignment_id: AssignmentId,
    pub employee_id: EmployeeId,
    pub capacity_weight: f64,
}

/// Result row of a redistribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Allocation {
    pub assignment_id: AssignmentId,
    pub percentage: f64,
    pub articles_assigned: u32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error("assignment {assignment_id} has capacity weight {weight}; expected a non-negative number")]
    InvalidCapacity {
        assignment_id: AssignmentId,
        weight: f64,
    },
}

/// Splits a unit's quota across its assignments in proportion to capacity weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationCalculator {
    policy: RoundingPolicy,
}

impl AllocationCalculator {
    pub fn new(policy: RoundingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RoundingPolicy {
        self.policy
    }

    /// Recompute every share of a unit. The tier is accepted for signature stability only:
    /// allocation is tier-independent.
    pub fn redistribute(
        &self,
        unit_quota: u32,
        _complexity: ComplexityTier,
        entries: &[AllocationEntry],
    ) -> Result<Vec<Allocation>, AllocationError> {
        for entry in entries {
            if !entry.capacity_weight.is_finite() || entry.capacity_weight < 0.0 {
                return Err(AllocationError::InvalidCapacity {
                    assignment_id: entry.assignment_id,
                    weight: entry.capacity_weight,
                });
            }
        }

        let total_capacity: f64 = entries.iter().map(|entry| entry.capacity_weight).sum();
        if entries.is_empty() || total_capacity <= 0.0 {
            return Ok(Vec::new());
        }

        let raw_shares: Vec<f64> = entries
            .iter()
            .map(|entry| entry.capacity_weight / total_capacity * FULL_COVERAGE)
            .collect();

        let percentages = match self.policy {
            RoundingPolicy::Nearest => raw_shares.iter().map(|share| share.round()).collect(),
            RoundingPolicy::LargestRemainder => largest_remainder(entries, &raw_shares),
        };

        Ok(entries
            .iter()
            .zip(percentages)
            .map(|(entry, percentage)| Allocation {
                assignment_id: entry.assignment_id,
                percentage,
                articles_assigned: articles_for(percentage, unit_quota),
            })
            .collect())
    }
}

/// Whole article count for a percentage share of a quota, rounded half away from zero.
pub fn articles_for(percentage: f64, unit_quota: u32) -> u32 {
    let articles = (percentage / FULL_COVERAGE * f64::from(unit_quota)).round();
    if articles <= 0.0 {
        0
    } else {
        articles as u32
    }
}

fn largest_remainder(entries: &[AllocationEntry], raw_shares: &[f64]) -> Vec<f64> {
    let mut percentages: Vec<f64> = raw_shares
        .iter()
        .map(|share| (share + FLOOR_TOLERANCE).floor())
        .collect();

    let assigned: f64 = percentages.iter().sum();
    let missing = (FULL_COVERAGE - assigned).round();
    if missing <= 0.0 {
        return percentages;
    }

    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&left, &right| {
        let left_remainder = raw_shares[left] - percentages[left];
        let right_remainder = raw_shares[right] - percentages[right];
        right_remainder
            .partial_cmp(&left_remainder)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                entries[right]
                    .capacity_weight
                    .partial_cmp(&entries[left].capacity_weight)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| entries[left].employee_id.cmp(&entries[right].employee_id))
    });

    for index in order.into_iter().take(missing as usize) {
        percentages[index] += 1.0;
    }

    percentages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, weight: f64) -> AllocationEntry {
        AllocationEntry {
            assignment_id: AssignmentId(id),
            employee_id: EmployeeId(id),
            capacity_weight: weight,
        }
    }

    #[test]
    fn splits_by_capacity_and_rounds_half_away_from_zero() {
        for policy in [RoundingPolicy::Nearest, RoundingPolicy::LargestRemainder] {
            let calculator = AllocationCalculator::new(policy);
            let allocations = calculator
                .redistribute(100, ComplexityTier::Medium, &[entry(1, 0.8), entry(2, 1.3)])
                .expect("valid weights");

            assert_eq!(allocations[0].percentage, 38.0);
            assert_eq!(allocations[1].percentage, 62.0);
            assert_eq!(allocations[0].articles_assigned, 38);
            assert_eq!(allocations[1].articles_assigned, 62);
        }
    }

    #[test]
    fn nearest_policy_keeps_rounding_drift() {
        let calculator = AllocationCalculator::new(RoundingPolicy::Nearest);
        let allocations = calculator
            .redistribute(
                30,
                ComplexityTier::Low,
                &[entry(1, 1.0), entry(2, 1.0), entry(3, 1.0)],
            )
            .expect("valid weights");

        let total: f64 = allocations.iter().map(|allocation| allocation.percentage).sum();
        assert_eq!(total, 99.0);
        assert!(allocations
            .iter()
            .all(|allocation| allocation.articles_assigned == 10));
    }

    #[test]
    fn largest_remainder_tops_up_lowest_employee_id_on_ties() {
        let calculator = AllocationCalculator::new(RoundingPolicy::LargestRemainder);
        let allocations = calculator
            .redistribute(
                90,
                ComplexityTier::High,
                &[entry(7, 1.0), entry(3, 1.0), entry(5, 1.0)],
            )
            .expect("valid weights");

        let percentages: Vec<f64> = allocations.iter().map(|a| a.percentage).collect();
        assert_eq!(percentages, vec![33.0, 34.0, 33.0]);
        assert_eq!(allocations[1].assignment_id, AssignmentId(3));
        assert_eq!(allocations[1].articles_assigned, 31);
    }

    #[test]
    fn degenerate_inputs_produce_no_allocation() {
        let calculator = AllocationCalculator::default();
        assert!(calculator
            .redistribute(50, ComplexityTier::Medium, &[])
            .expect("empty is fine")
            .is_empty());
        assert!(calculator
            .redistribute(50, ComplexityTier::Medium, &[entry(1, 0.0), entry(2, 0.0)])
            .expect("zero capacity is fine")
            .is_empty());
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let calculator = AllocationCalculator::default();
        let err = calculator
            .redistribute(50, ComplexityTier::Medium, &[entry(1, 1.0), entry(2, -0.5)])
            .expect_err("negative weight rejected");
        assert_eq!(
            err,
            AllocationError::InvalidCapacity {
                assignment_id: AssignmentId(2),
                weight: -0.5,
            }
        );
    }

    #[test]
    fn zero_quota_still_splits_percentages() {
        let calculator = AllocationCalculator::default();
        let allocations = calculator
            .redistribute(0, ComplexityTier::Medium, &[entry(1, 0.8), entry(2, 1.3)])
            .expect("valid weights");

        assert_eq!(allocations[0].percentage, 38.0);
        assert_eq!(allocations[1].percentage, 62.0);
        assert!(allocations.iter().all(|a| a.articles_assigned == 0));
    }

    #[test]
    fn shares_stay_within_tolerance_for_mixed_weights() {
        let weights = [0.8, 1.0, 1.3, 0.8, 1.3, 1.0, 0.8];
        for count in 1..=weights.len() {
            let entries: Vec<_> = weights[..count]
                .iter()
                .enumerate()
                .map(|(index, weight)| entry(index as u64 + 1, *weight))
                .collect();

            for policy in [RoundingPolicy::Nearest, RoundingPolicy::LargestRemainder] {
                let allocations = AllocationCalculator::new(policy)
                    .redistribute(176, ComplexityTier::Low, &entries)
                    .expect("valid weights");

                let percent_total: f64 = allocations.iter().map(|a| a.percentage).sum();
                assert!((percent_total - 100.0).abs() <= (count as f64 - 1.0));
                if policy == RoundingPolicy::LargestRemainder {
                    assert_eq!(percent_total, 100.0);
                }

                let article_total: i64 =
                    allocations.iter().map(|a| i64::from(a.articles_assigned)).sum();
                assert!((article_total - 176).abs() <= count as i64 * 2);
            }
        }
    }
}
