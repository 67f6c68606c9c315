use serde::Serialize;

use super::super::catalog::ScoringTable;
use super::super::domain::{ActionKind, ComplexityTier};
use super::classifier::WorkBreakdown;
use super::round2;

/// Points earned by one assignment. Component scores are kept unrounded so employee totals
/// round only once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreCard {
    pub produced_score: f64,
    pub reviewed_score: f64,
    pub self_checked_score: f64,
    pub total: f64,
}

impl ScoreCard {
    fn unrounded_total(&self) -> f64 {
        self.produced_score + self.reviewed_score + self.self_checked_score
    }
}

pub fn score(
    breakdown: &WorkBreakdown,
    complexity: ComplexityTier,
    table: &ScoringTable,
) -> ScoreCard {
    let produced_score =
        f64::from(breakdown.produced) * table.lookup(ActionKind::Production, complexity);
    let reviewed_score =
        f64::from(breakdown.reviewed) * table.lookup(ActionKind::Review, complexity);
    let self_checked_score =
        f64::from(breakdown.self_checked) * table.lookup(ActionKind::SelfReview, complexity);

    ScoreCard {
        produced_score,
        reviewed_score,
        self_checked_score,
        total: round2(produced_score + reviewed_score + self_checked_score),
    }
}

/// Sum of an employee's assignment scores, rounded to two decimals at the end.
pub fn employee_total<'a>(cards: impl IntoIterator<Item = &'a ScoreCard>) -> f64 {
    round2(cards.into_iter().map(ScoreCard::unrounded_total).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::catalog::MissingRulePolicy;
    use crate::workload::domain::ScoringRule;

    fn table() -> ScoringTable {
        let rules: Vec<ScoringRule> = ActionKind::ordered()
            .into_iter()
            .flat_map(|action| {
                ComplexityTier::ordered()
                    .into_iter()
                    .map(move |complexity| {
                        let base = match action {
                            ActionKind::Production => 0.8,
                            ActionKind::Review => 0.4,
                            ActionKind::SelfReview => 0.5,
                        };
                        ScoringRule {
                            action,
                            complexity,
                            points: base * complexity.coefficient(),
                            description: None,
                        }
                    })
            })
            .collect();
        ScoringTable::from_rules(&rules, MissingRulePolicy::Strict).expect("complete table")
    }

    #[test]
    fn production_points_follow_the_table() {
        let breakdown = WorkBreakdown {
            produced: 10,
            ..WorkBreakdown::default()
        };

        let card = score(&breakdown, ComplexityTier::Medium, &table());

        assert!((card.produced_score - 8.0).abs() < 1e-9);
        assert_eq!(card.total, 8.0);
        assert_eq!(card.reviewed_score, 0.0);
    }

    #[test]
    fn score_is_monotonic_in_produced_articles() {
        let table = table();
        let mut previous = 0.0;
        for produced in 0..60 {
            let card = score(
                &WorkBreakdown {
                    produced,
                    reviewed: 3,
                    self_checked: 2,
                },
                ComplexityTier::High,
                &table,
            );
            assert!(card.total >= previous);
            previous = card.total;
        }
    }

    #[test]
    fn employee_total_rounds_once() {
        let cards = [
            ScoreCard {
                produced_score: 0.004,
                reviewed_score: 0.0,
                self_checked_score: 0.0,
                total: 0.0,
            },
            ScoreCard {
                produced_score: 0.004,
                reviewed_score: 0.0,
                self_checked_score: 0.0,
                total: 0.0,
            },
        ];

        assert_eq!(employee_total(&cards), 0.01);
    }
}
