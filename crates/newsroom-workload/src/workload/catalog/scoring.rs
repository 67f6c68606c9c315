use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::{ActionKind, ComplexityTier, ScoringRule};

/// What to do when the stored rules do not cover every (action, tier) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRulePolicy {
    /// Refuse to build the table.
    #[default]
    Strict,
    /// Score missing combinations as zero points.
    Zero,
}

impl MissingRulePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "zero" => Some(Self::Zero),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("scoring table is incomplete; missing rules for {}", describe_missing(.missing))]
    Incomplete {
        missing: Vec<(ActionKind, ComplexityTier)>,
    },
    #[error("scoring rule {action}/{complexity} has invalid points {points}; expected a non-negative number")]
    InvalidPoints {
        action: ActionKind,
        complexity: ComplexityTier,
        points: f64,
    },
}

fn describe_missing(missing: &[(ActionKind, ComplexityTier)]) -> String {
    missing
        .iter()
        .map(|(action, complexity)| format!("{action}/{complexity}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Complete (action kind x complexity tier) lookup of points per article.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringTable {
    points: BTreeMap<(ActionKind, ComplexityTier), f64>,
}

impl ScoringTable {
    pub fn from_rules(
        rules: &[ScoringRule],
        policy: MissingRulePolicy,
    ) -> Result<Self, ScoringError> {
        let mut points = BTreeMap::new();
        for rule in rules {
            if !rule.points.is_finite() || rule.points < 0.0 {
                return Err(ScoringError::InvalidPoints {
                    action: rule.action,
                    complexity: rule.complexity,
                    points: rule.points,
                });
            }
            points.insert((rule.action, rule.complexity), rule.points);
        }

        let missing: Vec<_> = ActionKind::ordered()
            .into_iter()
            .flat_map(|action| {
                ComplexityTier::ordered()
                    .into_iter()
                    .map(move |complexity| (action, complexity))
            })
            .filter(|key| !points.contains_key(key))
            .collect();

        if !missing.is_empty() {
            match policy {
                MissingRulePolicy::Strict => return Err(ScoringError::Incomplete { missing }),
                MissingRulePolicy::Zero => {
                    for key in missing {
                        points.insert(key, 0.0);
                    }
                }
            }
        }

        Ok(Self { points })
    }

    pub fn lookup(&self, action: ActionKind, complexity: ComplexityTier) -> f64 {
        self.points
            .get(&(action, complexity))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(action: ActionKind, complexity: ComplexityTier, points: f64) -> ScoringRule {
        ScoringRule {
            action,
            complexity,
            points,
            description: None,
        }
    }

    fn full_rules() -> Vec<ScoringRule> {
        ActionKind::ordered()
            .into_iter()
            .flat_map(|action| {
                ComplexityTier::ordered()
                    .into_iter()
                    .map(move |complexity| rule(action, complexity, complexity.coefficient()))
            })
            .collect()
    }

    #[test]
    fn strict_policy_rejects_incomplete_tables() {
        let mut rules = full_rules();
        rules.retain(|rule| {
            !(rule.action == ActionKind::Review && rule.complexity == ComplexityTier::High)
        });

        let err = ScoringTable::from_rules(&rules, MissingRulePolicy::Strict)
            .expect_err("incomplete table rejected");
        assert_eq!(
            err,
            ScoringError::Incomplete {
                missing: vec![(ActionKind::Review, ComplexityTier::High)],
            }
        );
        assert!(err.to_string().contains("Review/High"));
    }

    #[test]
    fn zero_policy_defaults_missing_rules() {
        let rules = vec![rule(ActionKind::Production, ComplexityTier::Medium, 0.8)];

        let table = ScoringTable::from_rules(&rules, MissingRulePolicy::Zero)
            .expect("zero policy fills gaps");

        assert_eq!(table.lookup(ActionKind::Production, ComplexityTier::Medium), 0.8);
        assert_eq!(table.lookup(ActionKind::Review, ComplexityTier::Low), 0.0);
    }

    #[test]
    fn negative_points_are_invalid_input() {
        let mut rules = full_rules();
        rules[0].points = -0.5;

        assert!(matches!(
            ScoringTable::from_rules(&rules, MissingRulePolicy::Zero),
            Err(ScoringError::InvalidPoints { .. })
        ));
    }
}
