use serde::Serialize;

use super::super::domain::ActionKind;

/// Articles an assignment produces, reviews, or self-checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkBreakdown {
    pub produced: u32,
    pub reviewed: u32,
    pub self_checked: u32,
}

/// Unit-wide figures every assignment of one unit is classified against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnitAggregates {
    pub total_produced_articles: u32,
    pub reviewer_count: u32,
}

impl UnitAggregates {
    /// Build from `(action, articles_assigned)` pairs covering the whole unit.
    pub fn from_assignments(assignments: impl IntoIterator<Item = (ActionKind, u32)>) -> Self {
        assignments
            .into_iter()
            .fold(Self::default(), |mut aggregates, (action, articles)| {
                match action {
                    ActionKind::Production => {
                        aggregates.total_produced_articles =
                            aggregates.total_produced_articles.saturating_add(articles);
                    }
                    ActionKind::Review => aggregates.reviewer_count += 1,
                    ActionKind::SelfReview => {}
                }
                aggregates
            })
    }

    /// Even share of the unit's produced articles per reviewer, regardless of capacity.
    pub fn review_share(&self) -> u32 {
        if self.reviewer_count == 0 {
            return 0;
        }

        (f64::from(self.total_produced_articles) / f64::from(self.reviewer_count)).round() as u32
    }
}

pub fn classify(
    articles_assigned: u32,
    action: ActionKind,
    aggregates: &UnitAggregates,
) -> WorkBreakdown {
    match action {
        ActionKind::Production => WorkBreakdown {
            produced: articles_assigned,
            ..WorkBreakdown::default()
        },
        ActionKind::Review => WorkBreakdown {
            reviewed: aggregates.review_share(),
            ..WorkBreakdown::default()
        },
        ActionKind::SelfReview => WorkBreakdown {
            self_checked: articles_assigned,
            ..WorkBreakdown::default()
        },
    }
}
