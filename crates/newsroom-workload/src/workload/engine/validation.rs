use serde::Serialize;

use super::super::domain::RoleCategory;

/// Advisory report on the role composition of one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Producers need reviewers: at least one, and no more than two producers per reviewer.
/// Members are counted by role category, so a reviewer on a self-review assignment still counts.
pub fn validate_unit(categories: impl IntoIterator<Item = RoleCategory>) -> ValidationReport {
    let (producers, reviewers) = categories.into_iter().fold(
        (0usize, 0usize),
        |(producers, reviewers), category| match category {
            RoleCategory::Producer => (producers + 1, reviewers),
            RoleCategory::Reviewer => (producers, reviewers + 1),
            RoleCategory::Independent => (producers, reviewers),
        },
    );

    let mut report = ValidationReport {
        is_valid: true,
        ..ValidationReport::default()
    };

    if producers > 0 && reviewers == 0 {
        report.is_valid = false;
        report.errors.push(format!(
            "unit has {producers} producer(s) but no reviewer; assign at least one senior editor"
        ));
    }

    if producers > reviewers * 2 {
        report.warnings.push(format!(
            "{producers} producer(s) for {reviewers} reviewer(s); recommended ratio is 1-2 producers per reviewer"
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producers_without_reviewer_are_invalid() {
        let report = validate_unit([RoleCategory::Producer; 3]);

        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn ratio_above_two_warns_but_stays_valid() {
        let report = validate_unit([
            RoleCategory::Reviewer,
            RoleCategory::Producer,
            RoleCategory::Producer,
            RoleCategory::Producer,
        ]);

        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn independent_only_units_are_clean() {
        let report = validate_unit([RoleCategory::Independent, RoleCategory::Independent]);
        assert_eq!(
            report,
            ValidationReport {
                is_valid: true,
                warnings: Vec::new(),
                errors: Vec::new(),
            }
        );
    }

    #[test]
    fn one_reviewer_covers_two_producers_without_warning() {
        let report = validate_unit([
            RoleCategory::Producer,
            RoleCategory::Reviewer,
            RoleCategory::Producer,
        ]);

        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
    }
}
