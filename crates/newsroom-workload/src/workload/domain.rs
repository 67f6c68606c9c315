use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for editorial units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u64);

/// Identifier wrapper for employees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub u64);

/// Identifier wrapper for catalog roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub u64);

/// Identifier wrapper for employee-to-unit assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Complexity classification of a unit. Affects scoring only, never the allocation split.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    #[serde(alias = "S")]
    Low,
    #[default]
    #[serde(alias = "M")]
    Medium,
    #[serde(alias = "L")]
    High,
}

impl ComplexityTier {
    pub const fn ordered() -> [Self; 3] {
        [Self::Low, Self::Medium, Self::High]
    }

    pub const fn coefficient(self) -> f64 {
        match self {
            Self::Low => 0.5,
            Self::Medium => 1.0,
            Self::High => 1.5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Accepts the snake_case names as well as the legacy `S`/`M`/`L` codes.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "s" => Some(Self::Low),
            "medium" | "m" => Some(Self::Medium),
            "high" | "l" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Nature of the work an assignment performs inside its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Production,
    Review,
    SelfReview,
}

impl ActionKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::Production, Self::Review, Self::SelfReview]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Production => "Production",
            Self::Review => "Review",
            Self::SelfReview => "Self-review",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "production" => Some(Self::Production),
            "review" => Some(Self::Review),
            "self_review" => Some(Self::SelfReview),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Editorial team with a fixed monthly article quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub monthly_articles: u32,
    pub complexity: ComplexityTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating or replacing a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDraft {
    pub name: String,
    pub monthly_articles: u32,
    #[serde(default)]
    pub complexity: ComplexityTier,
    #[serde(default)]
    pub description: Option<String>,
}

/// Presentation hints carried with a role. The engine never reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDisplay {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_badge_bg")]
    pub badge_color_bg: String,
    #[serde(default = "default_badge_text")]
    pub badge_color_text: String,
}

fn default_badge_bg() -> String {
    "bg-gray-100".to_string()
}

fn default_badge_text() -> String {
    "text-gray-800".to_string()
}

impl Default for RoleDisplay {
    fn default() -> Self {
        Self {
            description: None,
            badge_color_bg: default_badge_bg(),
            badge_color_text: default_badge_text(),
        }
    }
}

/// Catalog entry describing capacity and permitted work for a class of employees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub capacity_weight: f64,
    pub permitted_actions: Vec<ActionKind>,
    #[serde(default)]
    pub display: RoleDisplay,
}

impl Role {
    pub fn permits(&self, action: ActionKind) -> bool {
        self.permitted_actions.contains(&action)
    }

    /// First permitted action kind, used when an assignment is created without one.
    pub fn default_action(&self) -> ActionKind {
        self.permitted_actions
            .first()
            .copied()
            .unwrap_or(ActionKind::SelfReview)
    }

    pub fn label(&self) -> &str {
        self.display.description.as_deref().unwrap_or(&self.name)
    }

    /// Reviewing roles are seniors whatever action a given assignment uses.
    pub fn category(&self) -> RoleCategory {
        if self.permits(ActionKind::Review) {
            RoleCategory::Reviewer
        } else if self.permits(ActionKind::Production) {
            RoleCategory::Producer
        } else {
            RoleCategory::Independent
        }
    }
}

/// Seniority class of a role for unit composition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    /// Junior staff whose output needs review.
    Producer,
    Reviewer,
    /// Works without a reviewer, such as a self-reviewing editor.
    Independent,
}

pub(crate) const DEFAULT_CAPACITY_WEIGHT: f64 = 1.0;

fn default_capacity_weight() -> f64 {
    DEFAULT_CAPACITY_WEIGHT
}

fn default_permitted_actions() -> Vec<ActionKind> {
    vec![ActionKind::SelfReview]
}

/// Caller-supplied fields for creating or replacing a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDraft {
    pub name: String,
    #[serde(default = "default_capacity_weight")]
    pub capacity_weight: f64,
    #[serde(default = "default_permitted_actions")]
    pub permitted_actions: Vec<ActionKind>,
    #[serde(default)]
    pub display: RoleDisplay,
}

/// Staff member. Capacity is always read from the referenced role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
    #[serde(default)]
    pub preferred_units: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating or replacing an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
    #[serde(default)]
    pub preferred_units: Vec<String>,
}

/// Binding of one employee to one unit. `percentage` is owned by the allocation calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub employee_id: EmployeeId,
    pub unit_id: UnitId,
    pub action: ActionKind,
    pub percentage: f64,
    pub created_at: DateTime<Utc>,
}

/// Request to bind an employee to a unit. Without an action the role's first permitted kind
/// is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub employee_id: EmployeeId,
    pub unit_id: UnitId,
    #[serde(default)]
    pub action: Option<ActionKind>,
}

/// Points awarded per article for an (action kind, complexity tier) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub action: ActionKind,
    pub complexity: ComplexityTier,
    pub points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Caller-supplied fields for replacing a scoring rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRuleDraft {
    pub points: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Unit together with every assignment it holds, read in one repository call.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSnapshot {
    pub unit: Unit,
    pub assignments: Vec<Assignment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_accepts_legacy_codes() {
        assert_eq!(ComplexityTier::parse("S"), Some(ComplexityTier::Low));
        assert_eq!(ComplexityTier::parse(" medium "), Some(ComplexityTier::Medium));
        assert_eq!(ComplexityTier::parse("L"), Some(ComplexityTier::High));
        assert_eq!(ComplexityTier::parse("XL"), None);

        let tier: ComplexityTier = serde_json::from_str("\"M\"").expect("alias deserializes");
        assert_eq!(tier, ComplexityTier::Medium);
    }

    #[test]
    fn action_kind_rejects_unknown_names() {
        assert_eq!(ActionKind::parse("self-review"), Some(ActionKind::SelfReview));
        assert!(serde_json::from_str::<ActionKind>("\"typesetting\"").is_err());
    }

    #[test]
    fn role_draft_defaults_to_self_review() {
        let draft: RoleDraft =
            serde_json::from_str(r#"{ "name": "editor" }"#).expect("draft deserializes");
        assert_eq!(draft.capacity_weight, 1.0);
        assert_eq!(draft.permitted_actions, vec![ActionKind::SelfReview]);
        assert_eq!(draft.display.badge_color_bg, "bg-gray-100");
    }

    #[test]
    fn category_follows_the_strongest_permitted_action() {
        let role = |permitted_actions: Vec<ActionKind>| Role {
            id: RoleId(1),
            name: "role".to_string(),
            capacity_weight: 1.0,
            permitted_actions,
            display: RoleDisplay::default(),
        };

        assert_eq!(
            role(vec![ActionKind::SelfReview, ActionKind::Review]).category(),
            RoleCategory::Reviewer
        );
        assert_eq!(
            role(vec![ActionKind::Production]).category(),
            RoleCategory::Producer
        );
        assert_eq!(
            role(vec![ActionKind::SelfReview]).category(),
            RoleCategory::Independent
        );
    }
}
