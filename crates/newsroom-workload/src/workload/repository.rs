use super::domain::{
    ActionKind, Assignment, AssignmentId, Employee, EmployeeId, Role, RoleId, ScoringRule, Unit,
    UnitId, UnitSnapshot,
};
use super::engine::Allocation;

/// Storage abstraction so the service can be exercised without a database.
///
/// Implementations must apply `apply_allocations` for one unit atomically and return
/// `unit_snapshot` from a single consistent read.
pub trait WorkloadRepository: Send + Sync {
    fn units(&self) -> Result<Vec<Unit>, RepositoryError>;
    fn unit(&self, id: UnitId) -> Result<Option<Unit>, RepositoryError>;
    fn insert_unit(&self, unit: Unit) -> Result<Unit, RepositoryError>;
    fn update_unit(&self, unit: Unit) -> Result<Unit, RepositoryError>;
    /// Removes the unit and every assignment it holds.
    fn delete_unit(&self, id: UnitId) -> Result<(), RepositoryError>;

    fn employees(&self) -> Result<Vec<Employee>, RepositoryError>;
    fn employee(&self, id: EmployeeId) -> Result<Option<Employee>, RepositoryError>;
    fn insert_employee(&self, employee: Employee) -> Result<Employee, RepositoryError>;
    fn update_employee(&self, employee: Employee) -> Result<Employee, RepositoryError>;
    /// Removes the employee and their assignments in one step, returning the removed assignments.
    fn delete_employee(&self, id: EmployeeId) -> Result<Vec<Assignment>, RepositoryError>;

    fn roles(&self) -> Result<Vec<Role>, RepositoryError>;
    fn role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError>;
    fn insert_role(&self, role: Role) -> Result<Role, RepositoryError>;
    fn update_role(&self, role: Role) -> Result<Role, RepositoryError>;
    fn delete_role(&self, id: RoleId) -> Result<(), RepositoryError>;

    fn scoring_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError>;
    fn upsert_scoring_rule(&self, rule: ScoringRule) -> Result<ScoringRule, RepositoryError>;

    fn assignments(&self) -> Result<Vec<Assignment>, RepositoryError>;
    fn assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, RepositoryError>;
    fn assignments_for_employee(
        &self,
        id: EmployeeId,
    ) -> Result<Vec<Assignment>, RepositoryError>;
    fn unit_snapshot(&self, id: UnitId) -> Result<Option<UnitSnapshot>, RepositoryError>;
    fn insert_assignment(&self, assignment: Assignment) -> Result<Assignment, RepositoryError>;
    fn update_assignment_action(
        &self,
        id: AssignmentId,
        action: ActionKind,
    ) -> Result<Assignment, RepositoryError>;
    fn delete_assignment(&self, id: AssignmentId) -> Result<Assignment, RepositoryError>;
    fn apply_allocations(
        &self,
        unit: UnitId,
        allocations: &[Allocation],
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
