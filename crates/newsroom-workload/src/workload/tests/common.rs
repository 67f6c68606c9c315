use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::workload::domain::{
    ActionKind, Assignment, AssignmentId, AssignmentRequest, ComplexityTier, Employee,
    EmployeeDraft, EmployeeId, Role, RoleId, ScoringRule, Unit, UnitDraft, UnitId, UnitSnapshot,
};
use crate::workload::engine::Allocation;
use crate::workload::memory::InMemoryWorkloadRepository;
use crate::workload::repository::{RepositoryError, WorkloadRepository};
use crate::workload::seed::{load_default_catalogs, EDITOR, JUNIOR_EDITOR, SENIOR_EDITOR};
use crate::workload::service::WorkloadService;
use crate::workload::views::AssignmentChange;

pub(super) type MemoryService = WorkloadService<InMemoryWorkloadRepository>;

/// Service over an empty repository holding the default roles and scoring table.
pub(super) fn build_service() -> (MemoryService, InMemoryWorkloadRepository) {
    build_service_with(EngineConfig::default())
}

pub(super) fn build_service_with(
    config: EngineConfig,
) -> (MemoryService, InMemoryWorkloadRepository) {
    let repository = InMemoryWorkloadRepository::new();
    let service = WorkloadService::new(Arc::new(repository.clone()), config);
    load_default_catalogs(&service).expect("default catalogs load");
    (service, repository)
}

pub(super) fn unit(
    service: &MemoryService,
    name: &str,
    monthly_articles: u32,
    complexity: ComplexityTier,
) -> Unit {
    service
        .create_unit(UnitDraft {
            name: name.to_string(),
            monthly_articles,
            complexity,
            description: None,
        })
        .expect("unit created")
}

pub(super) fn employee(service: &MemoryService, name: &str, role: &str) -> Employee {
    service
        .create_employee(EmployeeDraft {
            name: name.to_string(),
            email: None,
            role: role.to_string(),
            preferred_units: Vec::new(),
        })
        .expect("employee created")
}

pub(super) fn senior(service: &MemoryService, name: &str) -> Employee {
    employee(service, name, SENIOR_EDITOR)
}

pub(super) fn editor(service: &MemoryService, name: &str) -> Employee {
    employee(service, name, EDITOR)
}

pub(super) fn junior(service: &MemoryService, name: &str) -> Employee {
    employee(service, name, JUNIOR_EDITOR)
}

pub(super) fn assign(service: &MemoryService, employee: &Employee, unit: &Unit) -> AssignmentChange {
    service
        .add_assignment(AssignmentRequest {
            employee_id: employee.id,
            unit_id: unit.id,
            action: None,
        })
        .expect("assignment created")
}

pub(super) fn percentage_of(
    repository: &InMemoryWorkloadRepository,
    employee: &Employee,
    unit: &Unit,
) -> f64 {
    repository
        .assignments()
        .expect("assignments readable")
        .into_iter()
        .find(|assignment| assignment.employee_id == employee.id && assignment.unit_id == unit.id)
        .map(|assignment| assignment.percentage)
        .expect("assignment present")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

pub(super) struct UnavailableRepository;

impl WorkloadRepository for UnavailableRepository {
    fn units(&self) -> Result<Vec<Unit>, RepositoryError> {
        Err(offline())
    }

    fn unit(&self, _id: UnitId) -> Result<Option<Unit>, RepositoryError> {
        Err(offline())
    }

    fn insert_unit(&self, _unit: Unit) -> Result<Unit, RepositoryError> {
        Err(offline())
    }

    fn update_unit(&self, _unit: Unit) -> Result<Unit, RepositoryError> {
        Err(offline())
    }

    fn delete_unit(&self, _id: UnitId) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn employees(&self) -> Result<Vec<Employee>, RepositoryError> {
        Err(offline())
    }

    fn employee(&self, _id: EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        Err(offline())
    }

    fn insert_employee(&self, _employee: Employee) -> Result<Employee, RepositoryError> {
        Err(offline())
    }

    fn update_employee(&self, _employee: Employee) -> Result<Employee, RepositoryError> {
        Err(offline())
    }

    fn delete_employee(&self, _id: EmployeeId) -> Result<Vec<Assignment>, RepositoryError> {
        Err(offline())
    }

    fn roles(&self) -> Result<Vec<Role>, RepositoryError> {
        Err(offline())
    }

    fn role(&self, _id: RoleId) -> Result<Option<Role>, RepositoryError> {
        Err(offline())
    }

    fn insert_role(&self, _role: Role) -> Result<Role, RepositoryError> {
        Err(offline())
    }

    fn update_role(&self, _role: Role) -> Result<Role, RepositoryError> {
        Err(offline())
    }

    fn delete_role(&self, _id: RoleId) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn scoring_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError> {
        Err(offline())
    }

    fn upsert_scoring_rule(&self, _rule: ScoringRule) -> Result<ScoringRule, RepositoryError> {
        Err(offline())
    }

    fn assignments(&self) -> Result<Vec<Assignment>, RepositoryError> {
        Err(offline())
    }

    fn assignment(&self, _id: AssignmentId) -> Result<Option<Assignment>, RepositoryError> {
        Err(offline())
    }

    fn assignments_for_employee(
        &self,
        _id: EmployeeId,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        Err(offline())
    }

    fn unit_snapshot(&self, _id: UnitId) -> Result<Option<UnitSnapshot>, RepositoryError> {
        Err(offline())
    }

    fn insert_assignment(&self, _assignment: Assignment) -> Result<Assignment, RepositoryError> {
        Err(offline())
    }

    fn update_assignment_action(
        &self,
        _id: AssignmentId,
        _action: ActionKind,
    ) -> Result<Assignment, RepositoryError> {
        Err(offline())
    }

    fn delete_assignment(&self, _id: AssignmentId) -> Result<Assignment, RepositoryError> {
        Err(offline())
    }

    fn apply_allocations(
        &self,
        _unit: UnitId,
        _allocations: &[Allocation],
    ) -> Result<(), RepositoryError> {
        Err(offline())
    }
}
