use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::domain::{
    ActionKind, Assignment, AssignmentId, ComplexityTier, Employee, EmployeeId, Role, RoleId,
    ScoringRule, Unit, UnitId, UnitSnapshot,
};
use super::engine::Allocation;
use super::repository::{RepositoryError, WorkloadRepository};

#[derive(Debug, Default)]
struct Tables {
    units: BTreeMap<UnitId, Unit>,
    employees: BTreeMap<EmployeeId, Employee>,
    roles: BTreeMap<RoleId, Role>,
    scoring_rules: BTreeMap<(ActionKind, ComplexityTier), ScoringRule>,
    assignments: BTreeMap<AssignmentId, Assignment>,
}

/// Process-local repository. Clones share the same tables.
///
/// Unit and role names are unique, and an employee holds at most one assignment per unit.
#[derive(Debug, Default, Clone)]
pub struct InMemoryWorkloadRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryWorkloadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))
    }
}

fn ensure_unique_unit_name(tables: &Tables, unit: &Unit) -> Result<(), RepositoryError> {
    let taken = tables
        .units
        .values()
        .any(|existing| existing.id != unit.id && existing.name == unit.name);
    if taken {
        return Err(RepositoryError::Conflict(format!(
            "unit '{}' already exists",
            unit.name
        )));
    }
    Ok(())
}

fn ensure_unique_role_name(tables: &Tables, role: &Role) -> Result<(), RepositoryError> {
    let taken = tables
        .roles
        .values()
        .any(|existing| existing.id != role.id && existing.name == role.name);
    if taken {
        return Err(RepositoryError::Conflict(format!(
            "role '{}' already exists",
            role.name
        )));
    }
    Ok(())
}

fn ensure_unique_email(tables: &Tables, employee: &Employee) -> Result<(), RepositoryError> {
    let Some(email) = employee.email.as_deref() else {
        return Ok(());
    };
    let taken = tables.employees.values().any(|existing| {
        existing.id != employee.id
            && existing
                .email
                .as_deref()
                .is_some_and(|other| other.eq_ignore_ascii_case(email))
    });
    if taken {
        return Err(RepositoryError::Conflict(format!(
            "email '{email}' already in use"
        )));
    }
    Ok(())
}

impl WorkloadRepository for InMemoryWorkloadRepository {
    fn units(&self) -> Result<Vec<Unit>, RepositoryError> {
        Ok(self.read()?.units.values().cloned().collect())
    }

    fn unit(&self, id: UnitId) -> Result<Option<Unit>, RepositoryError> {
        Ok(self.read()?.units.get(&id).cloned())
    }

    fn insert_unit(&self, unit: Unit) -> Result<Unit, RepositoryError> {
        let mut tables = self.write()?;
        if tables.units.contains_key(&unit.id) {
            return Err(RepositoryError::Conflict(format!("unit {} exists", unit.id)));
        }
        ensure_unique_unit_name(&tables, &unit)?;
        tables.units.insert(unit.id, unit.clone());
        Ok(unit)
    }

    fn update_unit(&self, unit: Unit) -> Result<Unit, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.units.contains_key(&unit.id) {
            return Err(RepositoryError::NotFound);
        }
        ensure_unique_unit_name(&tables, &unit)?;
        tables.units.insert(unit.id, unit.clone());
        Ok(unit)
    }

    fn delete_unit(&self, id: UnitId) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        if tables.units.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        tables
            .assignments
            .retain(|_, assignment| assignment.unit_id != id);
        Ok(())
    }

    fn employees(&self) -> Result<Vec<Employee>, RepositoryError> {
        Ok(self.read()?.employees.values().cloned().collect())
    }

    fn employee(&self, id: EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        Ok(self.read()?.employees.get(&id).cloned())
    }

    fn insert_employee(&self, employee: Employee) -> Result<Employee, RepositoryError> {
        let mut tables = self.write()?;
        if tables.employees.contains_key(&employee.id) {
            return Err(RepositoryError::Conflict(format!(
                "employee {} exists",
                employee.id
            )));
        }
        ensure_unique_email(&tables, &employee)?;
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    fn update_employee(&self, employee: Employee) -> Result<Employee, RepositoryError> {
        let mut tables = self.write()?;
        ensure_unique_email(&tables, &employee)?;
        match tables.employees.get_mut(&employee.id) {
            Some(slot) => {
                *slot = employee.clone();
                Ok(employee)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete_employee(&self, id: EmployeeId) -> Result<Vec<Assignment>, RepositoryError> {
        let mut tables = self.write()?;
        if tables.employees.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        let (removed, kept): (BTreeMap<_, _>, BTreeMap<_, _>) =
            std::mem::take(&mut tables.assignments)
                .into_iter()
                .partition(|(_, assignment)| assignment.employee_id == id);
        tables.assignments = kept;
        Ok(removed.into_values().collect())
    }

    fn roles(&self) -> Result<Vec<Role>, RepositoryError> {
        Ok(self.read()?.roles.values().cloned().collect())
    }

    fn role(&self, id: RoleId) -> Result<Option<Role>, RepositoryError> {
        Ok(self.read()?.roles.get(&id).cloned())
    }

    fn insert_role(&self, role: Role) -> Result<Role, RepositoryError> {
        let mut tables = self.write()?;
        if tables.roles.contains_key(&role.id) {
            return Err(RepositoryError::Conflict(format!("role {} exists", role.id)));
        }
        ensure_unique_role_name(&tables, &role)?;
        tables.roles.insert(role.id, role.clone());
        Ok(role)
    }

    fn update_role(&self, role: Role) -> Result<Role, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.roles.contains_key(&role.id) {
            return Err(RepositoryError::NotFound);
        }
        ensure_unique_role_name(&tables, &role)?;
        tables.roles.insert(role.id, role.clone());
        Ok(role)
    }

    fn delete_role(&self, id: RoleId) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        tables
            .roles
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn scoring_rules(&self) -> Result<Vec<ScoringRule>, RepositoryError> {
        Ok(self.read()?.scoring_rules.values().cloned().collect())
    }

    fn upsert_scoring_rule(&self, rule: ScoringRule) -> Result<ScoringRule, RepositoryError> {
        let mut tables = self.write()?;
        tables
            .scoring_rules
            .insert((rule.action, rule.complexity), rule.clone());
        Ok(rule)
    }

    fn assignments(&self) -> Result<Vec<Assignment>, RepositoryError> {
        Ok(self.read()?.assignments.values().cloned().collect())
    }

    fn assignment(&self, id: AssignmentId) -> Result<Option<Assignment>, RepositoryError> {
        Ok(self.read()?.assignments.get(&id).cloned())
    }

    fn assignments_for_employee(
        &self,
        id: EmployeeId,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        Ok(self
            .read()?
            .assignments
            .values()
            .filter(|assignment| assignment.employee_id == id)
            .cloned()
            .collect())
    }

    fn unit_snapshot(&self, id: UnitId) -> Result<Option<UnitSnapshot>, RepositoryError> {
        let tables = self.read()?;
        let Some(unit) = tables.units.get(&id) else {
            return Ok(None);
        };

        let assignments = tables
            .assignments
            .values()
            .filter(|assignment| assignment.unit_id == id)
            .cloned()
            .collect();

        Ok(Some(UnitSnapshot {
            unit: unit.clone(),
            assignments,
        }))
    }

    fn insert_assignment(&self, assignment: Assignment) -> Result<Assignment, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.units.contains_key(&assignment.unit_id)
            || !tables.employees.contains_key(&assignment.employee_id)
        {
            return Err(RepositoryError::NotFound);
        }
        let duplicate = tables.assignments.values().any(|existing| {
            existing.id == assignment.id
                || (existing.unit_id == assignment.unit_id
                    && existing.employee_id == assignment.employee_id)
        });
        if duplicate {
            return Err(RepositoryError::Conflict(format!(
                "employee {} already assigned to unit {}",
                assignment.employee_id, assignment.unit_id
            )));
        }

        tables.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    fn update_assignment_action(
        &self,
        id: AssignmentId,
        action: ActionKind,
    ) -> Result<Assignment, RepositoryError> {
        let mut tables = self.write()?;
        let assignment = tables
            .assignments
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        assignment.action = action;
        Ok(assignment.clone())
    }

    fn delete_assignment(&self, id: AssignmentId) -> Result<Assignment, RepositoryError> {
        let mut tables = self.write()?;
        tables
            .assignments
            .remove(&id)
            .ok_or(RepositoryError::NotFound)
    }

    fn apply_allocations(
        &self,
        unit: UnitId,
        allocations: &[Allocation],
    ) -> Result<(), RepositoryError> {
        let mut tables = self.write()?;
        let all_present = allocations.iter().all(|allocation| {
            tables
                .assignments
                .get(&allocation.assignment_id)
                .is_some_and(|assignment| assignment.unit_id == unit)
        });
        if !all_present {
            return Err(RepositoryError::NotFound);
        }

        for allocation in allocations {
            if let Some(assignment) = tables.assignments.get_mut(&allocation.assignment_id) {
                assignment.percentage = allocation.percentage;
            }
        }
        Ok(())
    }
}
