use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::catalog::{
    validate_role_draft, CatalogError, MissingRulePolicy, RoleCatalog, ScoringError, ScoringTable,
};
use super::domain::{
    ActionKind, Assignment, AssignmentId, AssignmentRequest, ComplexityTier, Employee,
    EmployeeDraft, EmployeeId, Role, RoleCategory, RoleDraft, RoleId, ScoringRule,
    ScoringRuleDraft, Unit, UnitDraft, UnitId, UnitSnapshot,
};
use super::engine::{
    self, articles_for, AllocationCalculator, AllocationEntry, AllocationError, UnitAggregates,
    ValidationReport, WorkloadNorm, PLACEHOLDER_PERCENTAGE,
};
use super::repository::{RepositoryError, WorkloadRepository};
use super::views::{
    AnalyticsReport, AssignmentChange, AssignmentView, EmployeeScoring, EmployeeWorkload,
    MemberDetail, RedistributionEntry, RedistributionReport, UnitCoverage, UnitDetails,
    UnitScore,
};
use crate::config::EngineConfig;

const CAPACITY_EPSILON: f64 = 1e-9;

static UNIT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static EMPLOYEE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ROLE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ASSIGNMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(sequence: &AtomicU64) -> u64 {
    sequence.fetch_add(1, Ordering::Relaxed)
}

/// Host-side use cases around the pure engine: loads snapshots, applies redistributions and
/// derives the read views.
///
/// Every redistribution runs under a per-unit lock so the read-modify-write of a unit's shares
/// never interleaves with another change to the same unit. Operations that take several unit
/// locks take them in id order.
///
/// Role definitions and employee roles change under the write side of `catalog_gate`;
/// everything that checks a role's permitted actions before writing holds the read side. The
/// gate is always taken before any unit lock.
pub struct WorkloadService<R> {
    repository: Arc<R>,
    calculator: AllocationCalculator,
    missing_rules: MissingRulePolicy,
    unit_locks: Mutex<HashMap<UnitId, Arc<Mutex<()>>>>,
    catalog_gate: RwLock<()>,
}

impl<R> WorkloadService<R>
where
    R: WorkloadRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: EngineConfig) -> Self {
        Self {
            repository,
            calculator: AllocationCalculator::new(config.rounding),
            missing_rules: config.missing_rules,
            unit_locks: Mutex::new(HashMap::new()),
            catalog_gate: RwLock::new(()),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn role_catalog(&self) -> Result<RoleCatalog, WorkloadServiceError> {
        Ok(RoleCatalog::new(self.repository.roles()?)?)
    }

    pub fn scoring_table(&self) -> Result<ScoringTable, WorkloadServiceError> {
        let rules = self.repository.scoring_rules()?;
        Ok(ScoringTable::from_rules(&rules, self.missing_rules)?)
    }

    // Units

    pub fn list_units(&self) -> Result<Vec<Unit>, WorkloadServiceError> {
        let mut units = self.repository.units()?;
        units.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(units)
    }

    pub fn create_unit(&self, draft: UnitDraft) -> Result<Unit, WorkloadServiceError> {
        let unit = Unit {
            id: UnitId(next_id(&UNIT_SEQUENCE)),
            name: require_name("unit", &draft.name)?,
            monthly_articles: draft.monthly_articles,
            complexity: draft.complexity,
            description: normalize_optional(draft.description),
            created_at: Utc::now(),
        };

        let stored = self.repository.insert_unit(unit)?;
        info!(unit = %stored.id, name = %stored.name, quota = stored.monthly_articles, "unit created");
        Ok(stored)
    }

    /// Replace a unit's fields. Shares are capacity based, so only derived article counts move.
    pub fn update_unit(&self, id: UnitId, draft: UnitDraft) -> Result<Unit, WorkloadServiceError> {
        let lock = self.unit_lock(id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let existing = self
            .repository
            .unit(id)?
            .ok_or_else(|| not_found("unit", id.0))?;

        let updated = self.repository.update_unit(Unit {
            name: require_name("unit", &draft.name)?,
            monthly_articles: draft.monthly_articles,
            complexity: draft.complexity,
            description: normalize_optional(draft.description),
            ..existing
        })?;
        info!(unit = %updated.id, quota = updated.monthly_articles, "unit updated");
        Ok(updated)
    }

    pub fn delete_unit(&self, id: UnitId) -> Result<(), WorkloadServiceError> {
        {
            let lock = self.unit_lock(id)?;
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.repository
                .unit(id)?
                .ok_or_else(|| not_found("unit", id.0))?;
            self.repository.delete_unit(id)?;
        }

        self.unit_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        info!(unit = %id, "unit deleted with its assignments");
        Ok(())
    }

    // Employees

    pub fn list_employees(&self) -> Result<Vec<Employee>, WorkloadServiceError> {
        let mut employees = self.repository.employees()?;
        employees.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(employees)
    }

    pub fn create_employee(&self, draft: EmployeeDraft) -> Result<Employee, WorkloadServiceError> {
        let _catalog = self.catalog_gate.read().unwrap_or_else(PoisonError::into_inner);
        let catalog = self.role_catalog()?;
        let role = catalog.get(draft.role.trim())?;

        let employee = Employee {
            id: EmployeeId(next_id(&EMPLOYEE_SEQUENCE)),
            name: require_name("employee", &draft.name)?,
            email: normalize_optional(draft.email),
            role: role.name.clone(),
            preferred_units: normalize_list(draft.preferred_units),
            created_at: Utc::now(),
        };

        let stored = self.repository.insert_employee(employee)?;
        info!(employee = %stored.id, role = %stored.role, "employee created");
        Ok(stored)
    }

    /// Replace an employee's fields. A role change re-splits every unit the employee works in,
    /// and assignments whose action the new role does not permit fall back to its default.
    pub fn update_employee(
        &self,
        id: EmployeeId,
        draft: EmployeeDraft,
    ) -> Result<Employee, WorkloadServiceError> {
        let _catalog = self.catalog_gate.write().unwrap_or_else(PoisonError::into_inner);
        let existing = self
            .repository
            .employee(id)?
            .ok_or_else(|| not_found("employee", id.0))?;
        let catalog = self.role_catalog()?;
        let role = catalog.get(draft.role.trim())?.clone();
        let role_changed = existing.role != role.name;

        let updated = self.repository.update_employee(Employee {
            name: require_name("employee", &draft.name)?,
            email: normalize_optional(draft.email),
            role: role.name.clone(),
            preferred_units: normalize_list(draft.preferred_units),
            ..existing
        })?;

        if role_changed {
            let units: BTreeSet<UnitId> = self
                .repository
                .assignments_for_employee(id)?
                .iter()
                .map(|assignment| assignment.unit_id)
                .collect();
            for (unit, lock) in self.existing_unit_locks(&units)? {
                let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

                // The unit or the assignment may be gone since the listing.
                let Some(assignment) = self
                    .repository
                    .unit_snapshot(unit)?
                    .and_then(|snapshot| {
                        snapshot
                            .assignments
                            .into_iter()
                            .find(|assignment| assignment.employee_id == id)
                    })
                else {
                    continue;
                };
                if !role.permits(assignment.action) {
                    let fallback = role.default_action();
                    self.repository
                        .update_assignment_action(assignment.id, fallback)?;
                    debug!(
                        assignment = %assignment.id,
                        from = %assignment.action,
                        to = %fallback,
                        "assignment action reset after role change"
                    );
                }
                self.redistribute_locked(unit)?;
            }
            info!(employee = %id, role = %updated.role, "employee role changed; units redistributed");
        }

        Ok(updated)
    }

    /// Remove an employee with their assignments and re-split each unit they leave.
    ///
    /// The units the employee works in stay locked across the cascading delete. A unit joined
    /// concurrently, after the locks were taken, is re-split once the cascade reports it.
    pub fn delete_employee(&self, id: EmployeeId) -> Result<(), WorkloadServiceError> {
        self.repository
            .employee(id)?
            .ok_or_else(|| not_found("employee", id.0))?;

        let known: BTreeSet<UnitId> = self
            .repository
            .assignments_for_employee(id)?
            .iter()
            .map(|assignment| assignment.unit_id)
            .collect();
        let locks = self.existing_unit_locks(&known)?;

        let removed = {
            let _guards: Vec<_> = locks
                .iter()
                .map(|(_, lock)| lock.lock().unwrap_or_else(PoisonError::into_inner))
                .collect();
            let removed = self.repository.delete_employee(id)?;
            for (unit, _) in &locks {
                self.redistribute_if_present(*unit)?;
            }
            removed
        };

        let late: BTreeSet<UnitId> = removed
            .iter()
            .map(|assignment| assignment.unit_id)
            .filter(|unit| !locks.iter().any(|(locked, _)| locked == unit))
            .collect();
        for (unit, lock) in self.existing_unit_locks(&late)? {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            warn!(employee = %id, %unit, "unit joined during employee removal; re-splitting");
            self.redistribute_if_present(unit)?;
        }

        info!(employee = %id, units = removed.len(), "employee deleted");
        Ok(())
    }

    // Roles

    pub fn list_roles(&self) -> Result<Vec<Role>, WorkloadServiceError> {
        let mut roles = self.repository.roles()?;
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    pub fn create_role(&self, draft: RoleDraft) -> Result<Role, WorkloadServiceError> {
        validate_role_draft(&draft)?;
        let role = Role {
            id: RoleId(next_id(&ROLE_SEQUENCE)),
            name: draft.name.trim().to_string(),
            capacity_weight: draft.capacity_weight,
            permitted_actions: dedupe_actions(draft.permitted_actions),
            display: draft.display,
        };

        let stored = self.repository.insert_role(role)?;
        info!(role = %stored.name, capacity = stored.capacity_weight, "role created");
        Ok(stored)
    }

    /// Replace a role. Renames propagate to employees, capacity changes re-split their units,
    /// and dropping an action kind that assignments still use is rejected.
    pub fn update_role(&self, id: RoleId, draft: RoleDraft) -> Result<Role, WorkloadServiceError> {
        validate_role_draft(&draft)?;
        let _catalog = self.catalog_gate.write().unwrap_or_else(PoisonError::into_inner);
        let existing = self
            .repository
            .role(id)?
            .ok_or_else(|| not_found("role", id.0))?;

        let holders: Vec<Employee> = self
            .repository
            .employees()?
            .into_iter()
            .filter(|employee| employee.role == existing.name)
            .collect();

        let permitted_actions = dedupe_actions(draft.permitted_actions);
        let mut affected_units = BTreeSet::new();
        for employee in &holders {
            for assignment in self.repository.assignments_for_employee(employee.id)? {
                if !permitted_actions.contains(&assignment.action) {
                    return Err(WorkloadServiceError::InvalidInput(format!(
                        "role '{}' still has assignments using {}; reassign them first",
                        existing.name, assignment.action
                    )));
                }
                affected_units.insert(assignment.unit_id);
            }
        }

        let capacity_changed =
            (existing.capacity_weight - draft.capacity_weight).abs() > CAPACITY_EPSILON;
        let updated = self.repository.update_role(Role {
            id,
            name: draft.name.trim().to_string(),
            capacity_weight: draft.capacity_weight,
            permitted_actions,
            display: draft.display,
        })?;

        if updated.name != existing.name {
            for employee in holders {
                self.repository.update_employee(Employee {
                    role: updated.name.clone(),
                    ..employee
                })?;
            }
            info!(from = %existing.name, to = %updated.name, "role renamed");
        }

        if capacity_changed {
            for (unit, lock) in self.existing_unit_locks(&affected_units)? {
                let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                self.redistribute_if_present(unit)?;
            }
            info!(role = %updated.name, capacity = updated.capacity_weight, "role capacity changed; units redistributed");
        }

        Ok(updated)
    }

    pub fn delete_role(&self, id: RoleId) -> Result<(), WorkloadServiceError> {
        let _catalog = self.catalog_gate.write().unwrap_or_else(PoisonError::into_inner);
        let existing = self
            .repository
            .role(id)?
            .ok_or_else(|| not_found("role", id.0))?;

        let employees = self
            .repository
            .employees()?
            .iter()
            .filter(|employee| employee.role == existing.name)
            .count();
        if employees > 0 {
            return Err(WorkloadServiceError::RoleInUse {
                role: existing.name,
                employees,
            });
        }

        self.repository.delete_role(id)?;
        info!(role = %existing.name, "role deleted");
        Ok(())
    }

    // Scoring rules

    pub fn list_scoring_rules(&self) -> Result<Vec<ScoringRule>, WorkloadServiceError> {
        let mut rules = self.repository.scoring_rules()?;
        rules.sort_by_key(|rule| (rule.action, rule.complexity));
        Ok(rules)
    }

    pub fn update_scoring_rule(
        &self,
        action: ActionKind,
        complexity: ComplexityTier,
        draft: ScoringRuleDraft,
    ) -> Result<ScoringRule, WorkloadServiceError> {
        if !draft.points.is_finite() || draft.points < 0.0 {
            return Err(ScoringError::InvalidPoints {
                action,
                complexity,
                points: draft.points,
            }
            .into());
        }

        let rule = self.repository.upsert_scoring_rule(ScoringRule {
            action,
            complexity,
            points: engine::round2(draft.points),
            description: normalize_optional(draft.description),
        })?;
        info!(%action, %complexity, points = rule.points, "scoring rule updated");
        Ok(rule)
    }

    // Assignments

    pub fn list_assignments(&self) -> Result<Vec<AssignmentView>, WorkloadServiceError> {
        let catalog = self.role_catalog()?;
        let employees = self.employee_index()?;
        let units: HashMap<UnitId, Unit> = self
            .repository
            .units()?
            .into_iter()
            .map(|unit| (unit.id, unit))
            .collect();

        let mut views = Vec::new();
        for assignment in self.repository.assignments()? {
            let employee = employees
                .get(&assignment.employee_id)
                .ok_or_else(|| not_found("employee", assignment.employee_id.0))?;
            let unit = units
                .get(&assignment.unit_id)
                .ok_or_else(|| not_found("unit", assignment.unit_id.0))?;

            views.push(AssignmentView {
                id: assignment.id,
                employee_id: employee.id,
                employee_name: employee.name.clone(),
                role: employee.role.clone(),
                capacity_weight: catalog.capacity_of(&employee.role)?,
                unit_id: unit.id,
                unit_name: unit.name.clone(),
                monthly_articles: unit.monthly_articles,
                complexity: unit.complexity,
                action: assignment.action,
                percentage: assignment.percentage,
                articles_assigned: articles_for(assignment.percentage, unit.monthly_articles),
            });
        }

        views.sort_by(|left, right| {
            left.employee_name
                .cmp(&right.employee_name)
                .then_with(|| left.unit_name.cmp(&right.unit_name))
        });
        Ok(views)
    }

    /// Bind an employee to a unit and re-split the unit's quota.
    pub fn add_assignment(
        &self,
        request: AssignmentRequest,
    ) -> Result<AssignmentChange, WorkloadServiceError> {
        let _catalog = self.catalog_gate.read().unwrap_or_else(PoisonError::into_inner);
        let employee = self
            .repository
            .employee(request.employee_id)?
            .ok_or_else(|| not_found("employee", request.employee_id.0))?;
        let catalog = self.role_catalog()?;
        let role = catalog.get(&employee.role)?;

        let action = match request.action {
            Some(action) => {
                catalog.ensure_permitted(&role.name, action)?;
                action
            }
            None => role.default_action(),
        };

        let lock = self.unit_lock(request.unit_id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let snapshot = self.snapshot(request.unit_id)?;
        if snapshot
            .assignments
            .iter()
            .any(|assignment| assignment.employee_id == employee.id)
        {
            return Err(WorkloadServiceError::AlreadyAssigned {
                employee: employee.id,
                unit: request.unit_id,
            });
        }

        let inserted = self.repository.insert_assignment(Assignment {
            id: AssignmentId(next_id(&ASSIGNMENT_SEQUENCE)),
            employee_id: employee.id,
            unit_id: request.unit_id,
            action,
            percentage: PLACEHOLDER_PERCENTAGE,
            created_at: Utc::now(),
        })?;

        let redistribution = self.redistribute_locked(request.unit_id)?;
        let assignment = self
            .repository
            .assignment(inserted.id)?
            .ok_or_else(|| not_found("assignment", inserted.id.0))?;

        info!(
            assignment = %assignment.id,
            employee = %employee.id,
            unit = %request.unit_id,
            %action,
            percentage = assignment.percentage,
            "employee assigned; unit redistributed"
        );

        Ok(AssignmentChange {
            assignment,
            redistribution,
        })
    }

    /// Switch the action kind of an assignment. Shares do not depend on it, so no re-split.
    pub fn change_assignment_action(
        &self,
        id: AssignmentId,
        action: ActionKind,
    ) -> Result<Assignment, WorkloadServiceError> {
        let _catalog = self.catalog_gate.read().unwrap_or_else(PoisonError::into_inner);
        let assignment = self
            .repository
            .assignment(id)?
            .ok_or_else(|| not_found("assignment", id.0))?;
        let employee = self
            .repository
            .employee(assignment.employee_id)?
            .ok_or_else(|| not_found("employee", assignment.employee_id.0))?;
        self.role_catalog()?
            .ensure_permitted(&employee.role, action)?;

        let lock = self.unit_lock(assignment.unit_id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let updated = self.repository.update_assignment_action(id, action)?;
        info!(assignment = %id, %action, "assignment action changed");
        Ok(updated)
    }

    /// Unbind an assignment and re-split the remaining members of its unit.
    pub fn remove_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<AssignmentChange, WorkloadServiceError> {
        let existing = self
            .repository
            .assignment(id)?
            .ok_or_else(|| not_found("assignment", id.0))?;

        let lock = self.unit_lock(existing.unit_id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let removed = self.repository.delete_assignment(id)?;
        let redistribution = self.redistribute_locked(removed.unit_id)?;
        info!(assignment = %id, unit = %removed.unit_id, "assignment removed; unit redistributed");

        Ok(AssignmentChange {
            assignment: removed,
            redistribution,
        })
    }

    pub fn redistribute_unit(
        &self,
        id: UnitId,
    ) -> Result<RedistributionReport, WorkloadServiceError> {
        let lock = self.unit_lock(id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.redistribute_locked(id)
    }

    // Read views

    pub fn unit_details(&self, id: UnitId) -> Result<UnitDetails, WorkloadServiceError> {
        let snapshot = self.snapshot(id)?;
        let catalog = self.role_catalog()?;
        let table = self.scoring_table()?;
        let employees = self.employee_index()?;

        let (aggregates, members) = evaluate_unit(&snapshot, &employees, &catalog, &table)?;
        let categories = member_categories(&snapshot, &employees, &catalog)?;
        let validation = engine::validate_unit(categories);

        Ok(UnitDetails {
            unit: snapshot.unit,
            aggregates,
            members,
            validation,
        })
    }

    pub fn validate_unit(&self, id: UnitId) -> Result<ValidationReport, WorkloadServiceError> {
        let snapshot = self.snapshot(id)?;
        let catalog = self.role_catalog()?;
        let employees = self.employee_index()?;
        let categories = member_categories(&snapshot, &employees, &catalog)?;
        let report = engine::validate_unit(categories);
        if !report.is_valid {
            debug!(unit = %id, errors = report.errors.len(), "unit composition invalid");
        }
        Ok(report)
    }

    pub fn employee_scoring(
        &self,
        id: EmployeeId,
    ) -> Result<EmployeeScoring, WorkloadServiceError> {
        let employee = self
            .repository
            .employee(id)?
            .ok_or_else(|| not_found("employee", id.0))?;
        let catalog = self.role_catalog()?;
        let table = self.scoring_table()?;
        let employees = self.employee_index()?;

        let mut units = Vec::new();
        for assignment in self.repository.assignments_for_employee(id)? {
            let Some(snapshot) = self.repository.unit_snapshot(assignment.unit_id)? else {
                continue;
            };
            let (_, members) = evaluate_unit(&snapshot, &employees, &catalog, &table)?;
            let Some(member) = members
                .into_iter()
                .find(|member| member.assignment_id == assignment.id)
            else {
                continue;
            };

            units.push(UnitScore {
                unit_id: snapshot.unit.id,
                unit_name: snapshot.unit.name,
                complexity: snapshot.unit.complexity,
                action: member.action,
                percentage: member.percentage,
                articles_assigned: member.articles_assigned,
                breakdown: member.breakdown,
                score: member.score,
            });
        }

        units.sort_by(|left, right| left.unit_name.cmp(&right.unit_name));
        let total_score = engine::employee_total(units.iter().map(|unit| &unit.score));

        Ok(EmployeeScoring {
            employee_id: employee.id,
            employee_name: employee.name,
            role: employee.role,
            units,
            total_score,
        })
    }

    pub fn workload_norms(&self) -> Result<WorkloadNorm, WorkloadServiceError> {
        let catalog = self.role_catalog()?;
        let units = self.repository.units()?;
        let capacities = self
            .repository
            .employees()?
            .iter()
            .map(|employee| catalog.capacity_of(&employee.role))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WorkloadNorm::compute(
            units.iter().map(|unit| unit.monthly_articles),
            capacities,
        ))
    }

    pub fn employee_workloads(&self) -> Result<Vec<EmployeeWorkload>, WorkloadServiceError> {
        let catalog = self.role_catalog()?;
        let norms = self.workload_norms()?;
        let quotas: HashMap<UnitId, u32> = self
            .repository
            .units()?
            .into_iter()
            .map(|unit| (unit.id, unit.monthly_articles))
            .collect();

        let mut by_employee: HashMap<EmployeeId, Vec<Assignment>> = HashMap::new();
        for assignment in self.repository.assignments()? {
            by_employee
                .entry(assignment.employee_id)
                .or_default()
                .push(assignment);
        }

        let mut workloads = Vec::new();
        for employee in self.list_employees()? {
            let capacity_weight = catalog.capacity_of(&employee.role)?;
            let assignments = by_employee.remove(&employee.id).unwrap_or_default();
            let actual_articles: u64 = assignments
                .iter()
                .map(|assignment| {
                    let quota = quotas.get(&assignment.unit_id).copied().unwrap_or_default();
                    u64::from(articles_for(assignment.percentage, quota))
                })
                .sum();
            let assessment = norms.assess(actual_articles, capacity_weight);
            if assessment.overloaded {
                debug!(employee = %employee.id, load = assessment.load_percentage, "employee above norm");
            }

            workloads.push(EmployeeWorkload {
                employee_id: employee.id,
                employee_name: employee.name,
                role: employee.role,
                capacity_weight,
                assigned_units: assignments.len(),
                total_percentage: assignments.iter().map(|a| a.percentage).sum(),
                assessment,
            });
        }

        Ok(workloads)
    }

    pub fn analytics(&self) -> Result<AnalyticsReport, WorkloadServiceError> {
        let mut by_unit: BTreeMap<UnitId, Vec<Assignment>> = BTreeMap::new();
        for assignment in self.repository.assignments()? {
            by_unit.entry(assignment.unit_id).or_default().push(assignment);
        }

        let units = self
            .list_units()?
            .into_iter()
            .map(|unit| {
                let assignments = by_unit.remove(&unit.id).unwrap_or_default();
                let total_percentage: f64 = assignments.iter().map(|a| a.percentage).sum();
                let coverage_percentage = if unit.monthly_articles > 0 {
                    engine::round2(total_percentage)
                } else {
                    0.0
                };

                UnitCoverage {
                    unit_id: unit.id,
                    weighted_articles: engine::round2(
                        f64::from(unit.monthly_articles) * unit.complexity.coefficient(),
                    ),
                    assigned_employees: assignments.len(),
                    total_percentage,
                    coverage_percentage,
                    articles_allocated: assignments
                        .iter()
                        .map(|a| u64::from(articles_for(a.percentage, unit.monthly_articles)))
                        .sum(),
                    unit_name: unit.name,
                    monthly_articles: unit.monthly_articles,
                    complexity: unit.complexity,
                }
            })
            .collect();

        Ok(AnalyticsReport {
            units,
            norms: self.workload_norms()?,
        })
    }

    // Internals

    /// Lock for a stored unit. Ids the repository does not know never get an entry.
    fn unit_lock(&self, unit: UnitId) -> Result<Arc<Mutex<()>>, WorkloadServiceError> {
        let mut locks = self
            .unit_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(&unit) {
            return Ok(Arc::clone(lock));
        }
        self.repository
            .unit(unit)?
            .ok_or_else(|| not_found("unit", unit.0))?;
        Ok(Arc::clone(locks.entry(unit).or_default()))
    }

    /// Locks for the listed units that still exist, in id order.
    fn existing_unit_locks(
        &self,
        units: &BTreeSet<UnitId>,
    ) -> Result<Vec<(UnitId, Arc<Mutex<()>>)>, WorkloadServiceError> {
        let mut locks = Vec::with_capacity(units.len());
        for unit in units {
            match self.unit_lock(*unit) {
                Ok(lock) => locks.push((*unit, lock)),
                Err(WorkloadServiceError::NotFound { .. }) => {}
                Err(error) => return Err(error),
            }
        }
        Ok(locks)
    }

    #[cfg(test)]
    pub(crate) fn tracked_unit_locks(&self) -> usize {
        self.unit_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn snapshot(&self, id: UnitId) -> Result<UnitSnapshot, WorkloadServiceError> {
        self.repository
            .unit_snapshot(id)?
            .ok_or_else(|| not_found("unit", id.0))
    }

    fn employee_index(&self) -> Result<HashMap<EmployeeId, Employee>, WorkloadServiceError> {
        Ok(self
            .repository
            .employees()?
            .into_iter()
            .map(|employee| (employee.id, employee))
            .collect())
    }

    /// Like `redistribute_locked`, for a unit that may have been deleted since it was listed.
    fn redistribute_if_present(&self, id: UnitId) -> Result<(), WorkloadServiceError> {
        match self.redistribute_locked(id) {
            Ok(_) | Err(WorkloadServiceError::NotFound { entity: "unit", .. }) => Ok(()),
            Err(error) => Err(error),
        }
    }

    /// Must be called with the unit's lock held.
    fn redistribute_locked(
        &self,
        id: UnitId,
    ) -> Result<RedistributionReport, WorkloadServiceError> {
        let snapshot = self.snapshot(id)?;
        let catalog = self.role_catalog()?;
        let employees = self.employee_index()?;

        let mut members = Vec::with_capacity(snapshot.assignments.len());
        for assignment in &snapshot.assignments {
            let employee = employees
                .get(&assignment.employee_id)
                .ok_or_else(|| not_found("employee", assignment.employee_id.0))?;
            let capacity_weight = catalog.capacity_of(&employee.role)?;
            members.push((assignment, employee, capacity_weight));
        }

        let entries: Vec<AllocationEntry> = members
            .iter()
            .map(|(assignment, employee, capacity_weight)| AllocationEntry {
                assignment_id: assignment.id,
                employee_id: employee.id,
                capacity_weight: *capacity_weight,
            })
            .collect();

        let allocations = self.calculator.redistribute(
            snapshot.unit.monthly_articles,
            snapshot.unit.complexity,
            &entries,
        )?;

        if allocations.is_empty() {
            if !entries.is_empty() {
                warn!(unit = %id, "unit has no capacity to allocate; shares left unchanged");
            }
        } else {
            self.repository.apply_allocations(id, &allocations)?;
        }

        let redistributions: Vec<RedistributionEntry> = members
            .iter()
            .zip(&allocations)
            .map(|((assignment, employee, _), allocation)| RedistributionEntry {
                assignment_id: assignment.id,
                employee_id: employee.id,
                employee_name: employee.name.clone(),
                role: employee.role.clone(),
                old_percentage: assignment.percentage,
                new_percentage: allocation.percentage,
                articles_assigned: allocation.articles_assigned,
            })
            .collect();

        let total_coverage: f64 = allocations.iter().map(|a| a.percentage).sum();
        debug!(
            unit = %id,
            members = redistributions.len(),
            total_coverage,
            policy = ?self.calculator.policy(),
            "unit redistributed"
        );

        Ok(RedistributionReport {
            unit_id: id,
            monthly_articles: snapshot.unit.monthly_articles,
            total_coverage,
            redistributions,
        })
    }
}

/// Classify and score every member of one unit against aggregates computed once for the unit.
fn evaluate_unit(
    snapshot: &UnitSnapshot,
    employees: &HashMap<EmployeeId, Employee>,
    catalog: &RoleCatalog,
    table: &ScoringTable,
) -> Result<(UnitAggregates, Vec<MemberDetail>), WorkloadServiceError> {
    let quota = snapshot.unit.monthly_articles;
    let aggregates = UnitAggregates::from_assignments(
        snapshot
            .assignments
            .iter()
            .map(|assignment| (assignment.action, articles_for(assignment.percentage, quota))),
    );

    let mut members = Vec::with_capacity(snapshot.assignments.len());
    for assignment in &snapshot.assignments {
        let employee = employees
            .get(&assignment.employee_id)
            .ok_or_else(|| not_found("employee", assignment.employee_id.0))?;
        let role = catalog.get(&employee.role)?;
        let articles_assigned = articles_for(assignment.percentage, quota);
        let breakdown = engine::classify(articles_assigned, assignment.action, &aggregates);
        let card = engine::score(&breakdown, snapshot.unit.complexity, table);

        members.push(MemberDetail {
            assignment_id: assignment.id,
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            role: role.name.clone(),
            role_label: role.label().to_string(),
            capacity_weight: role.capacity_weight,
            action: assignment.action,
            action_label: assignment.action.label(),
            percentage: assignment.percentage,
            articles_assigned,
            breakdown,
            score: card,
        });
    }

    members.sort_by(|left, right| {
        left.role
            .cmp(&right.role)
            .then_with(|| left.employee_name.cmp(&right.employee_name))
    });
    Ok((aggregates, members))
}

/// Role category of every member of the unit, in assignment order.
fn member_categories(
    snapshot: &UnitSnapshot,
    employees: &HashMap<EmployeeId, Employee>,
    catalog: &RoleCatalog,
) -> Result<Vec<RoleCategory>, WorkloadServiceError> {
    snapshot
        .assignments
        .iter()
        .map(|assignment| {
            let employee = employees
                .get(&assignment.employee_id)
                .ok_or_else(|| not_found("employee", assignment.employee_id.0))?;
            Ok(catalog.get(&employee.role)?.category())
        })
        .collect()
}

fn not_found(entity: &'static str, id: u64) -> WorkloadServiceError {
    WorkloadServiceError::NotFound { entity, id }
}

fn require_name(entity: &'static str, raw: &str) -> Result<String, WorkloadServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WorkloadServiceError::InvalidInput(format!(
            "{entity} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn normalize_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn dedupe_actions(actions: Vec<ActionKind>) -> Vec<ActionKind> {
    let mut unique = Vec::with_capacity(actions.len());
    for action in actions {
        if !unique.contains(&action) {
            unique.push(action);
        }
    }
    unique
}

/// Error raised by the workload service.
#[derive(Debug, thiserror::Error)]
pub enum WorkloadServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("employee {employee} is already assigned to unit {unit}")]
    AlreadyAssigned { employee: EmployeeId, unit: UnitId },
    #[error("role '{role}' is still referenced by {employees} employee(s)")]
    RoleInUse { role: String, employees: usize },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
