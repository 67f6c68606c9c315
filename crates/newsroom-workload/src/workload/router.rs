use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::ScoringError;
use super::domain::{
    ActionKind, AssignmentId, AssignmentRequest, ComplexityTier, EmployeeDraft, EmployeeId,
    RoleDraft, RoleId, ScoringRuleDraft, UnitDraft, UnitId,
};
use super::repository::{RepositoryError, WorkloadRepository};
use super::service::{WorkloadService, WorkloadServiceError};

/// Router builder exposing the workload use cases over HTTP.
pub fn workload_router<R>(service: Arc<WorkloadService<R>>) -> Router
where
    R: WorkloadRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/units",
            get(list_units_handler::<R>).post(create_unit_handler::<R>),
        )
        .route(
            "/api/v1/units/:unit_id",
            put(update_unit_handler::<R>).delete(delete_unit_handler::<R>),
        )
        .route(
            "/api/v1/units/:unit_id/details",
            get(unit_details_handler::<R>),
        )
        .route(
            "/api/v1/units/:unit_id/validation",
            get(unit_validation_handler::<R>),
        )
        .route(
            "/api/v1/units/:unit_id/redistribute",
            post(redistribute_handler::<R>),
        )
        .route(
            "/api/v1/employees",
            get(list_employees_handler::<R>).post(create_employee_handler::<R>),
        )
        .route(
            "/api/v1/employees/:employee_id",
            put(update_employee_handler::<R>).delete(delete_employee_handler::<R>),
        )
        .route(
            "/api/v1/employees/:employee_id/scoring",
            get(employee_scoring_handler::<R>),
        )
        .route(
            "/api/v1/roles",
            get(list_roles_handler::<R>).post(create_role_handler::<R>),
        )
        .route(
            "/api/v1/roles/:role_id",
            put(update_role_handler::<R>).delete(delete_role_handler::<R>),
        )
        .route("/api/v1/scoring-rules", get(list_scoring_rules_handler::<R>))
        .route(
            "/api/v1/scoring-rules/:action/:complexity",
            put(update_scoring_rule_handler::<R>),
        )
        .route(
            "/api/v1/assignments",
            get(list_assignments_handler::<R>).post(add_assignment_handler::<R>),
        )
        .route(
            "/api/v1/assignments/:assignment_id",
            axum::routing::patch(change_action_handler::<R>)
                .delete(remove_assignment_handler::<R>),
        )
        .route("/api/v1/workload/norms", get(norms_handler::<R>))
        .route("/api/v1/workload/employees", get(employee_workloads_handler::<R>))
        .route("/api/v1/analytics", get(analytics_handler::<R>))
        .with_state(service)
}

type ServiceState<R> = State<Arc<WorkloadService<R>>>;

#[derive(Debug, Deserialize)]
pub(crate) struct ActionChange {
    pub(crate) action: ActionKind,
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, WorkloadServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

fn respond_empty(result: Result<(), WorkloadServiceError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

/// Status code a service error maps to at the HTTP boundary.
pub(crate) fn status_for(error: &WorkloadServiceError) -> StatusCode {
    match error {
        WorkloadServiceError::InvalidInput(_)
        | WorkloadServiceError::Catalog(_)
        | WorkloadServiceError::Allocation(_)
        | WorkloadServiceError::Scoring(ScoringError::InvalidPoints { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        WorkloadServiceError::NotFound { .. }
        | WorkloadServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        WorkloadServiceError::AlreadyAssigned { .. }
        | WorkloadServiceError::RoleInUse { .. }
        | WorkloadServiceError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
        WorkloadServiceError::Scoring(ScoringError::Incomplete { .. })
        | WorkloadServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: WorkloadServiceError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::warn!(%error, "workload request failed");
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn invalid_path(message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

pub(crate) async fn list_units_handler<R>(State(service): ServiceState<R>) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.list_units())
}

pub(crate) async fn create_unit_handler<R>(
    State(service): ServiceState<R>,
    Json(draft): Json<UnitDraft>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::CREATED, service.create_unit(draft))
}

pub(crate) async fn update_unit_handler<R>(
    State(service): ServiceState<R>,
    Path(unit_id): Path<u64>,
    Json(draft): Json<UnitDraft>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.update_unit(UnitId(unit_id), draft))
}

pub(crate) async fn delete_unit_handler<R>(
    State(service): ServiceState<R>,
    Path(unit_id): Path<u64>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond_empty(service.delete_unit(UnitId(unit_id)))
}

pub(crate) async fn unit_details_handler<R>(
    State(service): ServiceState<R>,
    Path(unit_id): Path<u64>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.unit_details(UnitId(unit_id)))
}

pub(crate) async fn unit_validation_handler<R>(
    State(service): ServiceState<R>,
    Path(unit_id): Path<u64>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.validate_unit(UnitId(unit_id)))
}

pub(crate) async fn redistribute_handler<R>(
    State(service): ServiceState<R>,
    Path(unit_id): Path<u64>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.redistribute_unit(UnitId(unit_id)))
}

pub(crate) async fn list_employees_handler<R>(State(service): ServiceState<R>) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.list_employees())
}

pub(crate) async fn create_employee_handler<R>(
    State(service): ServiceState<R>,
    Json(draft): Json<EmployeeDraft>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::CREATED, service.create_employee(draft))
}

pub(crate) async fn update_employee_handler<R>(
    State(service): ServiceState<R>,
    Path(employee_id): Path<u64>,
    Json(draft): Json<EmployeeDraft>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_employee(EmployeeId(employee_id), draft),
    )
}

pub(crate) async fn delete_employee_handler<R>(
    State(service): ServiceState<R>,
    Path(employee_id): Path<u64>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond_empty(service.delete_employee(EmployeeId(employee_id)))
}

pub(crate) async fn employee_scoring_handler<R>(
    State(service): ServiceState<R>,
    Path(employee_id): Path<u64>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.employee_scoring(EmployeeId(employee_id)),
    )
}

pub(crate) async fn list_roles_handler<R>(State(service): ServiceState<R>) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.list_roles())
}

pub(crate) async fn create_role_handler<R>(
    State(service): ServiceState<R>,
    Json(draft): Json<RoleDraft>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::CREATED, service.create_role(draft))
}

pub(crate) async fn update_role_handler<R>(
    State(service): ServiceState<R>,
    Path(role_id): Path<u64>,
    Json(draft): Json<RoleDraft>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.update_role(RoleId(role_id), draft))
}

pub(crate) async fn delete_role_handler<R>(
    State(service): ServiceState<R>,
    Path(role_id): Path<u64>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond_empty(service.delete_role(RoleId(role_id)))
}

pub(crate) async fn list_scoring_rules_handler<R>(State(service): ServiceState<R>) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.list_scoring_rules())
}

pub(crate) async fn update_scoring_rule_handler<R>(
    State(service): ServiceState<R>,
    Path((action, complexity)): Path<(String, String)>,
    Json(draft): Json<ScoringRuleDraft>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    let Some(action) = ActionKind::parse(&action) else {
        return invalid_path(format!("unknown action kind '{action}'"));
    };
    let Some(complexity) = ComplexityTier::parse(&complexity) else {
        return invalid_path(format!("unknown complexity tier '{complexity}'"));
    };

    respond(
        StatusCode::OK,
        service.update_scoring_rule(action, complexity, draft),
    )
}

pub(crate) async fn list_assignments_handler<R>(State(service): ServiceState<R>) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.list_assignments())
}

pub(crate) async fn add_assignment_handler<R>(
    State(service): ServiceState<R>,
    Json(request): Json<AssignmentRequest>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::CREATED, service.add_assignment(request))
}

pub(crate) async fn change_action_handler<R>(
    State(service): ServiceState<R>,
    Path(assignment_id): Path<u64>,
    Json(change): Json<ActionChange>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.change_assignment_action(AssignmentId(assignment_id), change.action),
    )
}

pub(crate) async fn remove_assignment_handler<R>(
    State(service): ServiceState<R>,
    Path(assignment_id): Path<u64>,
) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.remove_assignment(AssignmentId(assignment_id)),
    )
}

pub(crate) async fn norms_handler<R>(State(service): ServiceState<R>) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.workload_norms())
}

pub(crate) async fn employee_workloads_handler<R>(State(service): ServiceState<R>) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.employee_workloads())
}

pub(crate) async fn analytics_handler<R>(State(service): ServiceState<R>) -> Response
where
    R: WorkloadRepository + 'static,
{
    respond(StatusCode::OK, service.analytics())
}
