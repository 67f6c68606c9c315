use metrics_exporter_prometheus::PrometheusHandle;
use newsroom_workload::config::EngineConfig;
use newsroom_workload::error::AppError;
use newsroom_workload::workload::seed::{load_default_catalogs, load_roster};
use newsroom_workload::workload::{
    load_sample_newsroom, InMemoryWorkloadRepository, RosterImporter, SeedSummary,
    WorkloadService,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type MemoryService = WorkloadService<InMemoryWorkloadRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Where the newsroom roster comes from when a service starts.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RosterSource<'a> {
    /// Catalogs only, no units or employees.
    Empty,
    Sample,
    Csv { units: &'a Path, employees: &'a Path },
}

pub(crate) fn build_service(
    engine: EngineConfig,
    source: RosterSource<'_>,
    assign_preferred: bool,
) -> Result<(Arc<MemoryService>, SeedSummary), AppError> {
    let repository = Arc::new(InMemoryWorkloadRepository::new());
    let service = WorkloadService::new(repository, engine);

    let summary = match source {
        RosterSource::Empty => load_default_catalogs(&service)?,
        RosterSource::Sample => load_sample_newsroom(&service, assign_preferred)?,
        RosterSource::Csv { units, employees } => {
            let units = RosterImporter::units_from_path(units)?;
            let employees = RosterImporter::employees_from_path(employees)?;
            let catalogs = load_default_catalogs(&service)?;
            let roster = load_roster(&service, units, employees, assign_preferred)?;
            SeedSummary {
                roles: catalogs.roles,
                scoring_rules: catalogs.scoring_rules,
                ..roster
            }
        }
    };

    Ok((Arc::new(service), summary))
}
