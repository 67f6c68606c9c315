//! Workload allocation and scoring engine for editorial units.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workload;
