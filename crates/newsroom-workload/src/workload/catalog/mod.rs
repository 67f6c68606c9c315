//! Explicit configuration objects handed to every engine call: the role catalog and the
//! scoring table.

mod roles;
mod scoring;

pub use roles::{validate_role_draft, CatalogError, RoleCatalog};
pub use scoring::{MissingRulePolicy, ScoringError, ScoringTable};
