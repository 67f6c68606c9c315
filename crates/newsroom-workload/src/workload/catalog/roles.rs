use std::collections::BTreeMap;

use super::super::domain::{ActionKind, Role, RoleDraft};

/// Errors raised while building or querying the role catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("role '{0}' is not defined in the catalog")]
    UnknownRole(String),
    #[error("role name must not be empty")]
    EmptyRoleName,
    #[error("role '{role}' has capacity weight {weight}; expected a positive number")]
    InvalidCapacity { role: String, weight: f64 },
    #[error("role '{0}' must permit at least one action kind")]
    NoPermittedActions(String),
    #[error("role '{role}' does not permit {action}")]
    ActionNotPermitted { role: String, action: ActionKind },
    #[error("role '{0}' is defined more than once")]
    DuplicateRole(String),
}

/// Check the invariants every stored role must satisfy.
pub fn validate_role_draft(draft: &RoleDraft) -> Result<(), CatalogError> {
    validate_fields(&draft.name, draft.capacity_weight, &draft.permitted_actions)
}

fn validate_fields(
    name: &str,
    capacity_weight: f64,
    permitted_actions: &[ActionKind],
) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::EmptyRoleName);
    }

    if !capacity_weight.is_finite() || capacity_weight <= 0.0 {
        return Err(CatalogError::InvalidCapacity {
            role: name.to_string(),
            weight: capacity_weight,
        });
    }

    if permitted_actions.is_empty() {
        return Err(CatalogError::NoPermittedActions(name.to_string()));
    }

    Ok(())
}

/// Lookup of roles by name with capacity and permission checks.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    roles: BTreeMap<String, Role>,
}

impl RoleCatalog {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Result<Self, CatalogError> {
        let mut catalog = BTreeMap::new();
        for mut role in roles {
            validate_fields(&role.name, role.capacity_weight, &role.permitted_actions)?;
            let mut seen = Vec::with_capacity(role.permitted_actions.len());
            role.permitted_actions.retain(|action| {
                if seen.contains(action) {
                    false
                } else {
                    seen.push(*action);
                    true
                }
            });

            if catalog.contains_key(&role.name) {
                return Err(CatalogError::DuplicateRole(role.name));
            }
            catalog.insert(role.name.clone(), role);
        }

        Ok(Self { roles: catalog })
    }

    pub fn get(&self, name: &str) -> Result<&Role, CatalogError> {
        self.roles
            .get(name)
            .ok_or_else(|| CatalogError::UnknownRole(name.to_string()))
    }

    pub fn capacity_of(&self, name: &str) -> Result<f64, CatalogError> {
        self.get(name).map(|role| role.capacity_weight)
    }

    pub fn ensure_permitted(&self, name: &str, action: ActionKind) -> Result<(), CatalogError> {
        let role = self.get(name)?;
        if role.permits(action) {
            Ok(())
        } else {
            Err(CatalogError::ActionNotPermitted {
                role: role.name.clone(),
                action,
            })
        }
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
