//! NG9-1-1 role names: the per-identifier-type catalog offered for
//! selection, and the selected-roles operations on [`SanParams`].

use std::collections::BTreeMap;

use log::debug;

use crate::config::{IdType, SanParams};
use crate::error::{CatalogError, UsageError};

const ELEMENT_ROLES: &[&str] = &[
    "ESRP",
    "ECRF",
    "LVF",
    "BCF",
    "PSAP CHE",
    "Logging Service",
    "Policy Store",
    "MCS",
    "ADR",
    "IMR",
    "LNG",
    "LPG",
];

const SERVICE_ROLES: &[&str] = &[
    "ECRF",
    "LVF",
    "ESRP",
    "Logging Service",
    "Policy Store",
    "MCS",
    "ADR",
    "Identity Provider",
    "GIS Service",
];

const AGENCY_ROLES: &[&str] = &[
    "PSAP",
    "911 Authority",
    "Law Enforcement",
    "Fire",
    "EMS",
    "ESInet Operator",
    "Service Provider",
];

const AGENT_ROLES: &[&str] = &[
    "Call Taker",
    "Dispatcher",
    "Supervisor",
    "Administrator",
    "GIS Analyst",
];

const CA_ROLES: &[&str] = &["Root CA", "Intermediate CA", "Issuing CA"];

/// Role names offered for each identifier type.
///
/// Starts with the built-in lists and only ever grows: custom roles are
/// appended for the lifetime of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCatalog {
    lists: BTreeMap<IdType, Vec<String>>,
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleCatalog {
    pub fn new() -> Self {
        let lists = IdType::ALL
            .into_iter()
            .map(|id_type| {
                let builtin = match id_type {
                    IdType::ElementId => ELEMENT_ROLES,
                    IdType::ServiceId => SERVICE_ROLES,
                    IdType::AgencyId => AGENCY_ROLES,
                    IdType::AgentId => AGENT_ROLES,
                    IdType::CaId => CA_ROLES,
                };
                (id_type, builtin.iter().map(|r| r.to_string()).collect())
            })
            .collect();
        Self { lists }
    }

    /// Built-in roles for `id_type` followed by any custom roles added to it.
    pub fn list_for(&self, id_type: IdType) -> &[String] {
        self.lists.get(&id_type).map(Vec::as_slice).unwrap_or_default()
    }

    /// Appends a custom role to the `id_type` list.
    ///
    /// Names are compared exactly, so `"psap"` and `"PSAP"` are different
    /// roles.
    pub fn add_custom(&mut self, id_type: IdType, name: &str) -> Result<(), CatalogError> {
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let list = self.lists.entry(id_type).or_default();
        if list.iter().any(|role| role == name) {
            return Err(CatalogError::DuplicateRole {
                id_type,
                name: name.to_string(),
            });
        }

        debug!("custom role '{name}' added to the {id_type} catalog");
        list.push(name.to_string());
        Ok(())
    }
}

impl SanParams {
    /// Appends each candidate not already selected, in candidate order.
    /// Returns how many roles were added; empty and already-selected
    /// candidates are skipped.
    pub fn select<I, S>(&mut self, candidates: I) -> Result<usize, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut offered = 0;
        let mut added = 0;
        for candidate in candidates {
            offered += 1;
            let candidate = candidate.as_ref();
            if candidate.is_empty() {
                continue;
            }
            if !self.roles.iter().any(|role| role == candidate) {
                self.roles.push(candidate.to_string());
                added += 1;
            }
        }

        if offered == 0 {
            return Err(UsageError::NoSelection);
        }
        Ok(added)
    }

    /// Removes each target that is selected. Returns how many were removed.
    pub fn deselect<I, S>(&mut self, targets: I) -> Result<usize, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets: Vec<S> = targets.into_iter().collect();
        if targets.is_empty() {
            return Err(UsageError::NoSelection);
        }

        let before = self.roles.len();
        self.roles
            .retain(|role| !targets.iter().any(|target| target.as_ref() == role));
        Ok(before - self.roles.len())
    }

    pub fn clear(&mut self) {
        self.roles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_type_has_builtin_roles() {
        let catalog = RoleCatalog::new();
        for id_type in IdType::ALL {
            assert!(!catalog.list_for(id_type).is_empty(), "{id_type}");
        }
        assert_eq!(catalog.list_for(IdType::CaId)[0], "Root CA");
    }

    #[test]
    fn test_add_custom_appends_at_tail() {
        let mut catalog = RoleCatalog::new();
        let before = catalog.list_for(IdType::AgentId).to_vec();

        catalog.add_custom(IdType::AgentId, "Trainee").unwrap();

        let after = catalog.list_for(IdType::AgentId);
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(&after[..before.len()], before.as_slice());
        assert_eq!(after.last().map(String::as_str), Some("Trainee"));
        // other lists untouched
        assert_eq!(catalog.list_for(IdType::AgencyId), RoleCatalog::new().list_for(IdType::AgencyId));
    }

    #[test]
    fn test_add_custom_rejects_exact_duplicates_only() {
        let mut catalog = RoleCatalog::new();
        assert_eq!(
            catalog.add_custom(IdType::AgencyId, "PSAP"),
            Err(CatalogError::DuplicateRole {
                id_type: IdType::AgencyId,
                name: "PSAP".to_string()
            })
        );
        assert!(catalog.add_custom(IdType::AgencyId, "psap").is_ok());
        assert!(catalog.add_custom(IdType::AgencyId, "psap").is_err());
        // same name is fine under another id type
        assert!(catalog.add_custom(IdType::AgentId, "PSAP").is_ok());
        assert_eq!(catalog.add_custom(IdType::AgentId, ""), Err(CatalogError::EmptyName));
    }

    #[test]
    fn test_select_keeps_order_and_is_idempotent() {
        let mut san = SanParams::default();
        assert_eq!(san.select(["ESRP", "BCF", "ESRP"]).unwrap(), 2);
        assert_eq!(san.roles(), ["ESRP", "BCF"]);

        assert_eq!(san.select(["BCF", "ESRP"]).unwrap(), 0);
        assert_eq!(san.roles(), ["ESRP", "BCF"]);

        assert_eq!(san.select(["LVF", "BCF"]).unwrap(), 1);
        assert_eq!(san.roles(), ["ESRP", "BCF", "LVF"]);
    }

    #[test]
    fn test_select_skips_empty_names() {
        let mut san = SanParams::default();
        assert_eq!(san.select([""]).unwrap(), 0);
        assert!(san.roles().is_empty());

        assert_eq!(san.select(["", "ECRF", ""]).unwrap(), 1);
        assert_eq!(san.roles(), ["ECRF"]);
    }

    #[test]
    fn test_empty_selection_is_a_usage_error() {
        let mut san = SanParams::default();
        san.select(["ESRP"]).unwrap();
        assert_eq!(san.select(Vec::<String>::new()), Err(UsageError::NoSelection));
        assert_eq!(san.deselect(Vec::<String>::new()), Err(UsageError::NoSelection));
        assert_eq!(san.roles(), ["ESRP"]);
    }

    #[test]
    fn test_deselect_and_clear() {
        let mut san = SanParams::default();
        san.select(["ESRP", "ECRF", "LVF"]).unwrap();
        assert_eq!(san.deselect(["ECRF", "Not Selected"]).unwrap(), 1);
        assert_eq!(san.roles(), ["ESRP", "LVF"]);
        san.clear();
        assert!(san.roles().is_empty());
    }
}
