//! An editing session: the request configuration, the role catalog and
//! the settings store, with change notification for observers.

use log::debug;

use crate::config::{CertificateRequestConfig, ConfigField, ConfigObserver, IdType};
use crate::error::{CatalogError, CreateError, SettingsError, UsageError};
use crate::orchestrator::{IssuanceOutcome, Orchestrator, SecretPrompt};
use crate::pkcs12::CaLoader;
use crate::provider::CertificateProvider;
use crate::roles::RoleCatalog;
use crate::settings::SettingsStore;
use crate::validation::{self, ValidationError};

/// One editing session: the configuration being edited, the role catalog
/// and the store the configuration came from.
///
/// All changes to the configuration go through the session so that every
/// subscribed [`ConfigObserver`] hears about them.
pub struct CertBuilder<S> {
    config: CertificateRequestConfig,
    catalog: RoleCatalog,
    store: S,
    observers: Vec<Box<dyn ConfigObserver>>,
}

impl<S: SettingsStore> CertBuilder<S> {
    /// Starts a session with the configuration saved in `store`, or the
    /// default one.
    pub fn new(store: S) -> Self {
        let config = store.load();
        Self {
            config,
            catalog: RoleCatalog::new(),
            store,
            observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &CertificateRequestConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn subscribe(&mut self, observer: impl ConfigObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Applies `change` to the configuration and notifies observers that
    /// `field` changed.
    pub fn update<R>(
        &mut self,
        field: ConfigField,
        change: impl FnOnce(&mut CertificateRequestConfig) -> R,
    ) -> R {
        let result = change(&mut self.config);
        self.notify(field);
        result
    }

    /// Replaces the whole configuration, for example with the defaults.
    pub fn replace(&mut self, config: CertificateRequestConfig) {
        self.config = config;
        for field in ALL_FIELDS {
            self.notify(field);
        }
    }

    fn notify(&self, field: ConfigField) {
        debug!("configuration field {field} changed");
        for observer in &self.observers {
            observer.field_changed(&self.config, field);
        }
    }

    /// Roles offered for the currently selected identifier type.
    pub fn available_roles(&self) -> &[String] {
        self.catalog.list_for(self.config.subject_alt_name.id_type)
    }

    pub fn add_custom_role(&mut self, id_type: IdType, name: &str) -> Result<(), CatalogError> {
        self.catalog.add_custom(id_type, name)
    }

    pub fn select_roles<I, R>(&mut self, candidates: I) -> Result<usize, UsageError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        self.update(ConfigField::SubjectAltName, |config| {
            config.subject_alt_name.select(candidates)
        })
    }

    pub fn deselect_roles<I, R>(&mut self, targets: I) -> Result<usize, UsageError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        self.update(ConfigField::SubjectAltName, |config| {
            config.subject_alt_name.deselect(targets)
        })
    }

    pub fn clear_roles(&mut self) {
        self.update(ConfigField::SubjectAltName, |config| {
            config.subject_alt_name.clear()
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(&self.config)
    }

    /// Runs a creation attempt for the current configuration.
    pub fn create_certificate<P, L, Q>(
        &self,
        orchestrator: &mut Orchestrator<P, L, Q>,
    ) -> Result<IssuanceOutcome, CreateError>
    where
        P: CertificateProvider,
        L: CaLoader,
        Q: SecretPrompt,
    {
        orchestrator.create_certificate(&self.config)
    }

    pub fn save_settings(&self) -> Result<(), SettingsError> {
        self.store.save(&self.config)
    }
}

const ALL_FIELDS: [ConfigField; 11] = [
    ConfigField::SelfSigned,
    ConfigField::CaCertificate,
    ConfigField::SigningAlgorithm,
    ConfigField::CaCertFile,
    ConfigField::ExpiresYears,
    ConfigField::DestinationDirectory,
    ConfigField::FileNameNoExtension,
    ConfigField::AddSubjectAltName,
    ConfigField::DistinguishedName,
    ConfigField::KeyUsage,
    ConfigField::SubjectAltName,
];

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::settings::JsonFileStore;

    fn session(dir: &tempfile::TempDir) -> CertBuilder<JsonFileStore> {
        CertBuilder::new(JsonFileStore::new(dir.path().join("settings.json")))
    }

    #[test]
    fn test_observers_see_each_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = session(&dir);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        builder.subscribe(move |config: &CertificateRequestConfig, field: ConfigField| {
            sink.borrow_mut().push((field, config.expires_years));
        });

        builder.update(ConfigField::ExpiresYears, |config| config.expires_years = 2);
        builder.select_roles(["ESRP"]).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![(ConfigField::ExpiresYears, 2), (ConfigField::SubjectAltName, 2)]
        );
        assert_eq!(builder.config().subject_alt_name.roles(), ["ESRP"]);
    }

    #[test]
    fn test_available_roles_follow_id_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = session(&dir);
        builder.update(ConfigField::SubjectAltName, |config| {
            config.subject_alt_name.id_type = IdType::AgentId
        });
        builder.add_custom_role(IdType::AgentId, "Trainee").unwrap();

        assert_eq!(builder.available_roles().first().map(String::as_str), Some("Call Taker"));
        assert_eq!(builder.available_roles().last().map(String::as_str), Some("Trainee"));
    }

    #[test]
    fn test_saved_settings_seed_the_next_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = session(&dir);
        first.update(ConfigField::FileNameNoExtension, |config| {
            config.file_name_no_extension = "lvf".to_string()
        });
        first.select_roles(["LVF"]).unwrap();
        first.save_settings().unwrap();

        let second = session(&dir);
        assert_eq!(second.config(), first.config());
    }

    #[test]
    fn test_failed_role_operations_still_leave_roles_intact() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = session(&dir);
        builder.select_roles(["ESRP", "ECRF"]).unwrap();
        assert_eq!(
            builder.deselect_roles(Vec::<&str>::new()),
            Err(UsageError::NoSelection)
        );
        assert_eq!(builder.deselect_roles(["ECRF"]), Ok(1));
        builder.clear_roles();
        assert!(builder.config().subject_alt_name.roles().is_empty());
    }
}
