//! The "last used settings" document.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::CertificateRequestConfig;
use crate::error::SettingsError;

const SETTINGS_DIR: &str = "CertBuilder";
const SETTINGS_FILE: &str = "CertBuilderSettings.json";

/// Where a session's configuration is loaded from and saved to.
pub trait SettingsStore {
    /// Returns the saved configuration, or the default one when nothing
    /// usable is saved. Never fails.
    fn load(&self) -> CertificateRequestConfig;

    /// Replaces the saved configuration.
    fn save(&self, config: &CertificateRequestConfig) -> Result<(), SettingsError>;
}

/// Pretty-printed JSON document at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the per-user location: the documents directory, or the home
    /// directory when there is none.
    pub fn at_default_location() -> Result<Self, SettingsError> {
        Ok(Self::new(Self::default_location()?))
    }

    pub fn default_location() -> Result<PathBuf, SettingsError> {
        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .ok_or(SettingsError::NoLocation)?;
        Ok(base.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> CertificateRequestConfig {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", self.path.display());
                return CertificateRequestConfig::default();
            }
            Err(err) => {
                warn!(
                    "could not read settings from {}, using defaults: {err}",
                    self.path.display()
                );
                return CertificateRequestConfig::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|err| {
            warn!(
                "settings at {} could not be parsed, using defaults: {err}",
                self.path.display()
            );
            CertificateRequestConfig::default()
        })
    }

    fn save(&self, config: &CertificateRequestConfig) -> Result<(), SettingsError> {
        let io_error = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, content).map_err(io_error)?;

        info!("settings saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IdType, SanParams, SigningAlgorithm};

    #[test]
    fn test_missing_document_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("none.json"));
        assert_eq!(store.load(), CertificateRequestConfig::default());
    }

    #[test]
    fn test_corrupt_document_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(
            JsonFileStore::new(&path).load(),
            CertificateRequestConfig::default()
        );
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        // parent directories are created on save
        let store = JsonFileStore::new(dir.path().join("CertBuilder").join("settings.json"));

        let mut config = CertificateRequestConfig {
            self_signed: false,
            signing_algorithm: SigningAlgorithm::Ecdsa,
            ca_cert_file: Some(dir.path().join("ca.pfx")),
            expires_years: 3,
            destination_directory: dir.path().to_path_buf(),
            file_name_no_extension: "psap1".to_string(),
            ..Default::default()
        };
        config.distinguished_name.common_name = "psap1.county.example".to_string();
        config.distinguished_name.organization = Some("County 911".to_string());
        config.key_usage.digital_signature = true;
        config.key_usage.client_authentication = true;
        config.subject_alt_name = SanParams::new(IdType::AgencyId, "psap1.county.example");
        config.subject_alt_name.select(["PSAP", "911 Authority"]).unwrap();

        store.save(&config).unwrap();
        assert_eq!(store.load(), config);

        // overwrite unconditionally
        store.save(&CertificateRequestConfig::default()).unwrap();
        assert_eq!(store.load(), CertificateRequestConfig::default());
    }

    #[test]
    fn test_stored_roles_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"subjectAltName":{"idType":"ElementId","id":"esrp1","roles":["ESRP","","ECRF","ESRP","esrp"]}}"#,
        )
        .unwrap();

        let config = JsonFileStore::new(&path).load();
        assert_eq!(config.subject_alt_name.roles(), ["ESRP", "ECRF", "esrp"]);
        assert_eq!(config.subject_alt_name.id, "esrp1");
    }

    #[test]
    fn test_default_location_file_name() {
        if let Ok(path) = JsonFileStore::default_location() {
            assert!(path.ends_with("CertBuilder/CertBuilderSettings.json"));
        }
    }
}
