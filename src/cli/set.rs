//! `certbuilder set <key> <value>`.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};

use crate::config::{CertificateRequestConfig, ConfigField, IdType, KeyUsageParams, SigningAlgorithm};
use crate::session::CertBuilder;
use crate::settings::SettingsStore;

/// Applies one `set` command to the session's configuration.
pub fn apply<S: SettingsStore>(builder: &mut CertBuilder<S>, key: &str, value: &str) -> Result<()> {
    if let Some(flag) = key.strip_prefix("usage.") {
        if !KeyUsageParams::FLAGS
            .iter()
            .any(|name| name.eq_ignore_ascii_case(flag))
        {
            bail!(
                "Unknown key usage flag: {flag}\n\nAvailable flags:\n  {}",
                KeyUsageParams::FLAGS.join("\n  ")
            );
        }
        let enabled = parse_bool(key, value)?;
        builder.update(ConfigField::KeyUsage, |config| {
            if let Some(slot) = config.key_usage.flag_mut(flag) {
                *slot = enabled;
            }
        });
        return Ok(());
    }

    match key {
        "self-signed" => {
            let value = parse_bool(key, value)?;
            builder.update(ConfigField::SelfSigned, |config| config.self_signed = value);
        }
        "ca-certificate" => {
            let value = parse_bool(key, value)?;
            builder.update(ConfigField::CaCertificate, |config| {
                config.ca_certificate = value
            });
        }
        "algorithm" => {
            let value: SigningAlgorithm = value.parse().map_err(|err: String| anyhow!(err))?;
            builder.update(ConfigField::SigningAlgorithm, |config| {
                config.signing_algorithm = value
            });
        }
        "ca-cert-file" => {
            let value = (!value.is_empty()).then(|| PathBuf::from(value));
            builder.update(ConfigField::CaCertFile, |config| config.ca_cert_file = value);
        }
        "expires-years" => {
            let value: i32 = value
                .parse()
                .with_context(|| format!("expires-years must be a whole number, got '{value}'"))?;
            builder.update(ConfigField::ExpiresYears, |config| {
                config.expires_years = value
            });
        }
        "destination" => {
            builder.update(ConfigField::DestinationDirectory, |config| {
                config.destination_directory = PathBuf::from(value)
            });
        }
        "file-name" => {
            builder.update(ConfigField::FileNameNoExtension, |config| {
                config.file_name_no_extension = value.to_string()
            });
        }
        "add-san" => {
            let value = parse_bool(key, value)?;
            builder.update(ConfigField::AddSubjectAltName, |config| {
                config.add_subject_alt_name = value
            });
        }
        "cn" => builder.update(ConfigField::DistinguishedName, |config| {
            config.distinguished_name.common_name = value.to_string()
        }),
        "o" | "ou" | "l" | "st" | "c" => {
            let value = (!value.is_empty()).then(|| value.to_string());
            builder.update(ConfigField::DistinguishedName, |config| {
                let name = &mut config.distinguished_name;
                let slot = match key {
                    "o" => &mut name.organization,
                    "ou" => &mut name.organization_unit,
                    "l" => &mut name.locality,
                    "st" => &mut name.state,
                    _ => &mut name.country,
                };
                *slot = value;
            });
        }
        "id-type" => {
            let value: IdType = value.parse().map_err(|err: String| anyhow!(err))?;
            builder.update(ConfigField::SubjectAltName, |config| {
                config.subject_alt_name.id_type = value
            });
        }
        "id" => builder.update(ConfigField::SubjectAltName, |config| {
            config.subject_alt_name.id = value.to_string()
        }),
        _ => bail!("Unknown setting: {key}\n\nRun `certbuilder set --help` for the available keys."),
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("{key} expects true or false, got '{value}'"),
    }
}

/// The changed field's new value as it appears in the settings document.
pub fn describe(config: &CertificateRequestConfig, field: ConfigField) -> String {
    let name = field.to_string();
    match serde_json::to_value(config) {
        Ok(document) => format!("{name} = {}", document[name.as_str()]),
        Err(_) => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::JsonFileStore;

    fn builder(dir: &tempfile::TempDir) -> CertBuilder<JsonFileStore> {
        CertBuilder::new(JsonFileStore::new(dir.path().join("settings.json")))
    }

    #[test]
    fn test_set_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = builder(&dir);

        apply(&mut builder, "self-signed", "false").unwrap();
        apply(&mut builder, "algorithm", "ECDSA").unwrap();
        apply(&mut builder, "ca-cert-file", "/tmp/ca.pfx").unwrap();
        apply(&mut builder, "expires-years", "3").unwrap();
        apply(&mut builder, "cn", "ecrf.example").unwrap();
        apply(&mut builder, "o", "State 911").unwrap();
        apply(&mut builder, "id-type", "serviceid").unwrap();
        apply(&mut builder, "usage.serverAuthentication", "yes").unwrap();

        let config = builder.config();
        assert!(!config.self_signed);
        assert_eq!(config.signing_algorithm, SigningAlgorithm::Ecdsa);
        assert_eq!(config.ca_cert_file, Some(PathBuf::from("/tmp/ca.pfx")));
        assert_eq!(config.expires_years, 3);
        assert_eq!(config.distinguished_name.common_name, "ecrf.example");
        assert_eq!(config.distinguished_name.organization.as_deref(), Some("State 911"));
        assert_eq!(config.subject_alt_name.id_type, IdType::ServiceId);
        assert!(config.key_usage.server_authentication);

        apply(&mut builder, "o", "").unwrap();
        apply(&mut builder, "ca-cert-file", "").unwrap();
        assert_eq!(builder.config().distinguished_name.organization, None);
        assert_eq!(builder.config().ca_cert_file, None);
    }

    #[test]
    fn test_bad_input_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = builder(&dir);
        let before = builder.config().clone();

        assert!(apply(&mut builder, "colour", "blue").is_err());
        assert!(apply(&mut builder, "usage.everything", "true").is_err());
        assert!(apply(&mut builder, "expires-years", "ten").is_err());
        assert!(apply(&mut builder, "algorithm", "dsa").is_err());
        assert!(apply(&mut builder, "add-san", "maybe").is_err());

        assert_eq!(builder.config(), &before);
    }

    #[test]
    fn test_describe_uses_document_keys() {
        let config = CertificateRequestConfig::default();
        assert_eq!(describe(&config, ConfigField::ExpiresYears), "expiresYears = 10");
        assert_eq!(
            describe(&config, ConfigField::SigningAlgorithm),
            "signingAlgorithm = \"RSA\""
        );
    }
}
