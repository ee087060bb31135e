//! Checks run on a [`CertificateRequestConfig`] before anything is issued.
//!
//! The four groups are checked in a fixed order and the first failing group
//! stops the pipeline. Nothing here touches the configuration.

use std::fmt;

use log::debug;
use thiserror::Error;

use crate::config::CertificateRequestConfig;

/// Input group an issue belongs to, so a front end can point at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputGroup {
    General,
    DistinguishedName,
    KeyUsage,
    SubjectAltName,
}

impl fmt::Display for InputGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputGroup::General => "General",
            InputGroup::DistinguishedName => "Subject Distinguished Name",
            InputGroup::KeyUsage => "Key Usage",
            InputGroup::SubjectAltName => "Subject Alternative Name",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("Self-Signed Certificate is not checked and a CA Certificate file has not been specified.")]
    MissingCaCertFile,

    #[error("The specified CA certificate file does not exist")]
    CaCertFileNotFound,

    #[error("The New Certificate Destination Directory must be specified.")]
    MissingDestinationDirectory,

    #[error("The New Certificate Destination Directory does not exist.")]
    DestinationDirectoryNotFound,

    #[error("The Expires value must be greater than or equal to 1")]
    ExpiresYearsOutOfRange,

    #[error("Common Name must be specified.")]
    MissingCommonName,

    #[error("No Key Usage selections are checked. Please select some key usages and try again.")]
    NoKeyUsage,

    #[error(
        "Code Signing is selected but Digital Signature is not selected. Please select Digital Signature."
    )]
    CodeSigningWithoutDigitalSignature,

    #[error("The ID parameter must be specified.")]
    MissingSanId,

    #[error("No roles are selected. Please select one or more roles and try again.")]
    NoRolesSelected,
}

impl ValidationIssue {
    pub fn group(self) -> InputGroup {
        match self {
            ValidationIssue::MissingCaCertFile
            | ValidationIssue::CaCertFileNotFound
            | ValidationIssue::MissingDestinationDirectory
            | ValidationIssue::DestinationDirectoryNotFound
            | ValidationIssue::ExpiresYearsOutOfRange => InputGroup::General,
            ValidationIssue::MissingCommonName => InputGroup::DistinguishedName,
            ValidationIssue::NoKeyUsage | ValidationIssue::CodeSigningWithoutDigitalSignature => {
                InputGroup::KeyUsage
            }
            ValidationIssue::MissingSanId | ValidationIssue::NoRolesSelected => {
                InputGroup::SubjectAltName
            }
        }
    }
}

/// The first input group that failed, with every issue found in it.
///
/// `issues` is never empty. Only the key usage group can report more than
/// one issue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", render(.issues))]
pub struct ValidationError {
    pub group: InputGroup,
    pub issues: Vec<ValidationIssue>,
}

fn render(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl ValidationError {
    fn new(group: InputGroup, issues: Vec<ValidationIssue>) -> Self {
        Self { group, issues }
    }
}

/// Runs the general, distinguished name, key usage and subject alternative
/// name checks in that order, stopping at the first group that fails.
pub fn validate(config: &CertificateRequestConfig) -> Result<(), ValidationError> {
    let checks: [(InputGroup, fn(&CertificateRequestConfig) -> Vec<ValidationIssue>); 4] = [
        (InputGroup::General, check_general),
        (InputGroup::DistinguishedName, check_distinguished_name),
        (InputGroup::KeyUsage, check_key_usage),
        (InputGroup::SubjectAltName, check_subject_alt_name),
    ];

    for (group, check) in checks {
        let issues = check(config);
        if !issues.is_empty() {
            debug!("validation failed in the {group} group: {issues:?}");
            return Err(ValidationError::new(group, issues));
        }
    }
    Ok(())
}

fn check_general(config: &CertificateRequestConfig) -> Vec<ValidationIssue> {
    let first = || {
        if !config.self_signed {
            match config.ca_cert_file.as_deref() {
                None => return Some(ValidationIssue::MissingCaCertFile),
                Some(path) if path.as_os_str().is_empty() => {
                    return Some(ValidationIssue::MissingCaCertFile);
                }
                Some(path) if !path.is_file() => return Some(ValidationIssue::CaCertFileNotFound),
                Some(_) => {}
            }
        }

        if config.destination_directory.as_os_str().is_empty() {
            return Some(ValidationIssue::MissingDestinationDirectory);
        }
        if !config.destination_directory.is_dir() {
            return Some(ValidationIssue::DestinationDirectoryNotFound);
        }

        if config.expires_years < 1 {
            return Some(ValidationIssue::ExpiresYearsOutOfRange);
        }
        None
    };
    first().into_iter().collect()
}

fn check_distinguished_name(config: &CertificateRequestConfig) -> Vec<ValidationIssue> {
    if config.distinguished_name.common_name.is_empty() {
        vec![ValidationIssue::MissingCommonName]
    } else {
        Vec::new()
    }
}

fn check_key_usage(config: &CertificateRequestConfig) -> Vec<ValidationIssue> {
    let usage = &config.key_usage;
    let mut issues = Vec::new();
    if !usage.any() {
        issues.push(ValidationIssue::NoKeyUsage);
    }
    if usage.code_signing && !usage.digital_signature {
        issues.push(ValidationIssue::CodeSigningWithoutDigitalSignature);
    }
    issues
}

fn check_subject_alt_name(config: &CertificateRequestConfig) -> Vec<ValidationIssue> {
    if !config.add_subject_alt_name {
        return Vec::new();
    }

    let san = &config.subject_alt_name;
    if san.id.is_empty() {
        vec![ValidationIssue::MissingSanId]
    } else if san.roles().is_empty() {
        vec![ValidationIssue::NoRolesSelected]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::{IdType, SanParams};

    fn valid(dir: &std::path::Path) -> CertificateRequestConfig {
        let mut config = CertificateRequestConfig {
            destination_directory: dir.to_path_buf(),
            file_name_no_extension: "out".to_string(),
            ..Default::default()
        };
        config.distinguished_name.common_name = "test.example".to_string();
        config.key_usage.digital_signature = true;
        config.subject_alt_name = SanParams::new(IdType::ElementId, "esrp.example");
        config.subject_alt_name.select(["ESRP"]).unwrap();
        config
    }

    fn failure(config: &CertificateRequestConfig) -> (InputGroup, Vec<ValidationIssue>) {
        let err = validate(config).unwrap_err();
        (err.group, err.issues)
    }

    #[test]
    fn test_valid_configuration_passes() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(validate(&valid(dir.path())), Ok(()));
    }

    #[test]
    fn test_general_checks_report_first_failure_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid(dir.path());
        config.self_signed = false;
        config.ca_cert_file = None;
        config.destination_directory = PathBuf::new();
        config.expires_years = 0;
        assert_eq!(
            failure(&config),
            (InputGroup::General, vec![ValidationIssue::MissingCaCertFile])
        );

        config.ca_cert_file = Some(dir.path().join("missing.pfx"));
        assert_eq!(failure(&config).1, vec![ValidationIssue::CaCertFileNotFound]);

        // a directory is not a CA file
        config.ca_cert_file = Some(dir.path().to_path_buf());
        assert_eq!(failure(&config).1, vec![ValidationIssue::CaCertFileNotFound]);

        let ca_file = dir.path().join("ca.pfx");
        std::fs::write(&ca_file, b"container").unwrap();
        config.ca_cert_file = Some(ca_file);
        assert_eq!(failure(&config).1, vec![ValidationIssue::MissingDestinationDirectory]);

        config.destination_directory = dir.path().join("nowhere");
        assert_eq!(failure(&config).1, vec![ValidationIssue::DestinationDirectoryNotFound]);

        config.destination_directory = dir.path().to_path_buf();
        assert_eq!(failure(&config).1, vec![ValidationIssue::ExpiresYearsOutOfRange]);

        config.expires_years = 1;
        assert_eq!(validate(&config), Ok(()));
    }

    #[test]
    fn test_ca_file_ignored_when_self_signed() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid(dir.path());
        config.ca_cert_file = Some(dir.path().join("missing.pfx"));
        assert_eq!(validate(&config), Ok(()));
    }

    #[test]
    fn test_missing_common_name_fails_at_distinguished_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid(dir.path());
        config.distinguished_name.common_name.clear();
        config.key_usage = Default::default();
        config.subject_alt_name.clear();
        assert_eq!(
            failure(&config),
            (InputGroup::DistinguishedName, vec![ValidationIssue::MissingCommonName])
        );
    }

    #[test]
    fn test_key_usage_reports_both_issues() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid(dir.path());
        config.key_usage = Default::default();
        assert_eq!(
            failure(&config),
            (InputGroup::KeyUsage, vec![ValidationIssue::NoKeyUsage])
        );

        config.key_usage.code_signing = true;
        config.key_usage.server_authentication = true;
        assert_eq!(
            failure(&config),
            (
                InputGroup::KeyUsage,
                vec![ValidationIssue::CodeSigningWithoutDigitalSignature]
            )
        );

        config.key_usage.digital_signature = true;
        assert_eq!(validate(&config), Ok(()));
    }

    #[test]
    fn test_san_requires_id_then_roles() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid(dir.path());
        config.subject_alt_name.clear();
        assert_eq!(
            failure(&config),
            (InputGroup::SubjectAltName, vec![ValidationIssue::NoRolesSelected])
        );

        config.subject_alt_name.id.clear();
        assert_eq!(failure(&config).1, vec![ValidationIssue::MissingSanId]);

        config.add_subject_alt_name = false;
        assert_eq!(validate(&config), Ok(()));
    }

    #[test]
    fn test_error_message_lists_every_issue() {
        let err = ValidationError::new(
            InputGroup::KeyUsage,
            vec![
                ValidationIssue::NoKeyUsage,
                ValidationIssue::CodeSigningWithoutDigitalSignature,
            ],
        );
        let message = err.to_string();
        assert!(message.starts_with("No Key Usage selections are checked."));
        assert!(message.ends_with("Please select Digital Signature."));
        assert_eq!(ValidationIssue::MissingSanId.group(), InputGroup::SubjectAltName);
    }
}
