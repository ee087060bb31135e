use std::fmt;

use super::CertificateRequestConfig;

/// Field of [`CertificateRequestConfig`] named in a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    SelfSigned,
    CaCertificate,
    SigningAlgorithm,
    CaCertFile,
    ExpiresYears,
    DestinationDirectory,
    FileNameNoExtension,
    AddSubjectAltName,
    DistinguishedName,
    KeyUsage,
    SubjectAltName,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigField::SelfSigned => "selfSigned",
            ConfigField::CaCertificate => "caCertificate",
            ConfigField::SigningAlgorithm => "signingAlgorithm",
            ConfigField::CaCertFile => "caCertFile",
            ConfigField::ExpiresYears => "expiresYears",
            ConfigField::DestinationDirectory => "destinationDirectory",
            ConfigField::FileNameNoExtension => "fileNameNoExtension",
            ConfigField::AddSubjectAltName => "addSubjectAltName",
            ConfigField::DistinguishedName => "distinguishedName",
            ConfigField::KeyUsage => "keyUsage",
            ConfigField::SubjectAltName => "subjectAltName",
        };
        f.write_str(name)
    }
}

/// Receives a notification after each mutation of the session's
/// configuration, with the configuration as it now stands.
pub trait ConfigObserver {
    fn field_changed(&self, config: &CertificateRequestConfig, field: ConfigField);
}

impl<F> ConfigObserver for F
where
    F: Fn(&CertificateRequestConfig, ConfigField),
{
    fn field_changed(&self, config: &CertificateRequestConfig, field: ConfigField) {
        self(config, field)
    }
}
