use std::path::{Path, PathBuf};

use certbuilder::config::{CertificateRequestConfig, DistinguishedName, IdType, KeyUsageParams, SanParams};
use certbuilder::error::SecretError;
use certbuilder::orchestrator::{PasswordEntry, SecretPrompt};
use certbuilder::provider::{CertificateProvider, IssuanceRequest, RustCryptoProvider};
use secrecy::SecretString;

pub const CA_PASSWORD: &str = "ca password";
pub const NEW_PASSWORD: &str = "new password";

/// Writes a self-signed ECDSA CA container to `dir` and returns its path.
pub fn write_ca_container(dir: &Path) -> PathBuf {
    let subject = DistinguishedName::builder()
        .common_name("Test PCA")
        .organization("Example 911 Authority".to_string())
        .country("US".to_string())
        .build();
    let key_usage = KeyUsageParams {
        digital_signature: true,
        key_cert_sign: true,
        crl_sign: true,
        ..Default::default()
    };
    let password = SecretString::from(CA_PASSWORD);

    let issued = RustCryptoProvider::default()
        .create_ecdsa_self_signed(
            &IssuanceRequest {
                subject: &subject,
                key_usage: &key_usage,
                san: None,
                password: &password,
                is_ca: true,
            },
            5,
        )
        .unwrap();

    let path = dir.join("ca.pfx");
    std::fs::write(&path, issued.pkcs12).unwrap();
    path
}

/// A complete CA-signed ECDSA request for an ESRP writing `esrp1.*` to `dir`.
pub fn esrp_config(dir: &Path, ca_file: PathBuf) -> CertificateRequestConfig {
    let mut config = CertificateRequestConfig {
        self_signed: false,
        ca_certificate: false,
        signing_algorithm: certbuilder::config::SigningAlgorithm::Ecdsa,
        ca_cert_file: Some(ca_file),
        destination_directory: dir.to_path_buf(),
        file_name_no_extension: "esrp1".to_string(),
        ..Default::default()
    };
    config.distinguished_name.common_name = "esrp1.state.example".to_string();
    config.distinguished_name.organization = Some("State ESInet".to_string());
    config.key_usage.digital_signature = true;
    config.key_usage.server_authentication = true;
    config.key_usage.client_authentication = true;
    config.subject_alt_name = SanParams::new(IdType::ElementId, "esrp1.state.example");
    config.subject_alt_name.select(["ESRP", "ECRF"]).unwrap();
    config
}

/// Answers every prompt with the fixed test passwords.
pub struct FixedPasswords;

impl SecretPrompt for FixedPasswords {
    fn ca_password(&mut self) -> Option<SecretString> {
        Some(SecretString::from(CA_PASSWORD))
    }

    fn new_certificate_password(&mut self) -> Option<PasswordEntry> {
        Some(PasswordEntry::new(NEW_PASSWORD, NEW_PASSWORD))
    }

    fn reject(&mut self, error: SecretError) {
        panic!("password rejected: {error}");
    }
}
