//! The certificate request configuration: every user-supplied parameter
//! for one certificate, as edited in a session and stored in the settings
//! document.

mod observer;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

pub use crate::cert::params::DistinguishedName;
pub use observer::{ConfigField, ConfigObserver};

/// Key algorithm of the new certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    #[default]
    #[serde(rename = "RSA")]
    Rsa,
    #[serde(rename = "ECDSA")]
    Ecdsa,
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningAlgorithm::Rsa => f.write_str("RSA"),
            SigningAlgorithm::Ecdsa => f.write_str("ECDSA"),
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa" => Ok(SigningAlgorithm::Rsa),
            "ecdsa" => Ok(SigningAlgorithm::Ecdsa),
            _ => Err(format!("unknown signing algorithm '{s}' (expected rsa or ecdsa)")),
        }
    }
}

/// Category of entity a certificate identifies. Selects the role catalog.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum IdType {
    #[default]
    ElementId,
    ServiceId,
    AgencyId,
    AgentId,
    #[serde(rename = "CAId")]
    CaId,
}

impl IdType {
    /// Every identifier type, in presentation order.
    pub const ALL: [IdType; 5] = [
        IdType::ElementId,
        IdType::ServiceId,
        IdType::AgencyId,
        IdType::AgentId,
        IdType::CaId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IdType::ElementId => "ElementId",
            IdType::ServiceId => "ServiceId",
            IdType::AgencyId => "AgencyId",
            IdType::AgentId => "AgentId",
            IdType::CaId => "CAId",
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IdType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = IdType::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown id type '{s}' (expected one of {})", known.join(", "))
            })
    }
}

/// Key usage selections. The first nine flags are KeyUsage bits, the last
/// three ExtendedKeyUsage purposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyUsageParams {
    pub digital_signature: bool,
    pub non_repudiation: bool,
    pub key_encipherment: bool,
    pub data_encipherment: bool,
    pub key_agreement: bool,
    pub key_cert_sign: bool,
    pub crl_sign: bool,
    pub encipher_only: bool,
    pub decipher_only: bool,
    pub server_authentication: bool,
    pub client_authentication: bool,
    pub code_signing: bool,
}

impl KeyUsageParams {
    /// Flag names as accepted by [`KeyUsageParams::flag_mut`].
    pub const FLAGS: [&'static str; 12] = [
        "digitalSignature",
        "nonRepudiation",
        "keyEncipherment",
        "dataEncipherment",
        "keyAgreement",
        "keyCertSign",
        "crlSign",
        "encipherOnly",
        "decipherOnly",
        "serverAuthentication",
        "clientAuthentication",
        "codeSigning",
    ];

    fn all(&self) -> [bool; 12] {
        [
            self.digital_signature,
            self.non_repudiation,
            self.key_encipherment,
            self.data_encipherment,
            self.key_agreement,
            self.key_cert_sign,
            self.crl_sign,
            self.encipher_only,
            self.decipher_only,
            self.server_authentication,
            self.client_authentication,
            self.code_signing,
        ]
    }

    pub fn any(&self) -> bool {
        self.all().into_iter().any(|flag| flag)
    }

    /// Looks a flag up by its camelCase name, ignoring ASCII case.
    pub fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        let index = Self::FLAGS
            .iter()
            .position(|flag| flag.eq_ignore_ascii_case(name))?;
        Some(match index {
            0 => &mut self.digital_signature,
            1 => &mut self.non_repudiation,
            2 => &mut self.key_encipherment,
            3 => &mut self.data_encipherment,
            4 => &mut self.key_agreement,
            5 => &mut self.key_cert_sign,
            6 => &mut self.crl_sign,
            7 => &mut self.encipher_only,
            8 => &mut self.decipher_only,
            9 => &mut self.server_authentication,
            10 => &mut self.client_authentication,
            _ => &mut self.code_signing,
        })
    }
}

/// Parameters of the NG9-1-1 subject alternative name extension.
///
/// `roles` keeps selection order and never holds the same role twice; it
/// is changed through the selected-roles operations in [`crate::roles`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SanParams {
    pub id_type: IdType,
    pub id: String,
    #[serde(deserialize_with = "unique_roles")]
    pub(crate) roles: Vec<String>,
}

/// Drops empty names and repeats from a stored role list, keeping the
/// first occurrence of each role in order.
fn unique_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Vec::<String>::deserialize(deserializer)?;
    let mut roles: Vec<String> = Vec::with_capacity(stored.len());
    for role in stored {
        if !role.is_empty() && !roles.contains(&role) {
            roles.push(role);
        }
    }
    Ok(roles)
}

impl SanParams {
    pub fn new(id_type: IdType, id: impl Into<String>) -> Self {
        Self {
            id_type,
            id: id.into(),
            roles: Vec::new(),
        }
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }
}

/// Top-level aggregate of everything needed to issue one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificateRequestConfig {
    pub self_signed: bool,
    /// The new certificate may sign other certificates.
    pub ca_certificate: bool,
    pub signing_algorithm: SigningAlgorithm,
    /// PKCS#12 container of the signing CA. Required unless self-signed.
    pub ca_cert_file: Option<PathBuf>,
    /// Lifetime of a self-signed certificate.
    pub expires_years: i32,
    pub destination_directory: PathBuf,
    pub file_name_no_extension: String,
    pub add_subject_alt_name: bool,
    pub distinguished_name: DistinguishedName,
    pub key_usage: KeyUsageParams,
    pub subject_alt_name: SanParams,
}

impl Default for CertificateRequestConfig {
    fn default() -> Self {
        Self {
            self_signed: true,
            ca_certificate: true,
            signing_algorithm: SigningAlgorithm::Rsa,
            ca_cert_file: None,
            expires_years: 10,
            destination_directory: PathBuf::new(),
            file_name_no_extension: String::new(),
            add_subject_alt_name: true,
            distinguished_name: DistinguishedName::default(),
            key_usage: KeyUsageParams::default(),
            subject_alt_name: SanParams::default(),
        }
    }
}
