use const_oid::AssociatedOid;
use der::{
    Decode, Encode,
    asn1::{Ia5String, OctetString},
    oid::ObjectIdentifier,
};
use x509_cert::ext::pkix::name::GeneralName;

use crate::config::{IdType, KeyUsageParams, SanParams};
use crate::error::CryptoError;

/// Trait for converting to and from X.509 extensions.
///
/// # Example
/// ```
/// use certbuilder::cert::extensions::{BasicConstraints, ToAndFromX509Extension};
/// let bc = BasicConstraints { is_ca: true, max_path_length: None };
/// let encoded = bc.to_x509_extension_value().unwrap();
/// let decoded = BasicConstraints::from_x509_extension_value(&encoded).unwrap();
/// assert!(decoded.is_ca);
/// ```
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CryptoError>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CryptoError>
    where
        Self: Sized;
}

const NG911_ID_PREFIX: &str = "urn:nena:uid:";
const NG911_ROLE_PREFIX: &str = "urn:nena:role:";

/// The NG9-1-1 Subject Alternative Name extension.
///
/// Carried as a standard SubjectAltName whose entries are URIs: first
/// `urn:nena:uid:<IdType>:<id>`, then one `urn:nena:role:<role>` per role
/// in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ng911SubjectAltName {
    pub id_type: IdType,
    pub id: String,
    pub roles: Vec<String>,
}

impl From<&SanParams> for Ng911SubjectAltName {
    fn from(params: &SanParams) -> Self {
        Self {
            id_type: params.id_type,
            id: params.id.clone(),
            roles: params.roles().to_vec(),
        }
    }
}

fn uri(value: String) -> Result<GeneralName, CryptoError> {
    Ia5String::new(value.as_str())
        .map(GeneralName::UniformResourceIdentifier)
        .map_err(|_| {
            CryptoError::InvalidInput(format!(
                "'{value}' cannot be encoded in a subject alternative name (ASCII only)"
            ))
        })
}

impl ToAndFromX509Extension for Ng911SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CryptoError> {
        let mut names = vec![uri(format!("{NG911_ID_PREFIX}{}:{}", self.id_type, self.id))?];
        for role in &self.roles {
            names.push(uri(format!("{NG911_ROLE_PREFIX}{role}"))?);
        }

        Ok(x509_cert::ext::pkix::SubjectAltName(names).to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CryptoError> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;

        let mut identity = None;
        let mut roles = Vec::new();
        for name in san.0.iter() {
            let GeneralName::UniformResourceIdentifier(value) = name else {
                return Err(CryptoError::InvalidInput(
                    "Unsupported general name type".to_string(),
                ));
            };
            let value = value.to_string();

            if let Some(role) = value.strip_prefix(NG911_ROLE_PREFIX) {
                roles.push(role.to_string());
            } else if let Some((id_type, id)) = value
                .strip_prefix(NG911_ID_PREFIX)
                .and_then(|rest| rest.split_once(':'))
            {
                let id_type = id_type.parse().map_err(CryptoError::InvalidInput)?;
                identity = Some((id_type, id.to_string()));
            } else {
                return Err(CryptoError::InvalidInput(format!(
                    "'{value}' is not an NG9-1-1 identifier or role"
                )));
            }
        }

        let (id_type, id) = identity.ok_or_else(|| {
            CryptoError::InvalidInput("subject alternative name has no NG9-1-1 identifier".into())
        })?;
        Ok(Self { id_type, id, roles })
    }
}

/// Represents the Basic Constraints extension.
///
/// # Fields
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - The maximum number of intermediate CAs allowed.
#[derive(Default)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u8>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CryptoError> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length,
        };

        Ok(bc.to_der()?)
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self, CryptoError> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint,
        })
    }
}

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

/// Represents the Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl From<&KeyUsageParams> for KeyUsage {
    fn from(params: &KeyUsageParams) -> Self {
        let bits = [
            (params.digital_signature, KeyUsages::DigitalSignature),
            (params.non_repudiation, KeyUsages::NonRepudiation),
            (params.key_encipherment, KeyUsages::KeyEncipherment),
            (params.data_encipherment, KeyUsages::DataEncipherment),
            (params.key_agreement, KeyUsages::KeyAgreement),
            (params.key_cert_sign, KeyUsages::KeyCertSign),
            (params.crl_sign, KeyUsages::CRLSign),
            (params.encipher_only, KeyUsages::EncipherOnly),
            (params.decipher_only, KeyUsages::DecipherOnly),
        ];

        let mut flags: FlagSet<KeyUsages> = FlagSet::empty();
        for (set, bit) in bits {
            if set {
                flags |= bit;
            }
        }
        KeyUsage(flags)
    }
}

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CryptoError> {
        let ku = X509KeyUsage(self.0);
        Ok(ku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CryptoError> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// Represents the Extended Key Usage extension.
#[derive(Debug, Clone, Default)]
pub struct ExtendedKeyUsage {
    pub usage: Vec<ExtendedKeyUsageOption>,
}

impl From<&KeyUsageParams> for ExtendedKeyUsage {
    fn from(params: &KeyUsageParams) -> Self {
        let usage = [
            (params.server_authentication, ExtendedKeyUsageOption::ServerAuth),
            (params.client_authentication, ExtendedKeyUsageOption::ClientAuth),
            (params.code_signing, ExtendedKeyUsageOption::CodeSigning),
        ]
        .into_iter()
        .filter_map(|(set, option)| set.then_some(option))
        .collect();
        Self { usage }
    }
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CryptoError> {
        let oids: Vec<ObjectIdentifier> = self.usage.iter().map(|v| (*v).into()).collect();
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(oids);
        Ok(eku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CryptoError> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)?;
        let usage = eku
            .0
            .iter()
            .map(|v| match *v {
                const_oid::db::rfc5912::ID_KP_SERVER_AUTH => Ok(ExtendedKeyUsageOption::ServerAuth),
                const_oid::db::rfc5912::ID_KP_CLIENT_AUTH => Ok(ExtendedKeyUsageOption::ClientAuth),
                const_oid::db::rfc5912::ID_KP_CODE_SIGNING => {
                    Ok(ExtendedKeyUsageOption::CodeSigning)
                }
                _ => Err(CryptoError::InvalidInput(
                    "Unsupported extended key usage option".to_string(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { usage })
    }
}

/// Represents an option for the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    ClientAuth,
    CodeSigning,
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsageOption::CodeSigning => const_oid::db::rfc5912::ID_KP_CODE_SIGNING,
        }
    }
}

/// Represents the Subject Key Identifier extension.
pub struct SubjectKeyIdentifier(pub Vec<u8>);

impl ToAndFromX509Extension for SubjectKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CryptoError> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier(OctetString::new(self.0.as_slice())?);
        Ok(ski.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CryptoError> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(extension)?;
        Ok(Self(ski.0.as_bytes().to_vec()))
    }
}

/// Represents the Authority Key Identifier (AKI) extension.
///
/// Only the key identifier form is produced; it matches the subject key
/// identifier of the issuing certificate.
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Vec<u8>,
}

impl ToAndFromX509Extension for AuthorityKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::AuthorityKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CryptoError> {
        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::new(self.key_identifier.as_slice())?),
            authority_cert_issuer: None,
            authority_cert_serial_number: None,
        };

        Ok(aki.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CryptoError> {
        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier::from_der(extension)?;
        Ok(Self {
            key_identifier: aki
                .key_identifier
                .map(|id| id.as_bytes().to_vec())
                .unwrap_or_default(),
        })
    }
}
