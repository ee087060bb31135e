use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::PrintableStringRef;
use der::flagset::FlagSet;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use x509_cert::name::{Name, RdnSequence};

use super::extensions::{ExtendedKeyUsageOption, KeyUsages, ToAndFromX509Extension};
use crate::error::CryptoError;
use crate::key::PublicKey;

const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
const COUNTRY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
const LOCALITY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
const STATE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
const ORGANIZATION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
const ORGANIZATION_UNIT: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");

/// Parameters for building an X.509 certificate.
///
/// # Fields
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `key_usages` - KeyUsage bits; the extension is omitted when empty.
/// * `usages` - A list of extended key usage options.
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `extensions` - Additional X.509 extensions.
#[derive(Clone, Debug, Builder)]
pub struct CertificationRequestInfo {
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    #[builder(default)]
    pub key_usages: FlagSet<KeyUsages>,
    #[builder(default)]
    pub usages: Vec<ExtendedKeyUsageOption>,
    #[builder(default)]
    pub is_ca: bool,
    #[builder(default)]
    pub extensions: Vec<ExtensionParam>,
}

/// Subject distinguished name of a new certificate.
///
/// Only `common_name` is required. Empty optional fields are left out of
/// the encoded name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DistinguishedName {
    #[builder(into, default)]
    pub common_name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509 `Name`.
    ///
    /// The RDNs are encoded country first and common name last.
    pub fn as_x509_name(&self) -> Result<Name, CryptoError> {
        use core::str::FromStr;

        let optional = [
            ("OU", &self.organization_unit),
            ("O", &self.organization),
            ("L", &self.locality),
            ("ST", &self.state),
            ("C", &self.country),
        ];

        let mut parts = vec![format!("CN={}", escape_rfc4514(&self.common_name))];
        parts.extend(optional.iter().filter_map(|(attr, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{attr}={}", escape_rfc4514(v)))
        }));

        RdnSequence::from_str(&parts.join(",")).map_err(|e| {
            CryptoError::InvalidInput(format!("invalid distinguished name: {e}"))
        })
    }

    /// Creates a `DistinguishedName` from an X.509 `Name`.
    ///
    /// Attributes other than the six supported ones are ignored, as are
    /// values that are neither UTF8String nor PrintableString.
    pub fn from_x509_name(x509dn: &Name) -> Self {
        let mut dn = DistinguishedName::default();

        for attr in x509dn.0.iter().flat_map(|rdn| rdn.0.iter()) {
            let Some(value) = attr
                .value
                .decode_as::<String>()
                .ok()
                .or_else(|| {
                    attr.value
                        .decode_as::<PrintableStringRef<'_>>()
                        .ok()
                        .map(|s| s.to_string())
                })
            else {
                continue;
            };

            match attr.oid {
                COMMON_NAME => dn.common_name = value,
                COUNTRY => dn.country = Some(value),
                STATE => dn.state = Some(value),
                LOCALITY => dn.locality = Some(value),
                ORGANIZATION => dn.organization = Some(value),
                ORGANIZATION_UNIT => dn.organization_unit = Some(value),
                _ => {}
            }
        }

        dn
    }
}

fn escape_rfc4514(value: &str) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut escaped = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        let special = matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';')
            || (i == 0 && matches!(c, ' ' | '#'))
            || (i == last && c == ' ');
        if special {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Certificate validity period.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }

    /// Creates a validity period starting now and ending on the same
    /// calendar day `years` later (29 February becomes 28 February).
    pub fn for_years(years: u32) -> Result<Self, CryptoError> {
        let now = OffsetDateTime::now_utc();
        let year = i32::try_from(years)
            .ok()
            .and_then(|y| now.year().checked_add(y))
            .ok_or_else(|| CryptoError::InvalidInput(format!("{years} years is out of range")))?;

        let not_after = now
            .replace_year(year)
            .or_else(|_| now.replace_day(28).and_then(|d| d.replace_year(year)))
            .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;

        Ok(Self {
            not_before: now,
            not_after,
        })
    }

    /// Creates a validity period starting now and ending at `not_after`.
    pub fn until(not_after: OffsetDateTime) -> Self {
        Self {
            not_before: OffsetDateTime::now_utc(),
            not_after,
        }
    }
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(
        extension: E,
        critical: bool,
    ) -> Result<Self, CryptoError> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E, CryptoError> {
        E::from_x509_extension_value(&self.value)
    }
}
