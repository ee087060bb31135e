use der::Encode;
use rand_core::RngCore;
use sha1::Sha1;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::Name;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::Certificate;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectKeyIdentifier,
};
use crate::cert::params::{CertificationRequestInfo, ExtensionParam, Validity};
use crate::error::CryptoError;
use crate::key::KeyPair;
use crate::tbs_certificate::TbsCertificate;

/// SHA-1 over the subject public key bits (RFC 5280 4.2.1.2, method 1).
pub fn key_identifier(spki: &SubjectPublicKeyInfoOwned) -> Result<Vec<u8>, CryptoError> {
    let digest = <Sha1 as sha1::Digest>::digest(spki.subject_public_key.raw_bytes());
    Ok(digest.to_vec())
}

/// Random positive 128-bit serial number with a non-zero leading byte.
fn random_serial() -> Vec<u8> {
    let mut serial = vec![0u8; 16];
    rand_core::OsRng.fill_bytes(&mut serial);
    serial[0] = serial[0] % 0x7f + 1;
    serial
}

/// Represents an entity capable of issuing certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> Name;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Identifier placed in the AuthorityKeyIdentifier of issued certificates.
    fn key_identifier(&self) -> Result<Vec<u8>, CryptoError> {
        key_identifier(&self.signing_key().as_spki()?)
    }

    /// Issues a certificate based on the provided certification request information.
    ///
    /// BasicConstraints is always present and critical. KeyUsage (critical)
    /// and ExtendedKeyUsage are added only when the request asks for some.
    fn issue(
        &self,
        cert_request: &CertificationRequestInfo,
        validity: Validity,
    ) -> Result<Certificate, CryptoError> {
        let signature_algo = self.signing_key().signature_algorithm();
        let subject_public_key_info = cert_request.subject_public_key.to_spki()?;

        let mut extensions: Vec<ExtensionParam> = vec![
            ExtensionParam::from_extension(
                BasicConstraints {
                    is_ca: cert_request.is_ca,
                    max_path_length: None,
                },
                true,
            )?,
            ExtensionParam::from_extension(
                SubjectKeyIdentifier(key_identifier(&subject_public_key_info)?),
                false,
            )?,
            ExtensionParam::from_extension(
                AuthorityKeyIdentifier {
                    key_identifier: self.key_identifier()?,
                },
                false,
            )?,
        ];

        if !cert_request.key_usages.is_empty() {
            extensions.push(ExtensionParam::from_extension(
                KeyUsage(cert_request.key_usages),
                true,
            )?);
        }

        if !cert_request.usages.is_empty() {
            let extended_key_usage = ExtendedKeyUsage {
                usage: cert_request.usages.clone(),
            };
            extensions.push(ExtensionParam::from_extension(extended_key_usage, false)?);
        }

        extensions.extend(cert_request.extensions.iter().cloned());

        let tbs_cert = TbsCertificate {
            serial_number: random_serial(),
            signature_algorithm: signature_algo,
            issuer: self.issuer_name(),
            not_before: validity.not_before,
            not_after: validity.not_after,
            subject: cert_request.subject.as_x509_name()?,
            subject_public_key_info,
            extensions,
        };

        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let signature = self.signing_key().sign_data(&tbs_cert_inner.to_der()?)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: signature_algo.into(),
            signature: der::asn1::BitString::from_bytes(&signature)?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::CertificateWithPrivateKey;
    use crate::cert::extensions::{KeyUsages, ToAndFromX509Extension};
    use crate::cert::params::DistinguishedName;
    use crate::key::PublicKey;

    fn request(common_name: &str, key: &KeyPair, is_ca: bool) -> CertificationRequestInfo {
        CertificationRequestInfo::builder()
            .subject(DistinguishedName::builder().common_name(common_name).build())
            .subject_public_key(PublicKey::from_key_pair(key))
            .key_usages(KeyUsages::DigitalSignature | KeyUsages::KeyCertSign)
            .is_ca(is_ca)
            .build()
    }

    #[test]
    fn test_serial_is_positive_and_minimal() {
        for _ in 0..64 {
            let serial = random_serial();
            assert_eq!(serial.len(), 16);
            assert!((1..=0x7f).contains(&serial[0]));
        }
    }

    #[test]
    fn test_issued_certificate_links_to_issuer() {
        let ca_key = KeyPair::generate_ecdsa_p256();
        let ca = CertificateWithPrivateKey {
            cert: Certificate::new_self_signed(
                &request("Test CA", &ca_key, true),
                &ca_key,
                Validity::for_days(30),
            )
            .unwrap(),
            key: ca_key,
        };
        assert!(ca.cert.is_ca());

        let leaf_key = KeyPair::generate_ecdsa_p256();
        let leaf = ca
            .issue(&request("leaf.example", &leaf_key, false), Validity::for_days(1))
            .unwrap();

        assert!(!leaf.is_ca());
        assert_eq!(leaf.inner.tbs_certificate.issuer, *ca.cert.subject_name());
        assert_eq!(leaf.subject().common_name, "leaf.example");

        let aki = leaf.extension::<AuthorityKeyIdentifier>().unwrap().unwrap();
        let ca_ski = ca.cert.extension::<SubjectKeyIdentifier>().unwrap().unwrap();
        assert_eq!(aki.key_identifier, ca_ski.0);

        let ku = leaf.extension::<KeyUsage>().unwrap().unwrap();
        assert!(ku.0.contains(KeyUsages::DigitalSignature));
        assert!(
            KeyUsage::from_x509_extension_value(&ku.to_x509_extension_value().unwrap()).is_ok()
        );
    }
}
