//! Certificate issuance: one provider operation per combination of key
//! algorithm and signer.

use std::fmt;

use log::{debug, info, warn};
use secrecy::SecretString;

use crate::cert::extensions::{ExtendedKeyUsage, KeyUsage, Ng911SubjectAltName};
use crate::cert::params::{CertificationRequestInfo, DistinguishedName, ExtensionParam, Validity};
use crate::cert::{Certificate, CertificateWithPrivateKey};
use crate::config::{KeyUsageParams, SanParams, SigningAlgorithm};
use crate::error::CryptoError;
use crate::issuer::Issuer;
use crate::key::{KeyPair, PublicKey};
use crate::pkcs12;

/// Everything a provider needs to build one certificate, apart from the
/// signer and the lifetime.
#[derive(Clone, Copy)]
pub struct IssuanceRequest<'a> {
    pub subject: &'a DistinguishedName,
    pub key_usage: &'a KeyUsageParams,
    /// `None` when the NG9-1-1 subject alternative name is not wanted.
    pub san: Option<&'a SanParams>,
    /// Protects the returned PKCS#12 container.
    pub password: &'a SecretString,
    pub is_ca: bool,
}

impl fmt::Debug for IssuanceRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuanceRequest")
            .field("subject", &self.subject.common_name)
            .field("key_usage", self.key_usage)
            .field("san", &self.san)
            .field("is_ca", &self.is_ca)
            .finish_non_exhaustive()
    }
}

/// A newly issued certificate in both output encodings.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub certificate: Certificate,
    /// PKCS#12 container with the private key and certificate, protected by
    /// the request password.
    pub pkcs12: Vec<u8>,
    /// Raw DER certificate.
    pub der: Vec<u8>,
}

/// Builds certificates. Each operation either returns a certificate or
/// the error explaining why none was produced.
///
/// CA-signed operations take their lifetime from the signing CA.
pub trait CertificateProvider {
    fn create_rsa_self_signed(
        &self,
        request: &IssuanceRequest<'_>,
        expires_years: u32,
    ) -> Result<IssuedCertificate, CryptoError>;

    fn create_rsa_signed(
        &self,
        ca: &CertificateWithPrivateKey,
        request: &IssuanceRequest<'_>,
    ) -> Result<IssuedCertificate, CryptoError>;

    fn create_ecdsa_self_signed(
        &self,
        request: &IssuanceRequest<'_>,
        expires_years: u32,
    ) -> Result<IssuedCertificate, CryptoError>;

    fn create_ecdsa_signed(
        &self,
        ca: &CertificateWithPrivateKey,
        request: &IssuanceRequest<'_>,
    ) -> Result<IssuedCertificate, CryptoError>;
}

/// The four ways a certificate can be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssuanceBranch {
    SelfSignedRsa,
    CaSignedRsa,
    SelfSignedEcdsa,
    CaSignedEcdsa,
}

impl IssuanceBranch {
    pub fn resolve(self_signed: bool, algorithm: SigningAlgorithm) -> Self {
        match (self_signed, algorithm) {
            (true, SigningAlgorithm::Rsa) => IssuanceBranch::SelfSignedRsa,
            (false, SigningAlgorithm::Rsa) => IssuanceBranch::CaSignedRsa,
            (true, SigningAlgorithm::Ecdsa) => IssuanceBranch::SelfSignedEcdsa,
            (false, SigningAlgorithm::Ecdsa) => IssuanceBranch::CaSignedEcdsa,
        }
    }

    pub fn is_self_signed(self) -> bool {
        matches!(
            self,
            IssuanceBranch::SelfSignedRsa | IssuanceBranch::SelfSignedEcdsa
        )
    }
}

impl fmt::Display for IssuanceBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssuanceBranch::SelfSignedRsa => "self-signed RSA",
            IssuanceBranch::CaSignedRsa => "CA-signed RSA",
            IssuanceBranch::SelfSignedEcdsa => "self-signed ECDSA",
            IssuanceBranch::CaSignedEcdsa => "CA-signed ECDSA",
        };
        f.write_str(name)
    }
}

pub const DEFAULT_RSA_BITS: usize = 2048;

/// [`CertificateProvider`] built on the RustCrypto key and X.509 crates.
///
/// New keys are RSA (`rsa_bits`) or ECDSA P-256.
#[derive(Debug, Clone)]
pub struct RustCryptoProvider {
    pub rsa_bits: usize,
}

impl Default for RustCryptoProvider {
    fn default() -> Self {
        Self {
            rsa_bits: DEFAULT_RSA_BITS,
        }
    }
}

impl RustCryptoProvider {
    fn generate_key(&self, algorithm: SigningAlgorithm) -> Result<KeyPair, CryptoError> {
        debug!("generating {algorithm} key");
        match algorithm {
            SigningAlgorithm::Rsa => KeyPair::generate_rsa(self.rsa_bits),
            SigningAlgorithm::Ecdsa => Ok(KeyPair::generate_ecdsa_p256()),
        }
    }

    fn request_info(
        request: &IssuanceRequest<'_>,
        key: &KeyPair,
    ) -> Result<CertificationRequestInfo, CryptoError> {
        let mut extensions = Vec::new();
        if let Some(san) = request.san {
            extensions.push(ExtensionParam::from_extension(
                Ng911SubjectAltName::from(san),
                false,
            )?);
        }

        Ok(CertificationRequestInfo::builder()
            .subject(request.subject.clone())
            .subject_public_key(PublicKey::from_key_pair(key))
            .key_usages(KeyUsage::from(request.key_usage).0)
            .usages(ExtendedKeyUsage::from(request.key_usage).usage)
            .is_ca(request.is_ca)
            .extensions(extensions)
            .build())
    }

    fn package(
        request: &IssuanceRequest<'_>,
        certificate: Certificate,
        key: &KeyPair,
    ) -> Result<IssuedCertificate, CryptoError> {
        let pkcs12 = pkcs12::build(&request.subject.common_name, &certificate, key, request.password)?;
        let der = certificate.to_der()?;
        info!(
            "issued certificate for '{}' valid until {}",
            request.subject.common_name,
            certificate.not_after()
        );
        Ok(IssuedCertificate {
            certificate,
            pkcs12,
            der,
        })
    }

    fn self_signed(
        &self,
        algorithm: SigningAlgorithm,
        request: &IssuanceRequest<'_>,
        expires_years: u32,
    ) -> Result<IssuedCertificate, CryptoError> {
        let key = self.generate_key(algorithm)?;
        let info = Self::request_info(request, &key)?;
        let certificate =
            Certificate::new_self_signed(&info, &key, Validity::for_years(expires_years)?)?;
        Self::package(request, certificate, &key)
    }

    fn signed(
        &self,
        algorithm: SigningAlgorithm,
        ca: &CertificateWithPrivateKey,
        request: &IssuanceRequest<'_>,
    ) -> Result<IssuedCertificate, CryptoError> {
        if !ca.cert.is_ca() {
            warn!(
                "signing certificate '{}' is not marked as a CA",
                ca.cert.subject().common_name
            );
        }

        let key = self.generate_key(algorithm)?;
        let info = Self::request_info(request, &key)?;
        let certificate = ca.issue(&info, Validity::until(ca.cert.not_after()))?;
        Self::package(request, certificate, &key)
    }
}

impl CertificateProvider for RustCryptoProvider {
    fn create_rsa_self_signed(
        &self,
        request: &IssuanceRequest<'_>,
        expires_years: u32,
    ) -> Result<IssuedCertificate, CryptoError> {
        self.self_signed(SigningAlgorithm::Rsa, request, expires_years)
    }

    fn create_rsa_signed(
        &self,
        ca: &CertificateWithPrivateKey,
        request: &IssuanceRequest<'_>,
    ) -> Result<IssuedCertificate, CryptoError> {
        self.signed(SigningAlgorithm::Rsa, ca, request)
    }

    fn create_ecdsa_self_signed(
        &self,
        request: &IssuanceRequest<'_>,
        expires_years: u32,
    ) -> Result<IssuedCertificate, CryptoError> {
        self.self_signed(SigningAlgorithm::Ecdsa, request, expires_years)
    }

    fn create_ecdsa_signed(
        &self,
        ca: &CertificateWithPrivateKey,
        request: &IssuanceRequest<'_>,
    ) -> Result<IssuedCertificate, CryptoError> {
        self.signed(SigningAlgorithm::Ecdsa, ca, request)
    }
}
