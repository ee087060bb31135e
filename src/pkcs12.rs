//! PKCS#12 (`.pfx`) containers: building the protected output container and
//! opening the CA container used for signing.

use openssl::pkcs12::Pkcs12;
use openssl::pkey::PKey;
use openssl::x509::X509;
use secrecy::{ExposeSecret, SecretString};

use crate::cert::{Certificate, CertificateWithPrivateKey};
use crate::error::CryptoError;
use crate::key::KeyPair;

/// Opens a password-protected certificate-and-key container.
pub trait CaLoader {
    fn load_pkcs12(
        &self,
        bytes: &[u8],
        password: &SecretString,
    ) -> Result<CertificateWithPrivateKey, CryptoError>;
}

/// [`CaLoader`] backed by OpenSSL's PKCS#12 parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pkcs12CaLoader;

impl CaLoader for Pkcs12CaLoader {
    fn load_pkcs12(
        &self,
        bytes: &[u8],
        password: &SecretString,
    ) -> Result<CertificateWithPrivateKey, CryptoError> {
        open(bytes, password)
    }
}

/// Packs `cert` and `key` into a PKCS#12 container protected by `password`.
pub fn build(
    friendly_name: &str,
    cert: &Certificate,
    key: &KeyPair,
    password: &SecretString,
) -> Result<Vec<u8>, CryptoError> {
    let x509 = X509::from_der(&cert.to_der()?)?;
    let pkey = PKey::private_key_from_pkcs8(&key.to_pkcs8_der()?)?;

    let container = Pkcs12::builder()
        .name(friendly_name)
        .pkey(&pkey)
        .cert(&x509)
        .build2(password.expose_secret())?;

    Ok(container.to_der()?)
}

/// Opens a PKCS#12 container and returns the certificate and private key
/// it holds.
pub fn open(bytes: &[u8], password: &SecretString) -> Result<CertificateWithPrivateKey, CryptoError> {
    let parsed = Pkcs12::from_der(bytes)?.parse2(password.expose_secret())?;

    let cert = parsed.cert.ok_or_else(|| {
        CryptoError::Pkcs12Error("the container does not hold a certificate".to_string())
    })?;
    let pkey = parsed.pkey.ok_or_else(|| {
        CryptoError::Pkcs12Error("the container does not hold a private key".to_string())
    })?;

    Ok(CertificateWithPrivateKey {
        cert: Certificate::from_der(&cert.to_der()?)?,
        key: KeyPair::from_pkcs8_der(&pkey.private_key_to_pkcs8()?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::params::{CertificationRequestInfo, DistinguishedName, Validity};
    use crate::key::PublicKey;

    fn self_signed(key: &KeyPair) -> Certificate {
        let info = CertificationRequestInfo::builder()
            .subject(DistinguishedName::builder().common_name("ca.example").build())
            .subject_public_key(PublicKey::from_key_pair(key))
            .is_ca(true)
            .build();
        Certificate::new_self_signed(&info, key, Validity::for_days(10)).unwrap()
    }

    #[test]
    fn test_container_opens_with_its_password_only() {
        let key = KeyPair::generate_ecdsa_p256();
        let cert = self_signed(&key);
        let password = SecretString::from("correct horse");
        let bytes = build("ca.example", &cert, &key, &password).unwrap();

        let opened = Pkcs12CaLoader.load_pkcs12(&bytes, &password).unwrap();
        assert_eq!(opened.cert.to_der().unwrap(), cert.to_der().unwrap());
        assert!(matches!(opened.key, KeyPair::EcdsaP256 { .. }));

        let wrong = SecretString::from("battery staple");
        assert!(matches!(
            Pkcs12CaLoader.load_pkcs12(&bytes, &wrong),
            Err(CryptoError::Pkcs12Error(_))
        ));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let password = SecretString::from("pw");
        assert!(open(b"not a container", &password).is_err());
    }
}
