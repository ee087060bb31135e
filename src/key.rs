use p256::ecdsa::{SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey};
use p384::ecdsa::{SigningKey as P384SigningKey, VerifyingKey as P384VerifyingKey};
use pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::pkcs1v15::SigningKey as RsaSigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::error::CryptoError;

/// Key material for a certificate subject or a signing CA.
#[derive(Clone, Debug)]
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
    EcdsaP256 {
        signing_key: P256SigningKey,
        verifying_key: P256VerifyingKey,
    },
    EcdsaP384 {
        signing_key: P384SigningKey,
        verifying_key: P384VerifyingKey,
    },
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self, CryptoError> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| CryptoError::KeyGenerationError(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P256SigningKey::random(&mut rng);
        let verifying_key = *signing_key.verifying_key();
        KeyPair::EcdsaP256 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = P384SigningKey::random(&mut rng);
        let verifying_key = *signing_key.verifying_key();
        KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        }
    }

    /// The algorithm this key signs certificates with.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::Rsa { .. } => SignatureAlgorithm::Sha256WithRSA,
            KeyPair::EcdsaP256 { .. } => SignatureAlgorithm::Sha256WithECDSA,
            KeyPair::EcdsaP384 { .. } => SignatureAlgorithm::Sha384WithECDSA,
        }
    }

    /// Signs `data`, returning the signature in its X.509 encoding
    /// (PKCS#1 v1.5 for RSA, DER `Ecdsa-Sig-Value` for ECDSA).
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self {
            KeyPair::Rsa { private, .. } => {
                let signing_key = RsaSigningKey::<Sha256>::new(private.as_ref().clone());
                let signature = signing_key
                    .try_sign(data)
                    .map_err(|e| CryptoError::RsaError(e.to_string()))?;
                Ok(signature.to_vec())
            }
            KeyPair::EcdsaP256 { signing_key, .. } => {
                let signature: p256::ecdsa::Signature = signing_key
                    .try_sign(data)
                    .map_err(|e| CryptoError::CertificateError(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::EcdsaP384 { signing_key, .. } => {
                let signature: p384::ecdsa::Signature = signing_key
                    .try_sign(data)
                    .map_err(|e| CryptoError::CertificateError(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
        }
    }

    /// SubjectPublicKeyInfo for the public half of this key.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned, CryptoError> {
        PublicKey::from_key_pair(self).to_spki()
    }

    /// Exports the private key as PKCS#8 DER.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>, CryptoError> {
        let document = match self {
            KeyPair::Rsa { private, .. } => private.to_pkcs8_der(),
            KeyPair::EcdsaP256 { signing_key, .. } => signing_key.to_pkcs8_der(),
            KeyPair::EcdsaP384 { signing_key, .. } => signing_key.to_pkcs8_der(),
        }
        .map_err(|e| CryptoError::EncodingError(e.to_string()))?;
        Ok(document.as_bytes().to_vec())
    }

    /// Imports a PKCS#8 DER private key, trying RSA, then P-256, then P-384.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, CryptoError> {
        if let Ok(private) = RsaPrivateKey::from_pkcs8_der(der) {
            let public = RsaPublicKey::from(&private);
            return Ok(KeyPair::Rsa {
                private: Box::new(private),
                public,
            });
        }
        if let Ok(signing_key) = P256SigningKey::from_pkcs8_der(der) {
            let verifying_key = *signing_key.verifying_key();
            return Ok(KeyPair::EcdsaP256 {
                signing_key,
                verifying_key,
            });
        }
        let signing_key = P384SigningKey::from_pkcs8_der(der).map_err(|_| {
            CryptoError::DecodingError(
                "private key is not an RSA, P-256 or P-384 PKCS#8 key".to_string(),
            )
        })?;
        let verifying_key = *signing_key.verifying_key();
        Ok(KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        })
    }
}

/// Public half of a [`KeyPair`].
#[derive(Clone, Debug)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP256(P256VerifyingKey),
    EcdsaP384(P384VerifyingKey),
}

impl PublicKey {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        match key_pair {
            KeyPair::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
            KeyPair::EcdsaP256 { verifying_key, .. } => PublicKey::EcdsaP256(*verifying_key),
            KeyPair::EcdsaP384 { verifying_key, .. } => PublicKey::EcdsaP384(*verifying_key),
        }
    }

    /// Encodes the key as a SubjectPublicKeyInfo.
    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned, CryptoError> {
        let spki = match self {
            PublicKey::Rsa(public) => SubjectPublicKeyInfoOwned::from_key(public.clone())?,
            PublicKey::EcdsaP256(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)?
            }
            PublicKey::EcdsaP384(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)?
            }
        };
        Ok(spki)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pkcs8_export_import_keeps_key_type() {
        let key = KeyPair::generate_ecdsa_p256();
        let der = key.to_pkcs8_der().unwrap();
        let imported = KeyPair::from_pkcs8_der(&der).unwrap();
        assert!(matches!(imported, KeyPair::EcdsaP256 { .. }));
        assert_eq!(
            key.as_spki().unwrap().subject_public_key,
            imported.as_spki().unwrap().subject_public_key
        );

        let key = KeyPair::generate_ecdsa_p384();
        let imported = KeyPair::from_pkcs8_der(&key.to_pkcs8_der().unwrap()).unwrap();
        assert!(matches!(imported, KeyPair::EcdsaP384 { .. }));
    }

    #[test]
    fn test_ecdsa_signature_is_der_encoded() {
        let key = KeyPair::generate_ecdsa_p256();
        let signature = key.sign_data(b"to be signed").unwrap();
        // SEQUENCE { r INTEGER, s INTEGER }
        assert_eq!(signature[0], 0x30);
        assert!(p256::ecdsa::Signature::from_der(&signature).is_ok());
    }

    #[test]
    fn test_rejects_garbage_pkcs8() {
        assert!(matches!(
            KeyPair::from_pkcs8_der(&[0x30, 0x03, 0x02, 0x01, 0x00]),
            Err(CryptoError::DecodingError(_))
        ));
    }
}
