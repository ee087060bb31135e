//! use certbuilder::error::CryptoError;

use std::path::PathBuf;

use thiserror::Error;

use crate::config::IdType;
use crate::validation::ValidationError;

/// Errors raised while building, encoding or decoding keys, certificates
/// and PKCS#12 containers.
#[derive(Debug, Error, Clone)]
pub enum CryptoError {
    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error during key generation.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// Error related to certificate operations.
    #[error("Certificate error: {0}")]
    CertificateError(String),

    /// Error from RSA operations.
    #[error("RSA error: {0}")]
    RsaError(String),

    /// Error from the PKCS#12 container codec.
    #[error("PKCS#12 error: {0}")]
    Pkcs12Error(String),
}

impl From<der::Error> for CryptoError {
    /// Converts a `der::Error` into a `CryptoError`.
    fn from(err: der::Error) -> Self {
        CryptoError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for CryptoError {
    fn from(err: rsa::Error) -> Self {
        CryptoError::RsaError(err.to_string())
    }
}

impl From<pkcs8::Error> for CryptoError {
    fn from(err: pkcs8::Error) -> Self {
        CryptoError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for CryptoError {
    fn from(err: pkcs8::spki::Error) -> Self {
        CryptoError::EncodingError(err.to_string())
    }
}

impl From<openssl::error::ErrorStack> for CryptoError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        CryptoError::Pkcs12Error(err.to_string())
    }
}

/// Rejected attempt to extend the role catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Enter a custom role")]
    EmptyName,

    #[error("The {id_type} roles list already has a role called '{name}'")]
    DuplicateRole { id_type: IdType, name: String },
}

/// User-correctable misuse of the selected-roles operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    #[error("No roles selected")]
    NoSelection,
}

/// Problems with a password entered at a prompt. The prompt is shown again.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SecretError {
    #[error("Password not entered.")]
    Empty,

    #[error("The passwords do not match")]
    Mismatch,
}

/// Failure to locate, write or serialize the settings document.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not determine a per-user directory for the settings document")]
    NoLocation,

    #[error("Failed to write settings to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A certificate creation attempt that ended without artifacts.
///
/// Every variant is terminal for the attempt; the configuration is left as
/// it was so the user can correct it and try again.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(
        "An exception occurred when trying to load the CA certificate to use for signing. \
         The exception message is: {0}"
    )]
    CaContainer(String),

    #[error("An unexpected error occurred. The certificates were not created. The exception message is: {0}")]
    Issuance(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
