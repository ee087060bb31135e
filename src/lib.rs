//! # CertBuilder - NG9-1-1 Certificate Builder
//!
//! CertBuilder configures, validates and issues X.509 certificates for
//! NG9-1-1 emergency services networks. A certificate carries a subject
//! distinguished name, key usage extensions and an NG9-1-1 subject
//! alternative name holding an identifier and the roles its holder claims.
//!
//! ## Issuance
//!
//! Certificates are either self-signed or signed by a CA loaded from a
//! password-protected PKCS#12 container, with a new key of one of:
//! - **RSA**: 2048-bit keys by default
//! - **ECDSA**: P-256
//!
//! Each new certificate is written twice to the destination directory:
//! - **`<name>.pfx`**: PKCS#12 container with the private key, protected
//!   by a password entered at creation time
//! - **`<name>.cer`**: the DER certificate
//!
//! ## Quick Start
//!
//! ### Editing and Validating a Request
//!
//! ```rust,no_run
//! use certbuilder::{
//!     config::{ConfigField, IdType},
//!     session::CertBuilder,
//!     settings::JsonFileStore,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = CertBuilder::new(JsonFileStore::at_default_location()?);
//!
//! builder.update(ConfigField::DistinguishedName, |config| {
//!     config.distinguished_name.common_name = "esrp1.state.example".to_string();
//! });
//! builder.update(ConfigField::KeyUsage, |config| {
//!     config.key_usage.digital_signature = true;
//!     config.key_usage.server_authentication = true;
//! });
//! builder.update(ConfigField::SubjectAltName, |config| {
//!     config.subject_alt_name.id_type = IdType::ElementId;
//!     config.subject_alt_name.id = "esrp1.state.example".to_string();
//! });
//! builder.select_roles(["ESRP"])?;
//!
//! if let Err(err) = builder.validate() {
//!     println!("{} settings: {err}", err.group);
//! }
//! builder.save_settings()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Issuing Directly with the Provider
//!
//! ```rust,no_run
//! use certbuilder::{
//!     config::{DistinguishedName, KeyUsageParams},
//!     provider::{CertificateProvider, IssuanceRequest, RustCryptoProvider},
//! };
//! use secrecy::SecretString;
//!
//! # fn main() -> Result<(), certbuilder::error::CryptoError> {
//! let subject = DistinguishedName::builder()
//!     .common_name("psap1.county.example")
//!     .organization("County 911".to_string())
//!     .country("US".to_string())
//!     .build();
//! let key_usage = KeyUsageParams {
//!     digital_signature: true,
//!     client_authentication: true,
//!     ..Default::default()
//! };
//! let password = SecretString::from("correct horse battery staple");
//!
//! let issued = RustCryptoProvider::default().create_ecdsa_self_signed(
//!     &IssuanceRequest {
//!         subject: &subject,
//!         key_usage: &key_usage,
//!         san: None,
//!         password: &password,
//!         is_ca: false,
//!     },
//!     2,
//! )?;
//! println!("{}", issued.certificate.to_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`config`]: The request configuration and its change notifications
//! - [`roles`]: NG9-1-1 role catalog and role selection
//! - [`validation`]: Checks run before anything is issued
//! - [`orchestrator`]: One creation attempt, from validation to files on disk
//! - [`provider`]: Key generation and certificate issuance
//! - [`session`]: An editing session tying the pieces together
//! - [`settings`]: The saved "last used settings" document
//! - [`cert`], [`issuer`], [`key`], [`tbs_certificate`]: X.509 building blocks
//! - [`pkcs12`]: PKCS#12 containers
//! - [`error`]: Error types
//! - [`cli`]: The `certbuilder` command line

pub mod cert;
pub mod cli;
pub mod config;
pub mod error;
pub mod issuer;
pub mod key;
pub mod orchestrator;
pub mod pkcs12;
pub mod provider;
pub mod roles;
pub mod session;
pub mod settings;
pub mod tbs_certificate;
pub mod validation;
