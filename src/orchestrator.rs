//! Drives one certificate creation attempt from validation to the files on
//! disk.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};

use crate::cert::CertificateWithPrivateKey;
use crate::config::CertificateRequestConfig;
use crate::error::{CreateError, SecretError};
use crate::pkcs12::CaLoader;
use crate::provider::{CertificateProvider, IssuanceBranch, IssuanceRequest, IssuedCertificate};
use crate::validation;

/// Where an attempt stands. Every attempt starts and ends in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssuanceState {
    Idle,
    Validating,
    AwaitingCaSecret,
    AwaitingNewCertSecret,
    Issuing,
    Succeeded,
    Failed,
}

/// A new password and its repeated entry.
pub struct PasswordEntry {
    pub password: SecretString,
    pub confirmation: SecretString,
}

impl PasswordEntry {
    pub fn new(password: impl Into<String>, confirmation: impl Into<String>) -> Self {
        Self {
            password: SecretString::from(password.into()),
            confirmation: SecretString::from(confirmation.into()),
        }
    }

    /// The password, if it is non-empty and both entries match.
    pub fn verify(self) -> Result<SecretString, SecretError> {
        if self.password.expose_secret().is_empty() {
            return Err(SecretError::Empty);
        }
        if self.password.expose_secret() != self.confirmation.expose_secret() {
            return Err(SecretError::Mismatch);
        }
        Ok(self.password)
    }
}

/// Modal password prompts. `None` means the user cancelled.
pub trait SecretPrompt {
    /// Password of the CA container used for signing.
    fn ca_password(&mut self) -> Option<SecretString>;

    /// Password protecting the new container, entered twice.
    fn new_certificate_password(&mut self) -> Option<PasswordEntry>;

    /// Tells the user why the last entry was refused, before asking again.
    fn reject(&mut self, error: SecretError);
}

/// Paths of the two files written for a new certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateArtifactPair {
    /// Password-protected PKCS#12 container with the key and certificate.
    pub pfx: PathBuf,
    /// DER certificate.
    pub cer: PathBuf,
}

impl CertificateArtifactPair {
    pub fn new(directory: &Path, file_name_no_extension: &str) -> Self {
        Self {
            pfx: directory.join(format!("{file_name_no_extension}.pfx")),
            cer: directory.join(format!("{file_name_no_extension}.cer")),
        }
    }

    /// Writes both files, or neither: the container is removed again when
    /// the certificate cannot be written.
    fn write(&self, issued: &IssuedCertificate) -> Result<(), CreateError> {
        std::fs::write(&self.pfx, &issued.pkcs12).map_err(|source| CreateError::Io {
            path: self.pfx.clone(),
            source,
        })?;

        if let Err(source) = std::fs::write(&self.cer, &issued.der) {
            if let Err(err) = std::fs::remove_file(&self.pfx) {
                warn!("could not remove {}: {err}", self.pfx.display());
            }
            return Err(CreateError::Io {
                path: self.cer.clone(),
                source,
            });
        }

        info!(
            "wrote {} and {}",
            self.pfx.display(),
            self.cer.display()
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceOutcome {
    Created(CertificateArtifactPair),
    /// A password prompt was dismissed. Nothing was written.
    Cancelled,
}

/// Runs creation attempts against a provider, a CA container loader and a
/// set of password prompts.
pub struct Orchestrator<P, L, S> {
    provider: P,
    loader: L,
    prompt: S,
    trace: Vec<IssuanceState>,
}

impl<P, L, S> Orchestrator<P, L, S>
where
    P: CertificateProvider,
    L: CaLoader,
    S: SecretPrompt,
{
    pub fn new(provider: P, loader: L, prompt: S) -> Self {
        Self {
            provider,
            loader,
            prompt,
            trace: vec![IssuanceState::Idle],
        }
    }

    /// States visited by the most recent attempt, starting and ending with
    /// `Idle`.
    pub fn last_trace(&self) -> &[IssuanceState] {
        &self.trace
    }

    /// Validates `config`, collects the passwords, issues the certificate
    /// and writes it to the destination directory.
    ///
    /// The configuration is only read. Validation errors and cancelled
    /// prompts leave no trace on disk; CA container, provider and write
    /// failures end the attempt in `Failed`.
    pub fn create_certificate(
        &mut self,
        config: &CertificateRequestConfig,
    ) -> Result<IssuanceOutcome, CreateError> {
        self.trace.clear();
        self.enter(IssuanceState::Idle);

        let result = self.attempt(config);
        match &result {
            Ok(IssuanceOutcome::Created(_)) => self.enter(IssuanceState::Succeeded),
            Ok(IssuanceOutcome::Cancelled) => debug!("certificate creation cancelled"),
            Err(CreateError::Invalid(_)) => {}
            Err(err) => {
                warn!("certificate creation failed: {err}");
                self.enter(IssuanceState::Failed);
            }
        }
        self.enter(IssuanceState::Idle);
        result
    }

    fn attempt(
        &mut self,
        config: &CertificateRequestConfig,
    ) -> Result<IssuanceOutcome, CreateError> {
        self.enter(IssuanceState::Validating);
        validation::validate(config)?;

        let branch = IssuanceBranch::resolve(config.self_signed, config.signing_algorithm);
        let ca = if branch.is_self_signed() {
            None
        } else {
            self.enter(IssuanceState::AwaitingCaSecret);
            let Some(password) = self.collect_ca_password() else {
                return Ok(IssuanceOutcome::Cancelled);
            };
            Some(self.open_ca(config, &password)?)
        };

        self.enter(IssuanceState::AwaitingNewCertSecret);
        let Some(password) = self.collect_new_password() else {
            return Ok(IssuanceOutcome::Cancelled);
        };

        self.enter(IssuanceState::Issuing);
        let request = IssuanceRequest {
            subject: &config.distinguished_name,
            key_usage: &config.key_usage,
            san: config
                .add_subject_alt_name
                .then_some(&config.subject_alt_name),
            password: &password,
            is_ca: config.ca_certificate,
        };
        debug!("issuing {branch} certificate: {request:?}");

        // validated to be at least 1
        let expires_years = config.expires_years.unsigned_abs();
        let issued = match (branch, &ca) {
            (IssuanceBranch::SelfSignedRsa, _) => {
                self.provider.create_rsa_self_signed(&request, expires_years)
            }
            (IssuanceBranch::SelfSignedEcdsa, _) => {
                self.provider.create_ecdsa_self_signed(&request, expires_years)
            }
            (IssuanceBranch::CaSignedRsa, Some(ca)) => self.provider.create_rsa_signed(ca, &request),
            (IssuanceBranch::CaSignedEcdsa, Some(ca)) => {
                self.provider.create_ecdsa_signed(ca, &request)
            }
            (IssuanceBranch::CaSignedRsa | IssuanceBranch::CaSignedEcdsa, None) => {
                return Err(CreateError::CaContainer(
                    "no CA certificate was loaded".to_string(),
                ));
            }
        }
        .map_err(|err| CreateError::Issuance(err.to_string()))?;

        let artifacts = CertificateArtifactPair::new(
            &config.destination_directory,
            &config.file_name_no_extension,
        );
        artifacts.write(&issued)?;
        Ok(IssuanceOutcome::Created(artifacts))
    }

    fn enter(&mut self, state: IssuanceState) {
        debug!("issuance state -> {state:?}");
        self.trace.push(state);
    }

    fn collect_ca_password(&mut self) -> Option<SecretString> {
        loop {
            let password = self.prompt.ca_password()?;
            if !password.expose_secret().is_empty() {
                return Some(password);
            }
            self.prompt.reject(SecretError::Empty);
        }
    }

    fn collect_new_password(&mut self) -> Option<SecretString> {
        loop {
            match self.prompt.new_certificate_password()?.verify() {
                Ok(password) => return Some(password),
                Err(err) => self.prompt.reject(err),
            }
        }
    }

    fn open_ca(
        &self,
        config: &CertificateRequestConfig,
        password: &SecretString,
    ) -> Result<CertificateWithPrivateKey, CreateError> {
        let path = config
            .ca_cert_file
            .as_deref()
            .ok_or_else(|| CreateError::CaContainer("no CA certificate file".to_string()))?;
        let bytes = std::fs::read(path)
            .map_err(|err| CreateError::CaContainer(format!("{}: {err}", path.display())))?;

        let ca = self
            .loader
            .load_pkcs12(&bytes, password)
            .map_err(|err| CreateError::CaContainer(err.to_string()))?;
        debug!("loaded CA '{}'", ca.cert.subject().common_name);
        Ok(ca)
    }
}
