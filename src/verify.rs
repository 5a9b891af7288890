//! Loading written artifacts back and checking that they belong together.

use crate::error::{CertGenError, PersistenceError, Result};
use crate::subject::SubjectName;
use openssl::pkey::{PKey, PKeyRef, Private};
use openssl::x509::{X509, X509Ref};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a PEM certificate from disk.
pub fn load_certificate_pem(path: impl AsRef<Path>) -> std::result::Result<X509, PersistenceError> {
    let path = path.as_ref();
    let pem = fs::read(path).map_err(PersistenceError::io(path))?;
    X509::from_pem(&pem).map_err(PersistenceError::pem(path))
}

/// Read an unencrypted PEM private key (PKCS#8 or traditional) from disk.
pub fn load_private_key_pem(
    path: impl AsRef<Path>,
) -> std::result::Result<PKey<Private>, PersistenceError> {
    let path = path.as_ref();
    let pem = fs::read(path).map_err(PersistenceError::io(path))?;
    PKey::private_key_from_pem(&pem).map_err(PersistenceError::pem(path))
}

/// Check that `certificate` is self-signed by `private_key`.
///
/// Verifies, in order:
/// 1. subject and issuer encode to the same DER
/// 2. the signature verifies against the certificate's own public key
/// 3. that public key is the public half of `private_key`
pub fn verify_key_certificate_pair(
    private_key: &PKeyRef<Private>,
    certificate: &X509Ref,
) -> Result<()> {
    let crypto = |step: &str| {
        let step = step.to_string();
        move |e: openssl::error::ErrorStack| {
            CertGenError::Verification(format!("Failed to {}: {}", step, e))
        }
    };

    let subject_der = certificate
        .subject_name()
        .to_der()
        .map_err(crypto("encode subject"))?;
    let issuer_der = certificate
        .issuer_name()
        .to_der()
        .map_err(crypto("encode issuer"))?;
    if subject_der != issuer_der {
        return Err(CertGenError::Verification(
            "Certificate is not self-signed: subject and issuer differ".to_string(),
        ));
    }

    let public_key = certificate
        .public_key()
        .map_err(crypto("read certificate public key"))?;
    if !certificate
        .verify(&public_key)
        .map_err(crypto("verify signature"))?
    {
        return Err(CertGenError::Verification(
            "Certificate signature does not verify with its public key".to_string(),
        ));
    }

    if !public_key.public_eq(private_key) {
        return Err(CertGenError::Verification(
            "Private key does not match the certificate public key".to_string(),
        ));
    }

    debug!("Key and certificate pair verified");
    Ok(())
}

/// Human-readable facts about a certificate, for the CLI.
#[derive(Debug, Clone)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    pub not_before: String,
    pub not_after: String,
    pub key_bits: u32,
}

impl CertificateSummary {
    pub fn from_certificate(certificate: &X509Ref) -> Result<Self> {
        let to_err = |e: openssl::error::ErrorStack| CertGenError::Verification(e.to_string());
        let serial = certificate
            .serial_number()
            .to_bn()
            .and_then(|bn| bn.to_hex_str().map(|s| s.to_string()))
            .map_err(to_err)?;
        let key_bits = certificate.public_key().map_err(to_err)?.bits();
        Ok(Self {
            subject: SubjectName::from_x509_name(certificate.subject_name()).to_string(),
            issuer: SubjectName::from_x509_name(certificate.issuer_name()).to_string(),
            serial,
            not_before: certificate.not_before().to_string(),
            not_after: certificate.not_after().to_string(),
            key_bits,
        })
    }
}
