//! Self-Signed Certificate Generation Module
//!
//! Produces an RSA key pair and a self-signed X.509v3 certificate binding the
//! public half of that key to a Distinguished Name.
//!
//! # Certificate Properties
//! - **Self-signed**: Issuer and subject are the same name
//! - **Basic Constraints**: CA=true, no path length limit, critical
//! - **Signature**: SHA-256 with RSA
//! - **Serial Number**: Random 128-bit value drawn from the caller's RNG
//! - **Validity**: `not_before` is the generation instant, `not_after` is
//!   exactly `validity_days * 86400` seconds later
//!
//! Nothing in this module touches the filesystem; see [`crate::persist`].
//!
//! # Example
//! ```rust,no_run
//! use rand::rngs::OsRng;
//! use selfsign::generate_self_signed::SelfSignedBuilder;
//! use selfsign::subject::{DnAttribute, SubjectName};
//!
//! # fn example() -> Result<(), selfsign::error::GenerationError> {
//! let generated = SelfSignedBuilder::new()
//!     .key_size(3072)
//!     .subject(
//!         SubjectName::new()
//!             .push(DnAttribute::CommonName, "example.com")
//!             .push(DnAttribute::Country, "US"),
//!     )
//!     .validity_days(30)
//!     .build(&mut OsRng)?;
//! # Ok(())
//! # }
//! ```

use crate::configs::GeneratorConfig;
use crate::error::GenerationError;
use crate::subject::SubjectName;
use chrono::{DateTime, Utc};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::BasicConstraints;
use openssl::x509::X509;
use rand::RngCore;
use std::fmt;
use tracing::{debug, info};

const X509_VERSION_3: i32 = 2; // X509 version 3 is represented by 2
const SERIAL_NUMBER_BYTES: usize = 16; // 128 bits
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// RSA modulus sizes accepted by the generator.
pub const SUPPORTED_KEY_SIZES: [u32; 3] = [2048, 3072, 4096];
pub const DEFAULT_KEY_SIZE: u32 = 2048;
pub const DEFAULT_PUBLIC_EXPONENT: u32 = 65537;
pub const DEFAULT_VALIDITY_DAYS: u32 = 365;

/// A freshly signed certificate together with the key that signed it.
pub struct GeneratedCertificate {
    certificate: X509,
    private_key: PKey<Private>,
}

impl GeneratedCertificate {
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    pub fn private_key(&self) -> &PKey<Private> {
        &self.private_key
    }

    /// PEM-encoded certificate (`BEGIN CERTIFICATE`).
    pub fn certificate_pem(&self) -> Result<Vec<u8>, GenerationError> {
        self.certificate
            .to_pem()
            .map_err(GenerationError::crypto("encode certificate as PEM"))
    }

    /// Unencrypted PKCS#8 PEM private key (`BEGIN PRIVATE KEY`).
    pub fn private_key_pem(&self) -> Result<Vec<u8>, GenerationError> {
        self.private_key
            .private_key_to_pem_pkcs8()
            .map_err(GenerationError::crypto("encode private key as PKCS#8 PEM"))
    }

    /// Serial number as upper-case hex.
    pub fn serial_hex(&self) -> Result<String, GenerationError> {
        let serial = self
            .certificate
            .serial_number()
            .to_bn()
            .map_err(GenerationError::crypto("read serial number"))?;
        let hex = serial
            .to_hex_str()
            .map_err(GenerationError::crypto("format serial number"))?;
        Ok(hex.to_string())
    }
}

impl fmt::Debug for GeneratedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = SubjectName::from_x509_name(self.certificate.subject_name());
        f.debug_struct("GeneratedCertificate")
            .field("subject", &subject.to_string())
            .field("not_before", &self.certificate.not_before().to_string())
            .field("not_after", &self.certificate.not_after().to_string())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Builder for an RSA key pair and its self-signed CA certificate
///
/// Defaults: 2048-bit key, e=65537, 365 days validity. The subject has no
/// default here and must be set; [`GeneratorConfig`] carries the
/// `example.com` defaults.
#[derive(Debug, Clone)]
pub struct SelfSignedBuilder {
    key_size: u32,
    public_exponent: u32,
    subject: SubjectName,
    validity_days: u32,
}

impl Default for SelfSignedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SelfSignedBuilder {
    pub fn new() -> Self {
        Self {
            key_size: DEFAULT_KEY_SIZE,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
            subject: SubjectName::new(),
            validity_days: DEFAULT_VALIDITY_DAYS,
        }
    }

    /// Set the RSA modulus size in bits (2048, 3072 or 4096)
    pub fn key_size(mut self, bits: u32) -> Self {
        self.key_size = bits;
        self
    }

    /// Set the RSA public exponent
    pub fn public_exponent(mut self, e: u32) -> Self {
        self.public_exponent = e;
        self
    }

    /// Set the Distinguished Name used as both subject and issuer
    pub fn subject(mut self, subject: SubjectName) -> Self {
        self.subject = subject;
        self
    }

    /// Set validity period in days
    pub fn validity_days(mut self, days: u32) -> Self {
        self.validity_days = days;
        self
    }

    fn validate(&self) -> Result<(), GenerationError> {
        if !SUPPORTED_KEY_SIZES.contains(&self.key_size) {
            return Err(GenerationError::UnsupportedKeySize(self.key_size));
        }
        if self.public_exponent < 3 || self.public_exponent % 2 == 0 {
            return Err(GenerationError::InvalidExponent(self.public_exponent));
        }
        if self.validity_days == 0 {
            return Err(GenerationError::InvalidValidity(self.validity_days));
        }
        self.subject.validate()
    }

    /// Generate the key pair and sign the certificate, valid from now.
    pub fn build<R: RngCore + ?Sized>(
        self,
        rng: &mut R,
    ) -> Result<GeneratedCertificate, GenerationError> {
        self.build_at(rng, Utc::now())
    }

    /// Same as [`build`](Self::build) with an explicit generation instant.
    ///
    /// # Errors
    /// Returns error if:
    /// - The key size, exponent, validity or subject is invalid
    /// - RSA key generation fails
    /// - Any X.509 field or extension cannot be set
    /// - Certificate signing fails
    pub fn build_at<R: RngCore + ?Sized>(
        self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<GeneratedCertificate, GenerationError> {
        self.validate()?;
        debug!(
            key_size = self.key_size,
            exponent = self.public_exponent,
            subject = %self.subject,
            validity_days = self.validity_days,
            "Generating self-signed certificate"
        );

        let exponent = BigNum::from_u32(self.public_exponent)
            .map_err(GenerationError::crypto("create public exponent"))?;
        let rsa = Rsa::generate_with_e(self.key_size, &exponent)
            .map_err(GenerationError::crypto("generate RSA keypair"))?;
        let private_key =
            PKey::from_rsa(rsa).map_err(GenerationError::crypto("create private key"))?;

        let mut builder = X509::builder().map_err(GenerationError::crypto("create X509 builder"))?;
        builder
            .set_version(X509_VERSION_3)
            .map_err(GenerationError::crypto("set version"))?;

        let serial = random_serial(rng)?;
        let asn1_serial = serial
            .to_asn1_integer()
            .map_err(GenerationError::crypto("encode serial number"))?;
        builder
            .set_serial_number(&asn1_serial)
            .map_err(GenerationError::crypto("set serial number"))?;

        let name = self.subject.to_x509_name()?;
        builder
            .set_subject_name(&name)
            .map_err(GenerationError::crypto("set subject"))?;
        builder
            .set_issuer_name(&name)
            .map_err(GenerationError::crypto("set issuer"))?;

        // Both bounds come from one timestamp so the window is exact.
        let start = now.timestamp();
        let end = start + i64::from(self.validity_days) * SECONDS_PER_DAY;
        let not_before =
            Asn1Time::from_unix(start).map_err(GenerationError::crypto("create not_before"))?;
        builder
            .set_not_before(&not_before)
            .map_err(GenerationError::crypto("set not_before"))?;
        let not_after =
            Asn1Time::from_unix(end).map_err(GenerationError::crypto("create not_after"))?;
        builder
            .set_not_after(&not_after)
            .map_err(GenerationError::crypto("set not_after"))?;

        builder
            .set_pubkey(&private_key)
            .map_err(GenerationError::crypto("set public key"))?;

        let extension = BasicConstraints::new()
            .critical()
            .ca()
            .build()
            .map_err(GenerationError::crypto("build BasicConstraints"))?;
        builder
            .append_extension(extension)
            .map_err(GenerationError::crypto("add BasicConstraints"))?;

        builder
            .sign(&private_key, MessageDigest::sha256())
            .map_err(GenerationError::crypto("sign certificate"))?;
        let certificate = builder.build();

        let generated = GeneratedCertificate {
            certificate,
            private_key,
        };
        let serial = generated.serial_hex()?;
        info!(subject = %self.subject, serial = %serial, "Self-signed certificate generated");
        Ok(generated)
    }
}

/// Draw a non-zero 128-bit serial number.
fn random_serial<R: RngCore + ?Sized>(rng: &mut R) -> Result<BigNum, GenerationError> {
    let mut bytes = [0u8; SERIAL_NUMBER_BYTES];
    loop {
        rng.fill_bytes(&mut bytes);
        if bytes.iter().any(|b| *b != 0) {
            break;
        }
    }
    BigNum::from_slice(&bytes).map_err(GenerationError::crypto("create serial number"))
}

/// Generate a certificate and key from a full configuration.
pub fn generate<R: RngCore + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<GeneratedCertificate, GenerationError> {
    generate_with_subject(config, config.subject.to_subject_name(), rng)
}

/// Like [`generate`], with `subject` replacing the configured subject.
pub fn generate_with_subject<R: RngCore + ?Sized>(
    config: &GeneratorConfig,
    subject: SubjectName,
    rng: &mut R,
) -> Result<GeneratedCertificate, GenerationError> {
    SelfSignedBuilder::new()
        .key_size(config.key.size)
        .public_exponent(config.key.exponent)
        .subject(subject)
        .validity_days(config.validity.days)
        .build(rng)
}
