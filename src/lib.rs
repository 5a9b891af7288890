//! selfsign - One-shot self-signed certificate generator
//!
//! Generates an RSA key pair and a self-signed X.509v3 CA certificate, then
//! writes both to disk as PEM: the certificate with `CERTIFICATE` framing and
//! the private key as unencrypted PKCS#8 with `PRIVATE KEY` framing.
//!
//! ```text
//! key generation → subject/issuer → certificate assembly → signing → PEM → files
//! ```
//!
//! # Defaults
//!
//! - RSA 2048-bit, public exponent 65537
//! - Subject/issuer `CN=example.com, O=Example Organization, C=US`
//! - 365 days validity starting at generation time
//! - Basic Constraints `CA:TRUE`, critical, no path length limit
//! - SHA-256 signature, random 128-bit serial number
//! - Output `certificate.pem` and `private_key.pem`
//!
//! # Modules
//!
//! - [`configs`]: TOML configuration with documented defaults
//! - [`subject`]: Distinguished Name model and `CN=..,O=..` parsing
//! - [`generate_self_signed`]: key generation, certificate assembly and signing
//! - [`persist`]: atomic writing of both artifacts
//! - [`verify`]: reading artifacts back and checking the key/certificate pair
//!
//! # Example
//!
//! ```no_run
//! use rand::rngs::OsRng;
//! use selfsign::configs::GeneratorConfig;
//! use selfsign::generate_self_signed::generate;
//! use selfsign::persist::{persist, PersistOptions};
//!
//! # fn example() -> selfsign::Result<()> {
//! let config = GeneratorConfig::default();
//! let generated = generate(&config, &mut OsRng)?;
//! persist(
//!     &generated,
//!     &config.output.certificate_path,
//!     &config.output.private_key_path,
//!     PersistOptions::default(),
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod error;
pub mod generate_self_signed;
pub mod persist;
pub mod subject;
pub mod verify;

pub use error::{CertGenError, GenerationError, PersistenceError, Result};
pub use generate_self_signed::{
    generate, generate_with_subject, GeneratedCertificate, SelfSignedBuilder,
};
pub use persist::{persist, PersistOptions};
