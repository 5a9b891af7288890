//! Error types for certificate generation and persistence.
//!
//! Generation failures happen before any file is touched. Persistence
//! failures carry the path that could not be written or read.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while producing the key pair or the signed certificate.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// RSA modulus size outside the supported set
    #[error("Unsupported RSA key size: {0} bits (supported: 2048, 3072, 4096)")]
    UnsupportedKeySize(u32),

    /// Public exponent that is even or smaller than 3
    #[error("Invalid RSA public exponent: {0}")]
    InvalidExponent(u32),

    /// Zero-length validity window
    #[error("Validity must be at least one day, got {0}")]
    InvalidValidity(u32),

    /// Distinguished Name problem (empty, bad attribute, bad country code)
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),

    /// OpenSSL reported a failure at the named step
    #[error("Failed to {step}: {source}")]
    Crypto {
        step: &'static str,
        #[source]
        source: openssl::error::ErrorStack,
    },
}

impl GenerationError {
    pub(crate) fn crypto(step: &'static str) -> impl FnOnce(openssl::error::ErrorStack) -> Self {
        move |source| GenerationError::Crypto { step, source }
    }
}

/// Failure while writing or reading the PEM artifacts.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// I/O failure on a specific path
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Destination exists and overwriting was not requested
    #[error("Refusing to overwrite existing file {0:?} (pass --force to replace it)")]
    AlreadyExists(PathBuf),

    /// Certificate and private key would land on the same file
    #[error("Certificate and private key paths refer to the same file {0:?}")]
    SameDestination(PathBuf),

    /// PEM encoding or decoding failed
    #[error("PEM error for {path:?}: {source}")]
    Pem {
        path: PathBuf,
        #[source]
        source: openssl::error::ErrorStack,
    },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PersistenceError::Io { path, source }
    }

    pub(crate) fn pem(path: impl Into<PathBuf>) -> impl FnOnce(openssl::error::ErrorStack) -> Self {
        let path = path.into();
        move |source| PersistenceError::Pem { path, source }
    }
}

/// Failure while loading the TOML configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level error for the library.
#[derive(Error, Debug)]
pub enum CertGenError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Key and certificate do not belong together or the signature is bad
    #[error("Verification failed: {0}")]
    Verification(String),
}

/// A specialized Result type for generator operations.
pub type Result<T> = std::result::Result<T, CertGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GenerationError::UnsupportedKeySize(1024);
        assert_eq!(
            err.to_string(),
            "Unsupported RSA key size: 1024 bits (supported: 2048, 3072, 4096)"
        );
    }

    #[test]
    fn test_io_error_carries_path() {
        let err = PersistenceError::io("/nowhere/cert.pem")(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert!(err.to_string().contains("/nowhere/cert.pem"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CertGenError>();
    }

    #[test]
    fn test_transparent_wrapping() {
        let err: CertGenError = GenerationError::InvalidValidity(0).into();
        assert!(matches!(
            err,
            CertGenError::Generation(GenerationError::InvalidValidity(0))
        ));
        assert_eq!(err.to_string(), "Validity must be at least one day, got 0");
    }
}
