use crate::error::ConfigError;
use crate::subject::{DnAttribute, SubjectName};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Full generator configuration, loadable from TOML.
///
/// Every section and field is optional in the file; missing values fall back
/// to the defaults below (2048-bit RSA, e=65537, example.com subject,
/// 365 days, `certificate.pem` / `private_key.pem`).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub key: KeyConfig,
    #[serde(default)]
    pub subject: SubjectConfig,
    #[serde(default)]
    pub validity: ValidityConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeyConfig {
    #[serde(default = "default_key_size")]
    pub size: u32,
    #[serde(default = "default_public_exponent")]
    pub exponent: u32,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            size: default_key_size(),
            exponent: default_public_exponent(),
        }
    }
}

fn default_key_size() -> u32 {
    2048
}

fn default_public_exponent() -> u32 {
    65537
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubjectConfig {
    #[serde(default = "default_common_name")]
    pub common_name: String,
    #[serde(default = "default_organization")]
    pub organization: Option<String>,
    #[serde(default)]
    pub organizational_unit: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default = "default_country")]
    pub country: Option<String>,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            common_name: default_common_name(),
            organization: default_organization(),
            organizational_unit: None,
            locality: None,
            state: None,
            country: default_country(),
        }
    }
}

fn default_common_name() -> String {
    "example.com".to_string()
}

fn default_organization() -> Option<String> {
    Some("Example Organization".to_string())
}

fn default_country() -> Option<String> {
    Some("US".to_string())
}

impl SubjectConfig {
    /// Build the ordered Distinguished Name: CN, O, OU, L, ST, C.
    ///
    /// TOML has no null, so an empty string (`organization = ""`) is how a
    /// file removes an optional attribute that has a default.
    pub fn to_subject_name(&self) -> SubjectName {
        SubjectName::new()
            .push(DnAttribute::CommonName, self.common_name.as_str())
            .push_opt(DnAttribute::Organization, self.organization.as_deref())
            .push_opt(
                DnAttribute::OrganizationalUnit,
                self.organizational_unit.as_deref(),
            )
            .push_opt(DnAttribute::Locality, self.locality.as_deref())
            .push_opt(DnAttribute::State, self.state.as_deref())
            .push_opt(DnAttribute::Country, self.country.as_deref())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ValidityConfig {
    #[serde(default = "default_validity_days")]
    pub days: u32,
}

impl Default for ValidityConfig {
    fn default() -> Self {
        Self {
            days: default_validity_days(),
        }
    }
}

fn default_validity_days() -> u32 {
    365
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_certificate_path")]
    pub certificate_path: PathBuf,
    #[serde(default = "default_private_key_path")]
    pub private_key_path: PathBuf,
    #[serde(default)]
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            certificate_path: default_certificate_path(),
            private_key_path: default_private_key_path(),
            overwrite: false,
        }
    }
}

fn default_certificate_path() -> PathBuf {
    PathBuf::from("certificate.pem")
}

fn default_private_key_path() -> PathBuf {
    PathBuf::from("private_key.pem")
}

impl GeneratorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(config_str)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_script() {
        let config = GeneratorConfig::default();
        assert_eq!(config.key.size, 2048);
        assert_eq!(config.key.exponent, 65537);
        assert_eq!(config.validity.days, 365);
        assert_eq!(
            config.subject.to_subject_name().to_string(),
            "CN=example.com,O=Example Organization,C=US"
        );
        assert_eq!(
            config.output.certificate_path,
            PathBuf::from("certificate.pem")
        );
        assert_eq!(
            config.output.private_key_path,
            PathBuf::from("private_key.pem")
        );
        assert!(!config.output.overwrite);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config.key.size, 2048);
        assert_eq!(config.subject.common_name, "example.com");
    }

    #[test]
    fn test_partial_toml() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            [key]
            size = 4096

            [subject]
            common_name = "internal.test"
            locality = "Sao Jose dos Campos"

            [output]
            private_key_path = "keys/server.key"
            overwrite = true
            "#,
        )
        .unwrap();
        assert_eq!(config.key.size, 4096);
        assert_eq!(config.key.exponent, 65537);
        assert_eq!(
            config.subject.to_subject_name().to_string(),
            "CN=internal.test,O=Example Organization,L=Sao Jose dos Campos,C=US"
        );
        assert_eq!(
            config.output.private_key_path,
            PathBuf::from("keys/server.key")
        );
        assert_eq!(
            config.output.certificate_path,
            PathBuf::from("certificate.pem")
        );
        assert!(config.output.overwrite);
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let config = GeneratorConfig::from_toml_str(include_str!("../selfsign.example.toml")).unwrap();
        let defaults = GeneratorConfig::default();
        assert_eq!(config.key.size, defaults.key.size);
        assert_eq!(config.key.exponent, defaults.key.exponent);
        assert_eq!(config.validity.days, defaults.validity.days);
        assert_eq!(
            config.subject.to_subject_name(),
            defaults.subject.to_subject_name()
        );
        assert_eq!(config.output.certificate_path, defaults.output.certificate_path);
    }

    #[test]
    fn test_empty_string_omits_defaulted_attributes() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            [subject]
            common_name = "bare.test"
            organization = ""
            country = ""
            "#,
        )
        .unwrap();
        let subject = config.subject.to_subject_name();
        assert_eq!(subject.to_string(), "CN=bare.test");
        assert!(subject.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml() {
        let result = GeneratorConfig::from_toml_str("[key]\nsize = \"big\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = GeneratorConfig::from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
