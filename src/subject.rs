//! Distinguished Name handling
//!
//! A [`SubjectName`] is an ordered list of attribute/value pairs. The same
//! name is written as both subject and issuer of the generated certificate.
//!
//! # Example
//! ```
//! use selfsign::subject::SubjectName;
//!
//! let subject: SubjectName = "CN=example.com,O=Example Organization,C=US".parse().unwrap();
//! assert_eq!(subject.common_name(), Some("example.com"));
//! ```

use crate::error::GenerationError;
use openssl::nid::Nid;
use openssl::x509::{X509Name, X509NameRef};
use std::fmt;
use std::str::FromStr;

/// Attribute types accepted in a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnAttribute {
    CommonName,
    Organization,
    OrganizationalUnit,
    Locality,
    State,
    Country,
    /// Any other attribute type found in an existing certificate
    Other(Nid),
}

impl DnAttribute {
    const KNOWN: [DnAttribute; 6] = [
        DnAttribute::CommonName,
        DnAttribute::Organization,
        DnAttribute::OrganizationalUnit,
        DnAttribute::Locality,
        DnAttribute::State,
        DnAttribute::Country,
    ];

    fn from_nid(nid: Nid) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|a| a.nid() == nid)
            .unwrap_or(DnAttribute::Other(nid))
    }

    fn nid(self) -> Nid {
        match self {
            DnAttribute::CommonName => Nid::COMMONNAME,
            DnAttribute::Organization => Nid::ORGANIZATIONNAME,
            DnAttribute::OrganizationalUnit => Nid::ORGANIZATIONALUNITNAME,
            DnAttribute::Locality => Nid::LOCALITYNAME,
            DnAttribute::State => Nid::STATEORPROVINCENAME,
            DnAttribute::Country => Nid::COUNTRYNAME,
            DnAttribute::Other(nid) => nid,
        }
    }

    /// Short label used in `CN=...` notation
    pub fn short_name(self) -> &'static str {
        match self {
            DnAttribute::CommonName => "CN",
            DnAttribute::Organization => "O",
            DnAttribute::OrganizationalUnit => "OU",
            DnAttribute::Locality => "L",
            DnAttribute::State => "ST",
            DnAttribute::Country => "C",
            DnAttribute::Other(nid) => nid.short_name().unwrap_or("UNDEF"),
        }
    }

    fn from_short_name(key: &str) -> Option<Self> {
        match key.to_uppercase().as_str() {
            "CN" => Some(DnAttribute::CommonName),
            "O" => Some(DnAttribute::Organization),
            "OU" => Some(DnAttribute::OrganizationalUnit),
            "L" => Some(DnAttribute::Locality),
            "ST" => Some(DnAttribute::State),
            "C" => Some(DnAttribute::Country),
            _ => None,
        }
    }
}

/// Ordered Distinguished Name used as subject and issuer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubjectName {
    entries: Vec<(DnAttribute, String)>,
}

impl SubjectName {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute, keeping insertion order.
    pub fn push(mut self, attribute: DnAttribute, value: impl Into<String>) -> Self {
        self.entries.push((attribute, value.into()));
        self
    }

    /// Append an attribute only when a non-blank value is present.
    pub fn push_opt(self, attribute: DnAttribute, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => self.push(attribute, v),
            _ => self,
        }
    }

    pub fn entries(&self) -> &[(DnAttribute, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn common_name(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|(attr, _)| *attr == DnAttribute::CommonName)
            .map(|(_, v)| v.as_str())
    }

    /// Check that the name can be encoded into a certificate.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.entries.is_empty() {
            return Err(GenerationError::InvalidSubject(
                "Subject cannot be empty".to_string(),
            ));
        }
        for (attr, value) in &self.entries {
            if value.trim().is_empty() {
                return Err(GenerationError::InvalidSubject(format!(
                    "{} has an empty value",
                    attr.short_name()
                )));
            }
            // ISO 3166 alpha-2, PrintableString of size 2
            if *attr == DnAttribute::Country
                && (value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic()))
            {
                return Err(GenerationError::InvalidSubject(format!(
                    "Country must be a two-letter code, got {:?}",
                    value
                )));
            }
        }
        Ok(())
    }

    /// Encode into an OpenSSL X509 name.
    pub fn to_x509_name(&self) -> Result<X509Name, GenerationError> {
        self.validate()?;
        let mut name_builder =
            X509Name::builder().map_err(GenerationError::crypto("create name builder"))?;
        for (attr, value) in &self.entries {
            name_builder
                .append_entry_by_nid(attr.nid(), value)
                .map_err(GenerationError::crypto("append subject entry"))?;
        }
        Ok(name_builder.build())
    }

    /// Read back every entry of a certificate name, in order.
    ///
    /// Values are taken from the raw string bytes; invalid UTF-8 is replaced
    /// rather than dropped.
    pub fn from_x509_name(name: &X509NameRef) -> Self {
        let entries = name
            .entries()
            .map(|entry| {
                let attr = DnAttribute::from_nid(entry.object().nid());
                let value = String::from_utf8_lossy(entry.data().as_slice()).into_owned();
                (attr, value)
            })
            .collect();
        Self { entries }
    }
}

impl FromStr for SubjectName {
    type Err = GenerationError;

    /// Parse `"CN=example.com,O=Example Org,C=US"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut subject = SubjectName::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part.split_once('=').ok_or_else(|| {
                GenerationError::InvalidSubject(format!("Invalid subject format: {}", part))
            })?;
            let attr = DnAttribute::from_short_name(key.trim()).ok_or_else(|| {
                GenerationError::InvalidSubject(format!("Unknown DN type: {}", key.trim()))
            })?;
            subject = subject.push(attr, value.trim());
        }
        subject.validate()?;
        Ok(subject)
    }
}

impl fmt::Display for SubjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(attr, value)| format!("{}={}", attr.short_name(), value))
            .collect();
        write!(f, "{}", parts.join(","))
    }
}
